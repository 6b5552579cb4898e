//
//  bitbucket-scm-client
//  api/audit.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Request Audit Hook
//!
//! Every request the dispatcher sends is first shown to a [`RequestAudit`]
//! implementation. Retries are separate requests, so each attempt is audited
//! on its own.
//!
//! ## Implementations
//!
//! | Type | Behaviour |
//! |------|-----------|
//! | [`NoopAudit`] | Does nothing (default) |
//! | [`TracingAudit`] | Logs method and URL at debug level |
//! | [`RecordingAudit`] | Keeps an [`AuditRecord`] per request for inspection |
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use bitbucket_scm_client::api::audit::RecordingAudit;
//! use bitbucket_scm_client::api::BitbucketServerClient;
//!
//! let audit = Arc::new(RecordingAudit::new());
//! let client = BitbucketServerClient::builder("https://bitbucket.example.com")
//!     .audit(audit.clone())
//!     .build()?;
//! assert!(audit.is_empty());
//! # Ok::<(), bitbucket_scm_client::api::BitbucketError>(())
//! ```

use std::sync::{Mutex, MutexGuard};

use reqwest::header::HeaderMap;
use reqwest::{Method, Request, Url};
use tracing::debug;

/// Observation point invoked with every outbound request before it is sent.
///
/// Implementations only get a shared borrow, so they cannot alter the request,
/// and `notify` has no return value, so they cannot fail the call.
pub trait RequestAudit: Send + Sync {
    /// Called once per attempt, immediately before transmission.
    fn notify(&self, request: &Request);
}

/// Audit hook that ignores every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAudit;

impl RequestAudit for NoopAudit {
    fn notify(&self, _request: &Request) {}
}

/// Audit hook that logs each request at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAudit;

impl RequestAudit for TracingAudit {
    fn notify(&self, request: &Request) {
        debug!(method = %request.method(), url = %request.url(), "Sending request");
    }
}

/// Snapshot of a dispatched request.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    /// HTTP method.
    pub method: Method,
    /// Fully resolved request URL.
    pub url: Url,
    /// Request headers, including authentication.
    pub headers: HeaderMap,
    /// Buffered request body, if the request has one.
    pub body: Option<Vec<u8>>,
}

impl AuditRecord {
    /// Captures the observable parts of a request.
    pub fn capture(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            url: request.url().clone(),
            headers: request.headers().clone(),
            body: request
                .body()
                .and_then(|body| body.as_bytes())
                .map(<[u8]>::to_vec),
        }
    }

    /// Returns the body decoded as UTF-8, if present and valid.
    pub fn body_text(&self) -> Option<&str> {
        self.body
            .as_deref()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// Returns the path and query of the request URL.
    pub fn path_and_query(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }
}

/// Audit hook that keeps a record of every request it sees.
#[derive(Debug, Default)]
pub struct RecordingAudit {
    records: Mutex<Vec<AuditRecord>>,
}

impl RecordingAudit {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record, oldest first.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.lock().clone()
    }

    /// Returns the most recent record.
    pub fn last(&self) -> Option<AuditRecord> {
        self.lock().last().cloned()
    }

    /// Number of requests recorded so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Checks if no request has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forgets all records.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock only loses the record being pushed.
    fn lock(&self) -> MutexGuard<'_, Vec<AuditRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RequestAudit for RecordingAudit {
    fn notify(&self, request: &Request) {
        self.lock().push(AuditRecord::capture(request));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_audit_captures_body() {
        let client = reqwest::Client::new();
        let request = client
            .post("http://localhost/rest/build-status/1.0/commits/abc?x=1")
            .body(r#"{"state":"FAILED"}"#)
            .build()
            .unwrap();

        let audit = RecordingAudit::new();
        audit.notify(&request);

        let record = audit.last().unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(record.method, Method::POST);
        assert_eq!(record.path_and_query(), "/rest/build-status/1.0/commits/abc?x=1");
        assert_eq!(record.body_text(), Some(r#"{"state":"FAILED"}"#));

        audit.clear();
        assert!(audit.is_empty());
    }

    #[test]
    fn test_noop_audit_leaves_request_untouched() {
        let request = reqwest::Client::new()
            .get("http://localhost/a")
            .build()
            .unwrap();
        NoopAudit.notify(&request);
        TracingAudit.notify(&request);
        assert_eq!(request.url().path(), "/a");
    }
}
