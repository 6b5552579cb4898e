//
//  bitbucket-scm-client
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for the Bitbucket Server Client
//!
//! This module provides the error taxonomy shared by every client operation and
//! the pagination types used by list endpoints.
//!
//! # Overview
//!
//! - [`BitbucketError`] - Unified error type for all API operations
//! - [`ServerPaginatedResponse`] - Offset-based page envelope
//! - [`Pager`] - Lazy page-by-page fetcher
//!
//! # Example
//!
//! ```rust
//! use bitbucket_scm_client::api::common::BitbucketError;
//!
//! fn handle_result<T>(result: Result<T, BitbucketError>) {
//!     match result {
//!         Ok(_) => println!("Success!"),
//!         Err(BitbucketError::RateLimitExceeded { attempts, .. }) => {
//!             println!("Still rate limited after {} attempts", attempts)
//!         }
//!         Err(e) if e.is_not_found() => println!("Not found"),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```

use reqwest::StatusCode;
use thiserror::Error;

use crate::api::template::TemplateError;

mod pagination;

pub use pagination::*;

/// Unified error type for all Bitbucket Server API operations.
///
/// # Variants
///
/// | Variant | Description | Retried |
/// |---------|-------------|---------|
/// | `Template` | Request path could not be expanded | No |
/// | `RateLimitExceeded` | Still rate limited after every attempt | Already retried |
/// | `Api` | Non-2xx response other than a rate limit | No |
/// | `InvalidStatus` | Build status rejected before sending | No |
/// | `Transport` | Connection-level failure | No |
/// | `Cancelled` | Caller cancelled while waiting to retry | No |
/// | `Decode` | Response body did not match the expected shape | No |
/// | `InvalidUrl` | Server URL could not be parsed | No |
#[derive(Error, Debug)]
pub enum BitbucketError {
    /// The request path template could not be expanded.
    #[error("Invalid request path: {0}")]
    Template(#[from] TemplateError),

    /// The server kept answering with a rate-limit response.
    ///
    /// Carries the status and body of the last response so callers can
    /// surface the server's own explanation.
    #[error("Rate limit exceeded after {attempts} attempts: {}", describe(.body))]
    RateLimitExceeded {
        /// Number of requests sent, including the original.
        attempts: u32,
        /// Status of the last response.
        status: StatusCode,
        /// Body of the last response.
        body: String,
    },

    /// The server answered with a non-success status.
    #[error("API error ({status}): {}", describe(.body))]
    Api {
        /// HTTP status returned by the server.
        status: StatusCode,
        /// Raw response body.
        body: String,
    },

    /// The build status is missing a required field.
    #[error("Invalid build status: {0}")]
    InvalidStatus(String),

    /// A network-level error occurred during the request.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The operation was cancelled while waiting to retry.
    #[error("Operation cancelled")]
    Cancelled,

    /// The response body could not be decoded.
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured server URL is not a valid URL.
    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl BitbucketError {
    /// Returns the HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } | Self::RateLimitExceeded { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Checks whether the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Checks whether the server rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }

    /// Extracts the human-readable message from the server's error body.
    pub fn server_message(&self) -> Option<String> {
        match self {
            Self::Api { body, .. } | Self::RateLimitExceeded { body, .. } => server_message(body),
            _ => None,
        }
    }
}

/// Extracts a user-friendly message from a Bitbucket error body.
///
/// Bitbucket Server returns errors in the format:
/// ```json
/// {"errors": [{"message": "Human readable message"}]}
/// ```
///
/// Some proxies and older endpoints answer with a bare `{"message": "..."}`.
/// Returns `None` when the body is not JSON or has neither shape.
pub fn server_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;

    json.get("errors")
        .and_then(|e| e.as_array())
        .and_then(|arr| arr.first())
        .and_then(|e| e.get("message"))
        .or_else(|| json.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

fn describe(body: &str) -> String {
    server_message(body).unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_errors_array() {
        let body = r#"{"errors":[{"context":null,"message":"Project FOO does not exist."}]}"#;
        assert_eq!(server_message(body), Some("Project FOO does not exist.".to_string()));
    }

    #[test]
    fn test_server_message_plain() {
        assert_eq!(server_message(r#"{"message":"slow down"}"#), Some("slow down".to_string()));
        assert_eq!(server_message("<html>busy</html>"), None);
    }

    #[test]
    fn test_api_error_display_prefers_server_message() {
        let err = BitbucketError::Api {
            status: StatusCode::NOT_FOUND,
            body: r#"{"errors":[{"message":"Repository missing"}]}"#.to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "API error (404 Not Found): Repository missing");

        let raw = BitbucketError::Api {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream down".to_string(),
        };
        assert_eq!(raw.to_string(), "API error (502 Bad Gateway): upstream down");
    }
}
