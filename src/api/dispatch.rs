//
//  bitbucket-scm-client
//  api/dispatch.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Rate-Limit-Aware Request Dispatch
//!
//! [`Dispatcher`] owns the HTTP client and sends every request on behalf of
//! [`BitbucketServerClient`](crate::api::BitbucketServerClient).
//!
//! ## Behaviour
//!
//! ```text
//! Idle -> Sending -> Success
//!            |    -> Failed (non-2xx, transport error)
//!            +--> RateLimited (429) -> backoff -> Sending
//! ```
//!
//! - The audit hook sees each attempt before it is sent.
//! - HTTP 429 is the only status that is retried. Each one logs a warning
//!   containing `Bitbucket server API rate limit reached`.
//! - Attempts are bounded by [`RetryPolicy::max_attempts`]; once exhausted the
//!   last response is surfaced as [`BitbucketError::RateLimitExceeded`].
//! - Waiting between attempts goes through a [`Sleeper`]. A [`Cancellation`]
//!   interrupts the wait as well as a request or body read still in flight.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, Request, RequestBuilder, Response, StatusCode, Url};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::audit::{NoopAudit, RequestAudit};
use super::common::BitbucketError;

/// Status Bitbucket Server answers with when a client is being throttled.
pub const RATE_LIMIT_STATUS: StatusCode = StatusCode::TOO_MANY_REQUESTS;

/// Checks whether a response status signals rate limiting.
pub fn is_rate_limited(status: StatusCode) -> bool {
    status == RATE_LIMIT_STATUS
}

/// Bounded exponential backoff used between rate-limited attempts.
///
/// # Default Values
///
/// | Field | Default |
/// |-------|---------|
/// | `max_attempts` | `5` (original request + 4 retries) |
/// | `initial_delay` | `5s` |
/// | `max_delay` | `30s` |
///
/// The delay doubles after every rate-limited attempt and never exceeds
/// `max_delay`. A `Retry-After` header (in seconds) replaces the computed
/// delay, still capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first. Never below 1.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy, clamping `max_attempts` to at least one.
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay,
        }
    }

    /// Delay to wait after the given (1-based) rate-limited attempt.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let computed = retry_after.unwrap_or_else(|| {
            let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
            self.initial_delay.saturating_mul(factor)
        });
        computed.min(self.max_delay)
    }
}

/// Waits between retry attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspends the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Cancellation signal shared between a caller and the client.
///
/// Cloning yields another handle to the same signal.
///
/// # Example
///
/// ```rust
/// use bitbucket_scm_client::api::dispatch::Cancellation;
///
/// let cancellation = Cancellation::new();
/// let handle = cancellation.clone();
/// handle.cancel();
/// assert!(cancellation.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct Cancellation {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellation {
    /// Creates a signal that has not fired.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Fires the signal. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Checks whether the signal has fired.
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Completes once the signal has fired.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives in `self`, so the channel cannot close while awaited.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

/// Sends requests, retrying while the server reports rate limiting.
pub struct Dispatcher {
    http: Client,
    audit: Arc<dyn RequestAudit>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    cancellation: Option<Cancellation>,
}

impl Dispatcher {
    /// Creates a dispatcher with no-op auditing, real sleeps and the default
    /// retry policy.
    pub fn new(http: Client) -> Self {
        Self {
            http,
            audit: Arc::new(NoopAudit),
            sleeper: Arc::new(TokioSleeper),
            policy: RetryPolicy::default(),
            cancellation: None,
        }
    }

    /// Replaces the audit hook.
    pub fn with_audit(mut self, audit: Arc<dyn RequestAudit>) -> Self {
        self.audit = audit;
        self
    }

    /// Replaces the sleeper used between attempts.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Replaces the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attaches a cancellation signal.
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// The retry policy in effect.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Starts a request against the owned HTTP client.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Sends a request and returns the first successful response.
    ///
    /// # Errors
    ///
    /// - [`BitbucketError::Api`] for any non-2xx status other than 429
    /// - [`BitbucketError::RateLimitExceeded`] once every attempt was throttled
    /// - [`BitbucketError::Transport`] for connection failures (not retried)
    /// - [`BitbucketError::Transport`] when an error body cannot be read
    /// - [`BitbucketError::Cancelled`] when cancelled before sending, while a
    ///   request is in flight, or while waiting to retry
    pub async fn execute(&self, request: Request) -> Result<Response, BitbucketError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut request = request;
        let mut attempt = 1;

        loop {
            self.check_cancelled()?;

            // Streaming bodies cannot be replayed; such a request gets one attempt.
            let replay = if attempt < max_attempts {
                request.try_clone()
            } else {
                None
            };

            self.audit.notify(&request);
            debug!(method = %request.method(), url = %request.url(), attempt, "Dispatching request");

            let response = self.cancellable(self.http.execute(request)).await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if !is_rate_limited(status) {
                let body = self.cancellable(response.text()).await?;
                return Err(BitbucketError::Api { status, body });
            }

            let retry_after = retry_after(&response);
            let body = self.cancellable(response.text()).await?;

            let Some(next) = replay else {
                warn!(
                    "Bitbucket server API rate limit reached, giving up after {} attempt(s)",
                    attempt
                );
                return Err(BitbucketError::RateLimitExceeded {
                    attempts: attempt,
                    status,
                    body,
                });
            };

            let delay = self.policy.delay_for(attempt, retry_after);
            warn!(
                "Bitbucket server API rate limit reached, retrying in {:?} (attempt {} of {})",
                delay, attempt, max_attempts
            );
            self.wait(delay).await?;

            request = next;
            attempt += 1;
        }
    }

    /// Awaits a transport future, returning early once the cancellation fires.
    pub(crate) async fn cancellable<T>(
        &self,
        future: impl Future<Output = reqwest::Result<T>>,
    ) -> Result<T, BitbucketError> {
        match &self.cancellation {
            Some(cancellation) => tokio::select! {
                biased;
                _ = cancellation.cancelled() => Err(BitbucketError::Cancelled),
                result = future => Ok(result?),
            },
            None => Ok(future.await?),
        }
    }

    fn check_cancelled(&self) -> Result<(), BitbucketError> {
        match &self.cancellation {
            Some(cancellation) if cancellation.is_cancelled() => Err(BitbucketError::Cancelled),
            _ => Ok(()),
        }
    }

    async fn wait(&self, delay: Duration) -> Result<(), BitbucketError> {
        match &self.cancellation {
            Some(cancellation) => tokio::select! {
                biased;
                _ = cancellation.cancelled() => Err(BitbucketError::Cancelled),
                _ = self.sleeper.sleep(delay) => Ok(()),
            },
            None => {
                self.sleeper.sleep(delay).await;
                Ok(())
            }
        }
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1, None), Duration::from_secs(5));
        assert_eq!(policy.delay_for(2, None), Duration::from_secs(10));
        assert_eq!(policy.delay_for(3, None), Duration::from_secs(20));
        assert_eq!(policy.delay_for(4, None), Duration::from_secs(30));
        assert_eq!(policy.delay_for(40, None), Duration::from_secs(30));
    }

    #[test]
    fn test_retry_after_overrides_and_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delay_for(1, Some(Duration::from_secs(2))),
            Duration::from_secs(2)
        );
        assert_eq!(
            policy.delay_for(1, Some(Duration::from_secs(3600))),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_policy_needs_at_least_one_attempt() {
        let policy = RetryPolicy::new(0, Duration::ZERO, Duration::ZERO);
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn test_cancellation_signal() {
        let cancellation = Cancellation::new();
        assert!(!cancellation.is_cancelled());

        let handle = cancellation.clone();
        handle.cancel();
        handle.cancel();
        assert!(cancellation.is_cancelled());

        // Already fired: resolves immediately.
        tokio_test::block_on(cancellation.cancelled());
    }
}
