//
//  bitbucket-scm-client
//  api/transport.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Transport Configuration
//!
//! Builds the `reqwest` client used by the dispatcher. The client is built once
//! per [`BitbucketServerClient`](crate::api::BitbucketServerClient) and shared
//! by every request it makes.
//!
//! Cookie handling is always switched off: API tokens are sent explicitly on
//! each request and no session state may leak between unrelated calls through a
//! cookie jar. Connection pooling stays on.
//!
//! The builder calls go through [`ConfigureTransport`] so the exact sequence of
//! options can be observed without opening a connection.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};

/// Builder operations applied when constructing the HTTP transport.
///
/// Implemented for [`reqwest::ClientBuilder`]; any other implementation can
/// stand in for it to inspect the configuration.
pub trait ConfigureTransport: Sized {
    /// Sets the `User-Agent` header sent with every request.
    fn user_agent(self, value: &str) -> Self;
    /// Enables or disables the cookie store.
    fn cookie_store(self, enabled: bool) -> Self;
    /// Sets the total request timeout.
    fn timeout(self, timeout: Duration) -> Self;
    /// Sets the connection establishment timeout.
    fn connect_timeout(self, timeout: Duration) -> Self;
    /// Sets how long idle pooled connections are kept.
    fn pool_idle_timeout(self, timeout: Duration) -> Self;
    /// Sets the number of idle connections kept per host.
    fn pool_max_idle_per_host(self, max: usize) -> Self;
}

impl ConfigureTransport for ClientBuilder {
    fn user_agent(self, value: &str) -> Self {
        ClientBuilder::user_agent(self, value)
    }

    fn cookie_store(self, enabled: bool) -> Self {
        ClientBuilder::cookie_store(self, enabled)
    }

    fn timeout(self, timeout: Duration) -> Self {
        ClientBuilder::timeout(self, timeout)
    }

    fn connect_timeout(self, timeout: Duration) -> Self {
        ClientBuilder::connect_timeout(self, timeout)
    }

    fn pool_idle_timeout(self, timeout: Duration) -> Self {
        ClientBuilder::pool_idle_timeout(self, timeout)
    }

    fn pool_max_idle_per_host(self, max: usize) -> Self {
        ClientBuilder::pool_max_idle_per_host(self, max)
    }
}

/// HTTP transport options.
///
/// # Default Values
///
/// | Field | Default |
/// |-------|---------|
/// | `user_agent` | `bbscm/<version>` |
/// | `timeout_secs` | `30` |
/// | `connect_timeout_secs` | `10` |
/// | `pool_idle_timeout_secs` | `90` |
/// | `pool_max_idle_per_host` | `8` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Total request timeout in seconds.
    pub timeout_secs: u64,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Idle pooled connection lifetime in seconds.
    pub pool_idle_timeout_secs: u64,
    /// Idle connections kept per host.
    pub pool_max_idle_per_host: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("{}/{}", crate::APP_NAME, crate::VERSION),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            pool_idle_timeout_secs: 90,
            pool_max_idle_per_host: 8,
        }
    }
}

impl TransportConfig {
    /// Applies these options to a transport builder.
    ///
    /// The cookie store is disabled unconditionally.
    pub fn configure<B: ConfigureTransport>(&self, builder: B) -> B {
        builder
            .user_agent(&self.user_agent)
            .cookie_store(false)
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(self.pool_idle_timeout_secs))
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
    }

    /// Builds the shared `reqwest` client.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialised.
    pub fn build(&self) -> reqwest::Result<Client> {
        self.configure(Client::builder()).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingBuilder {
        calls: Vec<String>,
    }

    impl RecordingBuilder {
        fn record(mut self, call: String) -> Self {
            self.calls.push(call);
            self
        }
    }

    impl ConfigureTransport for RecordingBuilder {
        fn user_agent(self, value: &str) -> Self {
            self.record(format!("user_agent({value})"))
        }

        fn cookie_store(self, enabled: bool) -> Self {
            self.record(format!("cookie_store({enabled})"))
        }

        fn timeout(self, timeout: Duration) -> Self {
            self.record(format!("timeout({})", timeout.as_secs()))
        }

        fn connect_timeout(self, timeout: Duration) -> Self {
            self.record(format!("connect_timeout({})", timeout.as_secs()))
        }

        fn pool_idle_timeout(self, timeout: Duration) -> Self {
            self.record(format!("pool_idle_timeout({})", timeout.as_secs()))
        }

        fn pool_max_idle_per_host(self, max: usize) -> Self {
            self.record(format!("pool_max_idle_per_host({max})"))
        }
    }

    #[test]
    fn test_cookie_management_disabled() {
        let builder = TransportConfig::default().configure(RecordingBuilder::default());
        assert!(builder.calls.contains(&"cookie_store(false)".to_string()));
        assert!(!builder.calls.contains(&"cookie_store(true)".to_string()));
    }

    #[test]
    fn test_connection_reuse_configured() {
        let config = TransportConfig {
            pool_max_idle_per_host: 4,
            ..Default::default()
        };
        let builder = config.configure(RecordingBuilder::default());
        assert!(builder.calls.contains(&"pool_max_idle_per_host(4)".to_string()));
        assert!(builder.calls.contains(&"pool_idle_timeout(90)".to_string()));
    }

    #[test]
    fn test_default_user_agent() {
        let config = TransportConfig::default();
        assert_eq!(config.user_agent, format!("bbscm/{}", crate::VERSION));
        assert!(config.build().is_ok());
    }
}
