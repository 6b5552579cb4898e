//
//  bitbucket-scm-client
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Loads `bbscm` settings from a TOML file stored in the platform-specific
//! config directory.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/bbscm/config.toml`
//! - **macOS**: `~/Library/Application Support/bbscm/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\bbscm\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! [server]
//! url = "https://bitbucket.example.com"
//! username = "ci-bot"
//! default_project = "PROJ"
//!
//! [retry]
//! max_attempts = 5
//! initial_delay_ms = 5000
//! max_delay_ms = 30000
//!
//! [transport]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//! ```
//!
//! Every key is optional. Credentials are never read from or written to this
//! file; they come from the command line or the environment.
//!
//! ## Submodules
//!
//! - [`file`]: Low-level configuration file I/O operations
//! - [`hosts`]: Server URL normalization

mod file;
mod hosts;

pub use file::*;
pub use hosts::*;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::dispatch::RetryPolicy;
use crate::api::transport::TransportConfig;

/// Global configuration container.
///
/// # Examples
///
/// ```rust
/// use bitbucket_scm_client::config::Config;
///
/// let config: Config = toml::from_str("[server]\nurl = \"bitbucket.example.com/\"").unwrap();
/// assert_eq!(config.server_url().as_deref(), Some("https://bitbucket.example.com"));
/// assert_eq!(config.retry.max_attempts, 5);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Which server to talk to and as whom.
    #[serde(default)]
    pub server: ServerConfig,

    /// Backoff applied when the server rate-limits requests.
    #[serde(default)]
    pub retry: RetryConfig,

    /// HTTP client options.
    #[serde(default)]
    pub transport: TransportConfig,
}

/// Server connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the Bitbucket Server instance, including any context path.
    #[serde(default)]
    pub url: Option<String>,

    /// Username for basic authentication.
    #[serde(default)]
    pub username: Option<String>,

    /// Project key used when a command omits one.
    #[serde(default)]
    pub default_project: Option<String>,
}

/// Retry settings, in milliseconds so tests can use short delays.
///
/// # Default Values
///
/// | Field | Default |
/// |-------|---------|
/// | `max_attempts` | `5` |
/// | `initial_delay_ms` | `5000` |
/// | `max_delay_ms` | `30000` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
        }
    }
}

impl RetryConfig {
    /// Converts these settings into the dispatcher's policy.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

impl Config {
    /// Loads configuration from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads configuration from an explicit path.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !config_exists(path) {
            return Ok(Self::default());
        }
        let content = read_config_file(path)?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Default config file path.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", crate::APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Configured server URL, normalized.
    pub fn server_url(&self) -> Option<String> {
        self.server
            .url
            .as_deref()
            .map(normalize_server_url)
            .filter(|url| !url.is_empty())
    }
}
