//
//  bitbucket-scm-client
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server SCM Client
//!
//! The Bitbucket Server/Data Center API layer a CI orchestrator uses to
//! discover repositories, read files and refs, and report commit build
//! statuses.
//!
//! ## Features
//!
//! - **URI templates**: request paths built from RFC 6570 templates with
//!   proper encoding of path segments and query values
//! - **Request auditing**: a hook observes every outbound request
//! - **Rate limiting**: HTTP 429 responses are retried with bounded,
//!   cancellable backoff and a warning per throttled attempt
//! - **Repository listing**: archived repositories hidden, results sorted by name
//! - **Build status**: payloads validated and trimmed to what the server accepts
//! - **Transport**: one pooled HTTP client per server, cookies disabled
//!
//! ## Module Structure
//!
//! - [`api`]: Client, dispatcher, templates and resource types
//! - [`auth`]: Credentials (personal access token, basic)
//! - [`config`]: Configuration file management
//! - [`output`]: Table and JSON output for the `bbscm` binary
//! - [`cli`]: Command-line interface definitions using clap
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bitbucket_scm_client::api::server::{BuildState, BuildStatus};
//! use bitbucket_scm_client::api::BitbucketServerClient;
//! use bitbucket_scm_client::auth::AuthCredential;
//!
//! # async fn example() -> Result<(), bitbucket_scm_client::api::BitbucketError> {
//! let client = BitbucketServerClient::builder("https://bitbucket.example.com")
//!     .auth(AuthCredential::bearer("your-pat"))
//!     .build()?;
//!
//! let status = BuildStatus {
//!     hash: "046d9a3c1532acf4cf08fe93235c00e4d673c1d3".to_string(),
//!     state: Some(BuildState::Successful),
//!     name: "ci/build".to_string(),
//!     url: "https://ci.example.com/job/42".to_string(),
//!     description: None,
//! };
//! client.post_build_status(&status).await?;
//! # Ok(())
//! # }
//! ```

/// API client for Bitbucket Server/Data Center.
///
/// Handles request path templates, auditing, rate-limit retries, pagination,
/// and error handling.
pub mod api;

/// Authentication credentials.
pub mod auth;

/// Command-line interface definitions.
///
/// Contains the `bbscm` commands and the session that turns global options
/// and the config file into a client.
pub mod cli;

/// Configuration file management.
///
/// Manages the configuration stored in platform-specific locations:
/// - Linux: `~/.config/bbscm/config.toml`
/// - macOS: `~/Library/Application Support/bbscm/config.toml`
/// - Windows: `%APPDATA%\bbscm\config.toml`
pub mod config;

/// Output formatting for different modes.
///
/// - Table format: Human-readable tables for interactive use
/// - JSON format: Structured output for scripting and automation
pub mod output;

pub use api::{BitbucketError, BitbucketServerClient};
pub use config::Config;

/// Application name, used for the config directory and the `User-Agent`.
pub const APP_NAME: &str = "bbscm";

/// Crate version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process exit codes for the `bbscm` binary.
///
/// # Example
///
/// ```rust
/// use bitbucket_scm_client::exit_codes;
///
/// assert_eq!(exit_codes::RATE_LIMIT, 32);
/// ```
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error.
    ///
    /// An unspecified error occurred during execution.
    /// Check stderr for details.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments.
    ///
    /// Also used when no server is configured or a build status is rejected
    /// before sending.
    pub const USAGE: i32 = 2;

    /// Authentication required or failed.
    ///
    /// The server answered 401 or 403.
    pub const AUTH_ERROR: i32 = 4;

    /// Resource not found.
    ///
    /// The requested project, repository or file does not exist or the user
    /// does not have permission to see it.
    pub const NOT_FOUND: i32 = 8;

    /// Operation cancelled by user, typically with Ctrl+C.
    pub const CANCELLED: i32 = 16;

    /// API rate limit exceeded.
    ///
    /// Every attempt was throttled by the server.
    pub const RATE_LIMIT: i32 = 32;
}
