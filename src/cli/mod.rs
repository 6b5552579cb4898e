//
//  bitbucket-scm-client
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod branch;
mod file;
mod project;
mod repo;
mod status;
mod tag;

pub use branch::BranchCommand;
pub use file::FileCommand;
pub use project::ProjectCommand;
pub use repo::RepoCommand;
pub use status::StatusCommand;
pub use tag::TagCommand;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::api::audit::TracingAudit;
use crate::api::dispatch::Cancellation;
use crate::api::{BitbucketError, BitbucketServerClient};
use crate::auth::{AuthCredential, AuthError};
use crate::config::{normalize_server_url, Config};
use crate::exit_codes;
use crate::output::{OutputFormat, OutputWriter};

/// Query Bitbucket Server and report build results from CI
#[derive(Parser, Debug)]
#[command(
    name = "bbscm",
    version,
    about = "Bitbucket Server client for CI pipelines",
    long_about = "bbscm lists repositories, reads files and refs, and posts commit build \
                  statuses against a Bitbucket Server/Data Center instance.",
    propagate_version = true,
    after_help = "Use 'bbscm <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Options accepted by every command.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Bitbucket Server URL (e.g. https://bitbucket.example.com)
    #[arg(long, global = true, env = "BBSCM_SERVER")]
    pub server: Option<String>,

    /// Personal access token
    #[arg(long, global = true, env = "BBSCM_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Username for basic authentication
    #[arg(long, short = 'u', global = true, env = "BBSCM_USERNAME")]
    pub username: Option<String>,

    /// Password for basic authentication
    #[arg(long, global = true, env = "BBSCM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "BBSCM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Work with repositories
    #[command(visible_alias = "r")]
    Repo(RepoCommand),

    /// Work with projects
    #[command(visible_alias = "proj")]
    Project(ProjectCommand),

    /// Work with branches
    Branch(BranchCommand),

    /// Work with tags
    Tag(TagCommand),

    /// Read repository files
    File(FileCommand),

    /// Report commit build statuses
    Status(StatusCommand),

    /// Show version information
    Version,
}

/// Usage problems detected before any request is made.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("No Bitbucket server configured. Pass --server, set BBSCM_SERVER, or add [server] url to the config file.")]
    MissingServer,

    #[error("No project given and no default_project configured.")]
    MissingProject,

    #[error("Invalid credentials: {0}")]
    InvalidCredential(#[from] AuthError),
}

/// State shared by every command: options, config and the cancel signal.
pub struct Session {
    pub global: GlobalOptions,
    pub config: Config,
    cancellation: Cancellation,
}

impl Session {
    /// Loads the config file named by `--config`, or the default one.
    pub fn load(global: GlobalOptions, cancellation: Cancellation) -> Result<Self> {
        let config = match &global.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        Ok(Self::with_config(global, config, cancellation))
    }

    pub fn with_config(global: GlobalOptions, config: Config, cancellation: Cancellation) -> Self {
        Self {
            global,
            config,
            cancellation,
        }
    }

    /// Server URL from the command line, falling back to the config file.
    pub fn server_url(&self) -> Option<String> {
        self.global
            .server
            .as_deref()
            .map(normalize_server_url)
            .filter(|url| !url.is_empty())
            .or_else(|| self.config.server_url())
    }

    /// Credentials from the command line or environment.
    ///
    /// A malformed token is a usage error rather than being dropped silently.
    pub fn credential(&self) -> Result<Option<AuthCredential>, UsageError> {
        let username = self
            .global
            .username
            .as_deref()
            .or(self.config.server.username.as_deref());
        Ok(AuthCredential::from_parts(
            self.global.token.as_deref(),
            username,
            self.global.password.as_deref(),
        )?)
    }

    /// Project key from the argument, falling back to `default_project`.
    pub fn project(&self, project: Option<&str>) -> Result<String> {
        project
            .or(self.config.server.default_project.as_deref())
            .map(str::to_string)
            .ok_or_else(|| UsageError::MissingProject.into())
    }

    /// Builds a client for the configured server.
    pub fn client(&self) -> Result<BitbucketServerClient> {
        let url = self.server_url().ok_or(UsageError::MissingServer)?;
        let client = BitbucketServerClient::builder(url)
            .auth_opt(self.credential()?)
            .audit(Arc::new(TracingAudit))
            .retry_policy(self.config.retry.policy())
            .transport(self.config.transport.clone())
            .cancellation(self.cancellation.clone())
            .build()?;
        Ok(client)
    }

    pub fn writer(&self) -> OutputWriter {
        OutputWriter::new(OutputFormat::from_json_flag(self.global.json))
    }
}

/// Maps a command failure to the process exit code.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<UsageError>().is_some() {
        return exit_codes::USAGE;
    }
    match error.downcast_ref::<BitbucketError>() {
        Some(BitbucketError::Cancelled) => exit_codes::CANCELLED,
        Some(BitbucketError::RateLimitExceeded { .. }) => exit_codes::RATE_LIMIT,
        Some(BitbucketError::InvalidStatus(_)) => exit_codes::USAGE,
        Some(err) if err.is_unauthorized() => exit_codes::AUTH_ERROR,
        Some(err) if err.is_not_found() => exit_codes::NOT_FOUND,
        _ => exit_codes::ERROR,
    }
}

/// Message shown to the user for a failed command.
///
/// Server errors are reduced to the server's own message when it sent one.
pub fn error_message(error: &anyhow::Error) -> String {
    if let Some(err) = error.downcast_ref::<BitbucketError>() {
        if let Some(message) = err.server_message() {
            return match err.status() {
                Some(status) => format!("{} ({})", message, status),
                None => message,
            };
        }
    }
    format!("{:#}", error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn session(global: GlobalOptions, config: Config) -> Session {
        Session::with_config(global, config, Cancellation::new())
    }

    #[test]
    fn test_server_url_precedence() {
        let mut config = Config::default();
        config.server.url = Some("https://from-config.example.com/".to_string());

        let flagged = session(
            GlobalOptions {
                server: Some("flag.example.com".to_string()),
                ..Default::default()
            },
            config.clone(),
        );
        assert_eq!(
            flagged.server_url().as_deref(),
            Some("https://flag.example.com")
        );

        let configured = session(GlobalOptions::default(), config);
        assert_eq!(
            configured.server_url().as_deref(),
            Some("https://from-config.example.com")
        );

        let missing = session(GlobalOptions::default(), Config::default());
        let err = missing.client().err().unwrap();
        assert_eq!(exit_code(&err), exit_codes::USAGE);
    }

    #[test]
    fn test_username_from_config() {
        let mut config = Config::default();
        config.server.username = Some("ci-bot".to_string());
        let session = session(
            GlobalOptions {
                password: Some("pw".to_string()),
                ..Default::default()
            },
            config,
        );
        assert_eq!(
            session.credential().unwrap(),
            Some(AuthCredential::basic("ci-bot", "pw"))
        );
    }

    #[test]
    fn test_malformed_token_is_usage_error() {
        let session = session(
            GlobalOptions {
                server: Some("bitbucket.example.com".to_string()),
                token: Some("not a token".to_string()),
                ..Default::default()
            },
            Config::default(),
        );
        let err = session.client().err().unwrap();
        assert_eq!(exit_code(&err), exit_codes::USAGE);
    }

    #[test]
    fn test_project_fallback() {
        let mut config = Config::default();
        config.server.default_project = Some("PROJ".to_string());
        let session = session(GlobalOptions::default(), config);
        assert_eq!(session.project(None).unwrap(), "PROJ");
        assert_eq!(session.project(Some("OTHER")).unwrap(), "OTHER");
    }

    #[test]
    fn test_exit_codes() {
        let code = |err: BitbucketError| exit_code(&anyhow::Error::from(err));
        assert_eq!(code(BitbucketError::Cancelled), exit_codes::CANCELLED);
        assert_eq!(
            code(BitbucketError::RateLimitExceeded {
                attempts: 5,
                status: StatusCode::TOO_MANY_REQUESTS,
                body: String::new(),
            }),
            exit_codes::RATE_LIMIT
        );
        assert_eq!(
            code(BitbucketError::Api {
                status: StatusCode::UNAUTHORIZED,
                body: String::new(),
            }),
            exit_codes::AUTH_ERROR
        );
        assert_eq!(
            code(BitbucketError::Api {
                status: StatusCode::NOT_FOUND,
                body: String::new(),
            }),
            exit_codes::NOT_FOUND
        );
        assert_eq!(
            code(BitbucketError::Api {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: String::new(),
            }),
            exit_codes::ERROR
        );
    }

    #[test]
    fn test_error_message_prefers_server_text() {
        let err = anyhow::Error::from(BitbucketError::Api {
            status: StatusCode::NOT_FOUND,
            body: r#"{"errors":[{"message":"Project PROJ does not exist."}]}"#.to_string(),
        });
        assert_eq!(
            error_message(&err),
            "Project PROJ does not exist. (404 Not Found)"
        );
    }
}
