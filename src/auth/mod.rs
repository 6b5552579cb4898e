//
//  bitbucket-scm-client
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Credentials for Bitbucket Server/Data Center requests.
//!
//! ## Supported Authentication Methods
//!
//! - **Personal Access Token (PAT)**: HTTP bearer token. Preferred for CI use.
//! - **Basic Authentication**: Username and password (or username and token).
//!
//! Credentials are supplied by the embedding environment (CLI flags, env vars,
//! or the CI host's credential store); nothing here persists them.
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_scm_client::auth::AuthCredential;
//!
//! let pat = AuthCredential::bearer("NjM0NTY3ODkw");
//! let basic = AuthCredential::basic("ci-bot", "secret");
//!
//! // Secrets never show up in debug output.
//! assert!(!format!("{:?}", basic).contains("secret"));
//! ```

use std::fmt;

use reqwest::RequestBuilder;
use thiserror::Error;

/// Credentials that were supplied but cannot be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token is malformed: it must not contain whitespace")]
    InvalidToken,
}

/// Credentials attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthCredential {
    /// Personal Access Token for Bitbucket Server/Data Center.
    ///
    /// Sent as `Authorization: Bearer <token>`.
    PersonalAccessToken {
        /// The personal access token string.
        token: String,
    },
    /// Basic HTTP authentication with username and password.
    Basic {
        /// The username for authentication.
        username: String,
        /// The password (or token used as a password).
        password: String,
    },
}

impl AuthCredential {
    /// Creates a bearer token credential.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::PersonalAccessToken {
            token: token.into(),
        }
    }

    /// Creates a basic authentication credential.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Picks a credential from the optional pieces supplied by the user.
    ///
    /// A token wins over a username/password pair. A username paired with a
    /// token is sent as basic auth, which Bitbucket Server also accepts.
    /// Surrounding whitespace (such as the newline left by `$(cat token)`) is
    /// trimmed, and a blank token counts as absent. Returns `Ok(None)` when
    /// nothing usable was supplied.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidToken`] when the token still contains whitespace
    /// after trimming.
    pub fn from_parts(
        token: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Option<Self>, AuthError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        if let Some(token) = token {
            if !validate_token(token) {
                return Err(AuthError::InvalidToken);
            }
        }

        Ok(match (token, username, password) {
            (Some(token), Some(username), None) => Some(Self::basic(username, token)),
            (Some(token), _, _) => Some(Self::bearer(token)),
            (None, Some(username), Some(password)) => Some(Self::basic(username, password)),
            _ => None,
        })
    }

    /// Adds the authentication header to a request.
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::PersonalAccessToken { token } => request.bearer_auth(token),
            Self::Basic { username, password } => request.basic_auth(username, Some(password)),
        }
    }

    /// Short name of the method, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PersonalAccessToken { .. } => "token",
            Self::Basic { .. } => "basic",
        }
    }
}

impl fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PersonalAccessToken { .. } => f
                .debug_struct("PersonalAccessToken")
                .field("token", &"<redacted>")
                .finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Validates the format of a token string.
///
/// The token must be non-empty and contain no whitespace. This does not check
/// the token with the server.
///
/// ```rust
/// use bitbucket_scm_client::auth::validate_token;
///
/// assert!(validate_token("NjM0NTY3ODkwMTIzNDU2Nzg5MA=="));
/// assert!(!validate_token(""));
/// assert!(!validate_token("has space"));
/// ```
pub fn validate_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(char::is_whitespace)
}
