//
//  bitbucket-scm-client
//  api/server/build_status.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Commit Build Status
//!
//! Build results are reported against a commit hash:
//!
//! ```text
//! POST /rest/build-status/1.0/commits/{commitId}
//! {"state": "SUCCESSFUL", "key": "<commit>", "name": "...", "url": "...", "description": "..."}
//! ```
//!
//! The server rejects names longer than 255 characters, so [`build_payload`]
//! cuts them down before serialization instead of letting the post fail.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::common::BitbucketError;

/// Longest `name` the server accepts, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// State of a build, as understood by Bitbucket Server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildState {
    /// The build is running.
    InProgress,
    /// The build passed.
    Successful,
    /// The build failed.
    Failed,
    /// The build was stopped before completing.
    Stopped,
}

impl BuildState {
    /// Token sent to the server for this state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "INPROGRESS",
            Self::Successful => "SUCCESSFUL",
            Self::Failed => "FAILED",
            Self::Stopped => "STOPPED",
        }
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A build result to report for a commit.
///
/// Fields are filled in incrementally by the caller; [`build_payload`] checks
/// that the required ones are present.
///
/// # Example
///
/// ```rust
/// use bitbucket_scm_client::api::server::build_status::{build_payload, BuildState, BuildStatus};
///
/// let status = BuildStatus {
///     hash: "046d9a3c1532acf4cf08fe93235c00e4d673c1d3".to_string(),
///     state: Some(BuildState::InProgress),
///     name: "ci/build".to_string(),
///     url: "https://ci.example.com/job/1".to_string(),
///     description: None,
/// };
///
/// let json = build_payload(&status)?;
/// assert!(json.starts_with(r#"{"state":"INPROGRESS","key":"046d9a3c"#));
/// # Ok::<(), bitbucket_scm_client::api::BitbucketError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStatus {
    /// Commit the status applies to. Required.
    pub hash: String,
    /// Build state. Required.
    pub state: Option<BuildState>,
    /// Display name; truncated to [`MAX_NAME_LENGTH`] characters.
    pub name: String,
    /// Link back to the build.
    pub url: String,
    /// Optional free text; omitted from the payload when `None`.
    pub description: Option<String>,
}

/// Wire representation of a build status.
///
/// Field order matches the server's schema; nothing beyond these keys is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildStatusPayload {
    pub state: BuildState,
    pub key: String,
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TryFrom<&BuildStatus> for BuildStatusPayload {
    type Error = BitbucketError;

    fn try_from(status: &BuildStatus) -> Result<Self, Self::Error> {
        let hash = status.hash.trim();
        if hash.is_empty() {
            return Err(BitbucketError::InvalidStatus(
                "commit hash is required".to_string(),
            ));
        }
        let state = status
            .state
            .ok_or_else(|| BitbucketError::InvalidStatus("build state is required".to_string()))?;

        Ok(Self {
            state,
            key: hash.to_string(),
            name: truncate_chars(&status.name, MAX_NAME_LENGTH),
            url: status.url.clone(),
            description: status.description.clone(),
        })
    }
}

/// Validates a build status and serializes it to the JSON body the server
/// expects.
///
/// # Errors
///
/// Returns [`BitbucketError::InvalidStatus`] when the hash is empty or the
/// state is unset. Overlong names are truncated, never rejected.
pub fn build_payload(status: &BuildStatus) -> Result<String, BitbucketError> {
    let payload = BuildStatusPayload::try_from(status)?;
    Ok(serde_json::to_string(&payload)?)
}

/// Keeps the first `max` characters of `value`.
///
/// Counts `char`s, so multi-byte text is never split inside a character.
pub fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((end, _)) => value[..end].to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(name: &str) -> BuildStatus {
        BuildStatus {
            hash: "046d9a3c1532acf4cf08fe93235c00e4d673c1d3".to_string(),
            state: Some(BuildState::InProgress),
            name: name.to_string(),
            url: "https://ci.example.com/job/1/".to_string(),
            description: None,
        }
    }

    fn payload_name(status: &BuildStatus) -> String {
        let json: serde_json::Value = serde_json::from_str(&build_payload(status).unwrap()).unwrap();
        json["name"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_long_name_truncated_to_255() {
        let name: String = "abcdefghij".repeat(30);
        let sent = payload_name(&status(&name));
        assert_eq!(sent.chars().count(), 255);
        assert_eq!(sent, name[..255]);
    }

    #[test]
    fn test_short_names_unchanged() {
        for len in [0, 1, 254, 255] {
            let name = "x".repeat(len);
            assert_eq!(payload_name(&status(&name)), name);
        }
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let name = "é".repeat(300);
        let sent = payload_name(&status(&name));
        assert_eq!(sent.chars().count(), 255);
        assert_eq!(sent.len(), 510);
    }

    #[test]
    fn test_payload_keys_and_order() {
        let mut status = status("build");
        status.state = Some(BuildState::Successful);
        assert_eq!(
            build_payload(&status).unwrap(),
            r#"{"state":"SUCCESSFUL","key":"046d9a3c1532acf4cf08fe93235c00e4d673c1d3","name":"build","url":"https://ci.example.com/job/1/"}"#
        );

        status.description = Some("All green".to_string());
        assert!(build_payload(&status)
            .unwrap()
            .ends_with(r#""description":"All green"}"#));
    }

    #[test]
    fn test_state_tokens() {
        for (state, token) in [
            (BuildState::InProgress, "\"INPROGRESS\""),
            (BuildState::Successful, "\"SUCCESSFUL\""),
            (BuildState::Failed, "\"FAILED\""),
            (BuildState::Stopped, "\"STOPPED\""),
        ] {
            assert_eq!(serde_json::to_string(&state).unwrap(), token);
            assert_eq!(format!("\"{state}\""), token);
        }
    }

    #[test]
    fn test_missing_required_fields() {
        let mut no_hash = status("build");
        no_hash.hash = "  ".to_string();
        assert!(matches!(
            build_payload(&no_hash),
            Err(BitbucketError::InvalidStatus(_))
        ));

        let mut no_state = status("build");
        no_state.state = None;
        assert!(matches!(
            build_payload(&no_state),
            Err(BitbucketError::InvalidStatus(_))
        ));
    }
}
