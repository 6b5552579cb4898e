//
//  bitbucket-scm-client
//  api/server/branches.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Refs
//!
//! Branches and tags share one shape in the Bitbucket Server API.
//!
//! ```text
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/branches
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/branches/default
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/tags
//! ```

use serde::{Deserialize, Serialize};

/// A branch or tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ref {
    /// Fully qualified ref, e.g. `refs/heads/main`.
    pub id: String,

    /// Short name, e.g. `main`.
    #[serde(rename = "displayId")]
    pub display_id: String,

    /// "BRANCH" or "TAG".
    #[serde(rename = "type", default)]
    pub ref_type: Option<String>,

    /// Commit the ref points at.
    #[serde(rename = "latestCommit", default)]
    pub latest_commit: Option<String>,

    /// Only reported for branches.
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
}

/// Branch alias kept for readability at call sites.
pub type Branch = Ref;

/// Tag alias kept for readability at call sites.
pub type Tag = Ref;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_branch() {
        let branch: Branch = serde_json::from_str(
            r#"{"id":"refs/heads/master","displayId":"master","type":"BRANCH","latestCommit":"8d51122def5632836d1cb1026e879069e10a1e13","isDefault":true}"#,
        )
        .unwrap();
        assert_eq!(branch.display_id, "master");
        assert!(branch.is_default);
        assert_eq!(
            branch.latest_commit.as_deref(),
            Some("8d51122def5632836d1cb1026e879069e10a1e13")
        );
    }
}
