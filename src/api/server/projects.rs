//
//  bitbucket-scm-client
//  api/server/projects.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Projects
//!
//! Projects group repositories and are the `owner` segment of every repository
//! path. Personal projects use the `~username` key form.
//!
//! ```text
//! GET /rest/api/1.0/projects/{projectKey}
//! ```

use serde::{Deserialize, Serialize};

use super::repositories::SelfLink;

/// A Bitbucket Server project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique numeric identifier.
    #[serde(default)]
    pub id: u64,

    /// Short key used in URLs (e.g. "PROJ", or "~jdoe" for personal projects).
    pub key: String,

    /// Display name.
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "public")]
    #[serde(default)]
    pub is_public: bool,

    /// "NORMAL" or "PERSONAL".
    #[serde(rename = "type", default)]
    pub project_type: Option<String>,

    #[serde(default)]
    pub links: ProjectLinks,
}

impl Project {
    /// Checks whether this is a user's personal project.
    pub fn is_personal(&self) -> bool {
        self.project_type.as_deref() == Some("PERSONAL") || self.key.starts_with('~')
    }
}

/// Links attached to a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectLinks {
    /// Web UI links.
    #[serde(default, rename = "self")]
    pub self_link: Vec<SelfLink>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personal_project() {
        let project: Project =
            serde_json::from_str(r#"{"key":"~AMUNIZ","name":"Antonio Muniz","type":"PERSONAL"}"#)
                .unwrap();
        assert!(project.is_personal());
        assert!(project.links.self_link.is_empty());
    }
}
