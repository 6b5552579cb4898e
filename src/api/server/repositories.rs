//
//  bitbucket-scm-client
//  api/server/repositories.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Repositories
//!
//! Repository model plus the listing policy applied before repositories are
//! handed to callers.
//!
//! ## API Endpoint
//!
//! ```text
//! GET /rest/api/1.0/projects/{projectKey}/repos
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}
//! ```
//!
//! ## Listing Policy
//!
//! Archived repositories are dropped and the rest are ordered by name. The
//! server is not asked to filter: archiving is a client-side policy.
//!
//! ```rust
//! use bitbucket_scm_client::api::server::repositories::{active_sorted, Repository};
//!
//! let repos: Vec<Repository> = serde_json::from_str(r#"[
//!     {"slug": "b", "name": "b", "project": {"key": "P"}},
//!     {"slug": "old", "name": "old", "project": {"key": "P"}, "archived": true},
//!     {"slug": "a", "name": "a", "project": {"key": "P"}}
//! ]"#).unwrap();
//!
//! let names: Vec<String> = active_sorted(repos).into_iter().map(|r| r.name).collect();
//! assert_eq!(names, ["a", "b"]);
//! ```

use serde::{Deserialize, Serialize};

/// Represents a repository in Bitbucket Server/Data Center.
///
/// # Notes
///
/// - The `slug` is derived from the name but may differ (lowercase, hyphenated)
/// - `archived` is only reported by Bitbucket 8.0+; older servers omit it and
///   every repository is treated as active
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Unique numeric identifier assigned by Bitbucket Server.
    #[serde(default)]
    pub id: u64,

    /// URL-safe identifier used in API endpoints and clone URLs.
    pub slug: String,

    /// Human-readable display name of the repository.
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// The project that contains this repository.
    pub project: ProjectRef,

    /// Source control management identifier (typically "git").
    #[serde(rename = "scmId", default)]
    pub scm_id: Option<String>,

    /// Common values: "AVAILABLE", "INITIALISING", "INITIALISATION_FAILED".
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub forkable: bool,

    #[serde(rename = "public")]
    #[serde(default)]
    pub is_public: bool,

    /// Whether the repository has been archived (read-only, hidden from builds).
    #[serde(default)]
    pub archived: bool,

    #[serde(default)]
    pub links: RepositoryLinks,
}

impl Repository {
    /// Returns the clone URL for the given protocol name ("ssh" or "http").
    pub fn clone_url(&self, protocol: &str) -> Option<&str> {
        self.links
            .clone
            .iter()
            .find(|link| link.name == protocol)
            .map(|link| link.href.as_str())
    }

    /// Returns the first web UI link.
    pub fn web_url(&self) -> Option<&str> {
        self.links.self_link.first().map(|link| link.href.as_str())
    }
}

/// Lightweight reference to a repository's project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRef {
    #[serde(default)]
    pub id: u64,

    /// Short key used in URLs and API paths.
    pub key: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "public")]
    #[serde(default)]
    pub is_public: bool,
}

/// Collection of links associated with a repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryLinks {
    /// Typically contains entries for "ssh" and "http".
    #[serde(default)]
    pub clone: Vec<CloneLink>,

    #[serde(default, rename = "self")]
    pub self_link: Vec<SelfLink>,
}

/// A clone URL for one protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneLink {
    pub href: String,

    /// Protocol identifier, e.g. "ssh" or "http".
    pub name: String,
}

/// Link back to a resource in the web UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfLink {
    pub href: String,
}

/// Applies the listing policy: drops archived repositories and sorts the rest
/// by name.
///
/// The sort is case-sensitive and ascending. It is stable, so repositories
/// with equal names keep the order in which they were fetched.
pub fn active_sorted<I>(repositories: I) -> Vec<Repository>
where
    I: IntoIterator<Item = Repository>,
{
    let mut active: Vec<Repository> = repositories
        .into_iter()
        .filter(|repo| !repo.archived)
        .collect();
    active.sort_by(|a, b| a.name.cmp(&b.name));
    active
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, archived: bool) -> Repository {
        Repository {
            id: 0,
            slug: name.to_lowercase(),
            name: name.to_string(),
            description: None,
            project: ProjectRef {
                id: 1,
                key: "PROJ".to_string(),
                name: "Project".to_string(),
                is_public: false,
            },
            scm_id: Some("git".to_string()),
            state: None,
            forkable: true,
            is_public: false,
            archived,
            links: RepositoryLinks::default(),
        }
    }

    fn names(repos: &[Repository]) -> Vec<&str> {
        repos.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_archived_repositories_dropped() {
        let result = active_sorted(vec![repo("bar-archived", true), repo("bar-active", false)]);
        assert_eq!(names(&result), ["bar-active"]);
    }

    #[test]
    fn test_sorted_by_name() {
        let result = active_sorted(vec![
            repo("dogs-repo", false),
            repo("test-repos", false),
            repo("another-repo", false),
        ]);
        assert_eq!(names(&result), ["another-repo", "dogs-repo", "test-repos"]);
    }

    #[test]
    fn test_sort_is_case_sensitive_and_stable() {
        let mut first = repo("same", false);
        first.slug = "first".to_string();
        let mut second = repo("same", false);
        second.slug = "second".to_string();

        let result = active_sorted(vec![repo("alpha", false), first, repo("Zulu", false), second]);
        assert_eq!(names(&result), ["Zulu", "alpha", "same", "same"]);
        assert_eq!(result[2].slug, "first");
        assert_eq!(result[3].slug, "second");
    }

    #[test]
    fn test_empty_listing() {
        assert!(active_sorted(Vec::new()).is_empty());
    }

    #[test]
    fn test_missing_archived_flag_means_active() {
        let repo: Repository = serde_json::from_str(
            r#"{"slug":"r","name":"r","project":{"key":"P"},"links":{"clone":[{"href":"ssh://git@host/p/r.git","name":"ssh"}]}}"#,
        )
        .unwrap();
        assert!(!repo.archived);
        assert_eq!(repo.clone_url("ssh"), Some("ssh://git@host/p/r.git"));
        assert_eq!(repo.clone_url("http"), None);
    }
}
