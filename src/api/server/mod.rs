//
//  bitbucket-scm-client
//  api/server/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/Data Center API v1.0
//!
//! Resource types and request path templates for the Bitbucket Server REST
//! API.
//!
//! ## Module Organization
//!
//! - [`repositories`] - Repository model and listing policy
//! - [`projects`] - Project model
//! - [`branches`] - Branch and tag refs
//! - [`build_status`] - Commit build status payloads
//!
//! ## Request Paths
//!
//! Paths are [URI templates](crate::api::template). `owner` is the project key
//! and `repo` the repository slug; `path` is a list of file path segments and
//! `at` an optional ref.

pub mod branches;
pub mod build_status;
pub mod projects;
pub mod repositories;

pub use branches::{Branch, Ref, Tag};
pub use build_status::{build_payload, BuildState, BuildStatus, BuildStatusPayload};
pub use projects::Project;
pub use repositories::{active_sorted, CloneLink, ProjectRef, Repository};

/// A single project.
pub const API_PROJECT_PATH: &str = "/rest/api/1.0/projects/{owner}";

/// Repositories of a project, paginated.
pub const API_REPOSITORIES_PATH: &str = "/rest/api/1.0/projects/{owner}/repos{?start,limit}";

/// A single repository.
pub const API_REPOSITORY_PATH: &str = "/rest/api/1.0/projects/{owner}/repos/{repo}";

/// Directory listing or file metadata at a path.
pub const API_BROWSE_PATH: &str =
    "/rest/api/1.0/projects/{owner}/repos/{repo}/browse{/path*}{?at}";

/// Like [`API_BROWSE_PATH`], with `type=true` to only report the entry type.
pub const API_BROWSE_TYPE_PATH: &str =
    "/rest/api/1.0/projects/{owner}/repos/{repo}/browse{/path*}{?type,at}";

/// Raw file content.
pub const API_RAW_PATH: &str = "/rest/api/1.0/projects/{owner}/repos/{repo}/raw{/path*}{?at}";

/// Branches of a repository, paginated.
pub const API_BRANCHES_PATH: &str =
    "/rest/api/1.0/projects/{owner}/repos/{repo}/branches{?start,limit}";

/// The default branch of a repository.
pub const API_DEFAULT_BRANCH_PATH: &str =
    "/rest/api/1.0/projects/{owner}/repos/{repo}/branches/default";

/// Tags of a repository, paginated.
pub const API_TAGS_PATH: &str = "/rest/api/1.0/projects/{owner}/repos/{repo}/tags{?start,limit}";

/// Build statuses of a commit.
pub const API_BUILD_STATUS_PATH: &str = "/rest/build-status/1.0/commits/{hash}";
