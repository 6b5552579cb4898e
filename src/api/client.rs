//
//  bitbucket-scm-client
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server Client
//!
//! [`BitbucketServerClient`] turns high-level operations into templated
//! request paths, attaches credentials, and sends everything through the
//! rate-limit-aware [`Dispatcher`].
//!
//! ## Features
//!
//! - Server URLs with or without a context path (`https://host/bitbucket`)
//! - Authentication header injection
//! - Offset pagination via [`Pager`]
//! - Archived repositories hidden from listings
//! - Build status reporting

use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::audit::RequestAudit;
use super::common::{BitbucketError, Pager, DEFAULT_PAGE_LIMIT};
use super::dispatch::{Cancellation, Dispatcher, RetryPolicy, Sleeper};
use super::server::{
    active_sorted, build_payload, Branch, BuildStatus, Project, Repository, Tag, API_BRANCHES_PATH,
    API_BROWSE_TYPE_PATH, API_BUILD_STATUS_PATH, API_DEFAULT_BRANCH_PATH, API_PROJECT_PATH,
    API_RAW_PATH, API_REPOSITORIES_PATH, API_REPOSITORY_PATH, API_TAGS_PATH,
};
use super::template::{TemplateValue, UriTemplate};
use super::transport::TransportConfig;
use crate::auth::AuthCredential;

/// Kind of entry found at a repository path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PathType {
    File,
    Directory,
    Submodule,
}

#[derive(Deserialize)]
struct BrowseType {
    #[serde(rename = "type")]
    path_type: PathType,
}

/// Client for a single Bitbucket Server/Data Center instance.
///
/// # Example
///
/// ```rust,no_run
/// use bitbucket_scm_client::api::BitbucketServerClient;
/// use bitbucket_scm_client::auth::AuthCredential;
///
/// # async fn example() -> Result<(), bitbucket_scm_client::api::BitbucketError> {
/// let client = BitbucketServerClient::builder("bitbucket.example.com")
///     .auth(AuthCredential::bearer("your-pat"))
///     .build()?;
///
/// for repo in client.get_repositories("PROJ").await? {
///     println!("{}", repo.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct BitbucketServerClient {
    base_url: Url,
    auth: Option<AuthCredential>,
    dispatcher: Dispatcher,
    page_limit: u32,
}

impl BitbucketServerClient {
    /// Starts building a client for the given server URL.
    ///
    /// `https://` is assumed when the URL has no scheme.
    pub fn builder(server_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(server_url)
    }

    /// The server URL every request path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The retry policy applied to rate-limited requests.
    pub fn retry_policy(&self) -> &RetryPolicy {
        self.dispatcher.policy()
    }

    /// Creates a lazy pager over a paginated endpoint.
    ///
    /// `template` must have every variable except `start` and `limit` bound.
    pub fn pager<T: DeserializeOwned>(&self, template: UriTemplate) -> Pager<'_, T> {
        Pager::new(self, template, self.page_limit)
    }

    /// Fetches a project by key.
    pub async fn get_project(&self, owner: &str) -> Result<Project, BitbucketError> {
        let path = UriTemplate::parse(API_PROJECT_PATH)?
            .set("owner", owner)
            .expand()?;
        self.get_json(&path).await
    }

    /// Fetches a repository by project key and slug.
    pub async fn get_repository(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Repository, BitbucketError> {
        let path = UriTemplate::parse(API_REPOSITORY_PATH)?
            .set("owner", owner)
            .set("repo", repo)
            .expand()?;
        self.get_json(&path).await
    }

    /// Lists the active repositories of a project, sorted by name.
    ///
    /// Archived repositories are dropped as each page arrives. The sort is
    /// stable and case-sensitive. An empty project yields an empty list.
    pub async fn get_repositories(&self, owner: &str) -> Result<Vec<Repository>, BitbucketError> {
        let template = UriTemplate::parse(API_REPOSITORIES_PATH)?.set("owner", owner);
        let mut pager = self.pager::<Repository>(template);

        let mut repositories = Vec::new();
        while let Some(page) = pager.next_page().await? {
            repositories.extend(page.into_iter().filter(|repo| !repo.archived));
        }

        let repositories = active_sorted(repositories);
        debug!(owner, count = repositories.len(), "Listed repositories");
        Ok(repositories)
    }

    /// Reads a text file such as a `Jenkinsfile`.
    ///
    /// `at` selects a branch, tag or commit; the default branch is used when
    /// absent. Bytes that are not valid UTF-8 are replaced with `U+FFFD`; use
    /// [`get_file_bytes`](Self::get_file_bytes) for binary files.
    pub async fn get_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        at: Option<&str>,
    ) -> Result<String, BitbucketError> {
        let bytes = self.get_file_bytes(owner, repo, path, at).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reads the raw bytes of a file, unmodified.
    pub async fn get_file_bytes(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        at: Option<&str>,
    ) -> Result<Vec<u8>, BitbucketError> {
        let path = UriTemplate::parse(API_RAW_PATH)?
            .set("owner", owner)
            .set("repo", repo)
            .set("path", TemplateValue::path(path))
            .set_opt("at", at)
            .expand()?;
        let response = self.send(Method::GET, &path, None).await?;
        let bytes = self.dispatcher.cancellable(response.bytes()).await?;
        Ok(bytes.to_vec())
    }

    /// Reports what kind of entry lives at `path`, or `None` when nothing does.
    pub async fn path_type(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        at: Option<&str>,
    ) -> Result<Option<PathType>, BitbucketError> {
        let path = UriTemplate::parse(API_BROWSE_TYPE_PATH)?
            .set("owner", owner)
            .set("repo", repo)
            .set("path", TemplateValue::path(path))
            .set("type", true)
            .set_opt("at", at)
            .expand()?;

        match self.get_json::<BrowseType>(&path).await {
            Ok(browse) => Ok(Some(browse.path_type)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Checks whether a file or directory exists at `path`.
    pub async fn path_exists(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        at: Option<&str>,
    ) -> Result<bool, BitbucketError> {
        Ok(self.path_type(owner, repo, path, at).await?.is_some())
    }

    /// Lists every branch of a repository.
    pub async fn get_branches(&self, owner: &str, repo: &str) -> Result<Vec<Branch>, BitbucketError> {
        let template = UriTemplate::parse(API_BRANCHES_PATH)?
            .set("owner", owner)
            .set("repo", repo);
        self.collect(template).await
    }

    /// Fetches the default branch, or `None` for an empty repository.
    pub async fn get_default_branch(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Option<Branch>, BitbucketError> {
        let path = UriTemplate::parse(API_DEFAULT_BRANCH_PATH)?
            .set("owner", owner)
            .set("repo", repo)
            .expand()?;

        let response = match self.send(Method::GET, &path, None).await {
            Ok(response) => response,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = self.dispatcher.cancellable(response.bytes()).await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Lists every tag of a repository.
    pub async fn get_tags(&self, owner: &str, repo: &str) -> Result<Vec<Tag>, BitbucketError> {
        let template = UriTemplate::parse(API_TAGS_PATH)?
            .set("owner", owner)
            .set("repo", repo);
        self.collect(template).await
    }

    /// Reports a build result for a commit.
    ///
    /// The status is validated before anything is sent; an invalid one fails
    /// with [`BitbucketError::InvalidStatus`] and no request is made.
    pub async fn post_build_status(&self, status: &BuildStatus) -> Result<(), BitbucketError> {
        let body = build_payload(status)?;
        let path = UriTemplate::parse(API_BUILD_STATUS_PATH)?
            .set("hash", status.hash.trim())
            .expand()?;

        self.send(Method::POST, &path, Some(body)).await?;
        debug!(hash = status.hash.trim(), "Posted build status");
        Ok(())
    }

    /// Sends a GET request and decodes the JSON response.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BitbucketError> {
        let response = self.send(Method::GET, path, None).await?;
        let bytes = self.dispatcher.cancellable(response.bytes()).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn collect<T: DeserializeOwned>(
        &self,
        template: UriTemplate,
    ) -> Result<Vec<T>, BitbucketError> {
        let mut pager = self.pager::<T>(template);
        let mut items = Vec::new();
        while let Some(page) = pager.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<Response, BitbucketError> {
        let url = self.url_for(path)?;
        let mut request = self
            .dispatcher
            .request(method, url)
            .header(ACCEPT, "application/json");

        if let Some(auth) = &self.auth {
            request = auth.apply_to_request(request);
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        self.dispatcher.execute(request.build()?).await
    }

    fn url_for(&self, path: &str) -> Result<Url, BitbucketError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}{}", base, path))?)
    }
}

/// Builder for [`BitbucketServerClient`].
pub struct ClientBuilder {
    server_url: String,
    auth: Option<AuthCredential>,
    audit: Option<Arc<dyn RequestAudit>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    policy: RetryPolicy,
    transport: TransportConfig,
    cancellation: Option<Cancellation>,
    page_limit: u32,
}

impl ClientBuilder {
    fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            auth: None,
            audit: None,
            sleeper: None,
            policy: RetryPolicy::default(),
            transport: TransportConfig::default(),
            cancellation: None,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Sets the credentials sent with every request.
    pub fn auth(mut self, auth: AuthCredential) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets or clears the credentials; `None` sends requests unauthenticated.
    pub fn auth_opt(mut self, auth: Option<AuthCredential>) -> Self {
        self.auth = auth;
        self
    }

    /// Installs a hook that observes every outbound request.
    pub fn audit(mut self, audit: Arc<dyn RequestAudit>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Replaces how the client waits between rate-limited attempts.
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Bounds how often and how long rate-limited requests are retried.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Timeouts and connection pool settings for the HTTP client.
    pub fn transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// Lets the caller abort an in-flight request or a pending backoff.
    pub fn cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// Number of items requested per page. Zero falls back to the default.
    pub fn page_limit(mut self, limit: u32) -> Self {
        self.page_limit = if limit == 0 { DEFAULT_PAGE_LIMIT } else { limit };
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - [`BitbucketError::InvalidUrl`] when the server URL cannot be parsed
    /// - [`BitbucketError::Transport`] when the HTTP client cannot be created
    pub fn build(self) -> Result<BitbucketServerClient, BitbucketError> {
        let base_url = parse_server_url(&self.server_url)?;
        let http = self.transport.build()?;

        let mut dispatcher = Dispatcher::new(http).with_policy(self.policy);
        if let Some(audit) = self.audit {
            dispatcher = dispatcher.with_audit(audit);
        }
        if let Some(sleeper) = self.sleeper {
            dispatcher = dispatcher.with_sleeper(sleeper);
        }
        if let Some(cancellation) = self.cancellation {
            dispatcher = dispatcher.with_cancellation(cancellation);
        }

        debug!(url = %base_url, auth = self.auth.as_ref().map(AuthCredential::kind), "Created client");

        Ok(BitbucketServerClient {
            base_url,
            auth: self.auth,
            dispatcher,
            page_limit: self.page_limit,
        })
    }
}

fn parse_server_url(server_url: &str) -> Result<Url, BitbucketError> {
    let server_url = server_url.trim();
    let mut url = if server_url.contains("://") {
        Url::parse(server_url)?
    } else {
        Url::parse(&format!("https://{}", server_url))?
    };

    if url.host_str().map_or(true, str::is_empty) {
        return Err(url::ParseError::EmptyHost.into());
    }

    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&path);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_url() {
        assert_eq!(
            parse_server_url("bitbucket.example.com").unwrap().as_str(),
            "https://bitbucket.example.com/"
        );
        assert_eq!(
            parse_server_url(" http://localhost:7990/bitbucket/ ").unwrap().as_str(),
            "http://localhost:7990/bitbucket"
        );
        for missing_host in ["https://", "http:///", " https:// ", "ssh://"] {
            assert!(
                matches!(
                    parse_server_url(missing_host),
                    Err(BitbucketError::InvalidUrl(_))
                ),
                "{missing_host:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_builder_rejects_url_without_host() {
        let result = BitbucketServerClient::builder("http:///").build();
        assert!(matches!(result, Err(BitbucketError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_keeps_context_path() {
        let client = BitbucketServerClient::builder("http://localhost:7990/bitbucket/")
            .build()
            .unwrap();
        let url = client
            .url_for("/rest/api/1.0/projects/PROJ/repos?start=0&limit=100")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:7990/bitbucket/rest/api/1.0/projects/PROJ/repos?start=0&limit=100"
        );
    }

    #[test]
    fn test_page_limit_zero_uses_default() {
        let client = BitbucketServerClient::builder("localhost")
            .page_limit(0)
            .build()
            .unwrap();
        assert_eq!(client.page_limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(client.retry_policy(), &RetryPolicy::default());
    }

    #[test]
    fn test_path_type_tokens() {
        let browse: BrowseType = serde_json::from_str(r#"{"type":"DIRECTORY"}"#).unwrap();
        assert_eq!(browse.path_type, PathType::Directory);
    }
}
