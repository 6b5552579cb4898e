//
//  bitbucket-scm-client
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pagination for Bitbucket Server List Endpoints
//!
//! Bitbucket Server uses offset-based pagination with `start` and `limit`:
//! - Request pages using the `start` parameter (0-indexed)
//! - Check `isLastPage` / `nextPageStart` to determine if more pages exist
//!
//! [`ServerPaginatedResponse`] is the page envelope; [`Pager`] walks the pages
//! lazily, one request per call, so callers can process (and drop) each page
//! before asking for the next.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::BitbucketError;
use crate::api::client::BitbucketServerClient;
use crate::api::template::UriTemplate;

/// Default number of items requested per page.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Paginated response from the Bitbucket Server/Data Center API.
///
/// # Example
///
/// ```rust
/// use bitbucket_scm_client::api::common::ServerPaginatedResponse;
/// use serde::Deserialize;
///
/// #[derive(Clone, Deserialize)]
/// struct Project {
///     key: String,
/// }
///
/// let json = r#"{
///     "values": [{"key": "PROJ"}],
///     "size": 1,
///     "limit": 25,
///     "isLastPage": false,
///     "nextPageStart": 25,
///     "start": 0
/// }"#;
///
/// let response: ServerPaginatedResponse<Project> = serde_json::from_str(json).unwrap();
/// assert!(response.has_next());
/// assert_eq!(response.next_start(), Some(25));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerPaginatedResponse<T> {
    /// Items in the current page.
    pub values: Vec<T>,

    /// Number of items in the current page.
    #[serde(default)]
    pub size: u32,

    /// Maximum items per page (as requested).
    #[serde(default)]
    pub limit: u32,

    /// Whether this is the last page of results.
    ///
    /// Defaults to `true` so a response without paging metadata is treated as
    /// complete instead of looping.
    #[serde(default = "default_last_page", rename = "isLastPage")]
    pub is_last_page: bool,

    /// Start index for the next page of results.
    #[serde(default, rename = "nextPageStart")]
    pub next_page_start: Option<u32>,

    /// Start index of the current page (0-indexed).
    #[serde(default)]
    pub start: u32,
}

fn default_last_page() -> bool {
    true
}

impl<T> ServerPaginatedResponse<T> {
    /// Checks if there are more pages of results available.
    pub fn has_next(&self) -> bool {
        !self.is_last_page
    }

    /// Returns the start index for the next page of results.
    pub fn next_start(&self) -> Option<u32> {
        self.next_page_start
    }

    /// Where to continue after the page fetched at `start`, or `None` to stop.
    ///
    /// A page that claims more results but does not advance the cursor ends
    /// the walk with a warning, since following it would loop forever.
    fn cursor_after(&self, start: u32) -> Option<u32> {
        if !self.has_next() {
            return None;
        }
        match self.next_page_start {
            Some(next) if next > start => Some(next),
            next => {
                warn!(
                    start,
                    next_page_start = ?next,
                    "Server reported more pages without a usable nextPageStart; results are incomplete"
                );
                None
            }
        }
    }
}

/// Lazily walks an offset-paginated endpoint.
///
/// The template must contain a `{?start,limit}` query expression; every other
/// variable is bound by the caller before the pager is created.
///
/// # Example
///
/// ```rust,no_run
/// use bitbucket_scm_client::api::BitbucketServerClient;
/// use bitbucket_scm_client::api::server::{Repository, API_REPOSITORIES_PATH};
/// use bitbucket_scm_client::api::template::UriTemplate;
///
/// # async fn example() -> Result<(), bitbucket_scm_client::api::BitbucketError> {
/// let client = BitbucketServerClient::builder("https://bitbucket.example.com").build()?;
/// let template = UriTemplate::parse(API_REPOSITORIES_PATH)?.set("owner", "PROJ");
/// let mut pager = client.pager::<Repository>(template);
/// while let Some(page) = pager.next_page().await? {
///     println!("{} repositories", page.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Pager<'a, T> {
    client: &'a BitbucketServerClient,
    template: UriTemplate,
    limit: u32,
    next_start: Option<u32>,
    _marker: PhantomData<T>,
}

impl<'a, T: DeserializeOwned> Pager<'a, T> {
    pub(crate) fn new(client: &'a BitbucketServerClient, template: UriTemplate, limit: u32) -> Self {
        Self {
            client,
            template,
            limit,
            next_start: Some(0),
            _marker: PhantomData,
        }
    }

    /// Fetches the next page, or `None` once the last page has been returned.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>, BitbucketError> {
        let Some(start) = self.next_start else {
            return Ok(None);
        };

        let path = self
            .template
            .clone()
            .set("start", start)
            .set("limit", self.limit)
            .expand()?;
        let page: ServerPaginatedResponse<T> = self.client.get_json(&path).await?;

        self.next_start = page.cursor_after(start);

        debug!(
            start,
            size = page.values.len(),
            last = self.next_start.is_none(),
            "Fetched page"
        );

        Ok(Some(page.values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_paging_metadata_is_last_page() {
        let page: ServerPaginatedResponse<String> =
            serde_json::from_str(r#"{"values":["a","b"]}"#).unwrap();
        assert!(!page.has_next());
        assert_eq!(page.next_start(), None);
    }

    #[test]
    fn test_next_page_start() {
        let page: ServerPaginatedResponse<u32> = serde_json::from_str(
            r#"{"values":[1],"size":1,"limit":1,"isLastPage":false,"nextPageStart":1,"start":0}"#,
        )
        .unwrap();
        assert!(page.has_next());
        assert_eq!(page.next_start(), Some(1));
        assert_eq!(page.cursor_after(0), Some(1));
    }

    #[test]
    fn test_stalled_cursor_stops_walk() {
        let stalled: ServerPaginatedResponse<u32> =
            serde_json::from_str(r#"{"values":[1],"isLastPage":false,"nextPageStart":3}"#).unwrap();
        assert_eq!(stalled.cursor_after(3), None);

        let missing: ServerPaginatedResponse<u32> =
            serde_json::from_str(r#"{"values":[1],"isLastPage":false}"#).unwrap();
        assert_eq!(missing.cursor_after(0), None);
    }
}
