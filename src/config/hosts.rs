//
//  bitbucket-scm-client
//  config/hosts.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Server URL Normalization
//!
//! Bitbucket Server instances are often deployed under a context path
//! (`https://example.com/bitbucket`), so only surrounding noise is stripped;
//! the path is kept as given.
//!
//! ```rust
//! use bitbucket_scm_client::config::normalize_server_url;
//!
//! assert_eq!(normalize_server_url(" bitbucket.example.com/ "), "https://bitbucket.example.com");
//! assert_eq!(
//!     normalize_server_url("http://localhost:7990/bitbucket/"),
//!     "http://localhost:7990/bitbucket"
//! );
//! ```

/// Scheme assumed when a URL is given without one.
pub const DEFAULT_SCHEME: &str = "https";

/// Trims whitespace and trailing slashes, and adds `https://` when no scheme
/// is present. An empty input stays empty.
///
/// Only slashes after the scheme separator are trimmed, so a URL without a
/// host (`https://`) is passed through unchanged and rejected when the client
/// is built.
pub fn normalize_server_url(url: &str) -> String {
    let url = url.trim();
    match url.split_once("://") {
        Some((scheme, rest)) => format!("{}://{}", scheme, rest.trim_end_matches('/')),
        None => {
            let host = url.trim_end_matches('/');
            if host.is_empty() {
                String::new()
            } else {
                format!("{}://{}", DEFAULT_SCHEME, host)
            }
        }
    }
}
