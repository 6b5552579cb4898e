//
//  bitbucket-scm-client
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! HTTP client for the Bitbucket Server/Data Center REST API v1.0.
//!
//! ## Architecture
//!
//! - [`template`]: URI template expansion for request paths
//! - [`audit`]: Observation hook called with every outbound request
//! - [`transport`]: `reqwest` client construction (cookies off, pooling on)
//! - [`dispatch`]: Request execution with rate-limit retry
//! - [`client`]: High-level operations (repositories, files, refs, build status)
//! - [`server`]: Resource types and path templates
//! - [`common`]: Errors and pagination
//!
//! ## Creating a Client
//!
//! ```rust,no_run
//! use bitbucket_scm_client::api::BitbucketServerClient;
//! use bitbucket_scm_client::auth::AuthCredential;
//!
//! let client = BitbucketServerClient::builder("https://bitbucket.example.com")
//!     .auth(AuthCredential::bearer("your-pat"))
//!     .build()
//!     .expect("Failed to create client");
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`BitbucketError`]:
//!
//! - `Api`: non-2xx response (not retried)
//! - `RateLimitExceeded`: 429 on every attempt
//! - `Transport`: connection failure (not retried)
//! - `InvalidStatus`: build status rejected before sending
//! - `Template`: request path could not be built

pub mod audit;

pub mod client;

pub mod common;

pub mod dispatch;

pub mod server;

pub mod template;

pub mod transport;

/// Re-export of the main Bitbucket Server client and its builder.
pub use client::{BitbucketServerClient, ClientBuilder, PathType};

/// Re-export of the error type shared by every operation.
pub use common::BitbucketError;
