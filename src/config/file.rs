//
//  bitbucket-scm-client
//  config/file.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration File I/O Module
//!
//! Small file helpers used by [`Config`](super::Config).

use std::path::Path;

use anyhow::{Context, Result};

/// Reads a configuration file into a string.
pub fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))
}

pub fn config_exists(path: &Path) -> bool {
    path.exists()
}
