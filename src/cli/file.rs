//
//  bitbucket-scm-client
//  cli/file.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! File commands

use std::io::Write;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use crate::output::OutputFormat;

use super::Session;

/// Read repository files
#[derive(Args, Debug)]
pub struct FileCommand {
    #[command(subcommand)]
    pub command: FileSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum FileSubcommand {
    /// Print the raw content of a file
    Cat(PathArgs),

    /// Check whether a path exists; exits non-zero when it does not
    Exists(PathArgs),
}

#[derive(Args, Debug)]
pub struct PathArgs {
    /// Project key
    pub project: String,

    /// Repository slug
    pub repo: String,

    /// Path inside the repository (e.g. folder/Jenkinsfile)
    pub path: String,

    /// Branch, tag or commit to read from
    #[arg(long)]
    pub at: Option<String>,
}

impl FileCommand {
    pub async fn run(&self, session: &Session) -> Result<()> {
        match &self.command {
            FileSubcommand::Cat(args) => self.cat(args, session).await,
            FileSubcommand::Exists(args) => self.exists(args, session).await,
        }
    }

    async fn cat(&self, args: &PathArgs, session: &Session) -> Result<()> {
        let bytes = session
            .client()?
            .get_file_bytes(&args.project, &args.repo, &args.path, args.at.as_deref())
            .await?;

        match session.writer().format() {
            OutputFormat::Json => {
                let content = String::from_utf8_lossy(&bytes);
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "path": args.path, "content": content }))?
                )
            }
            OutputFormat::Table => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&bytes)?;
                stdout.flush()?;
            }
        }
        Ok(())
    }

    async fn exists(&self, args: &PathArgs, session: &Session) -> Result<()> {
        let path_type = session
            .client()?
            .path_type(&args.project, &args.repo, &args.path, args.at.as_deref())
            .await?;

        let writer = session.writer();
        let value = json!({ "path": args.path, "exists": path_type.is_some(), "type": path_type });
        match path_type {
            Some(kind) => writer.write_value(&value, &format!("{:?}", kind).to_lowercase()),
            None => {
                writer.write_value(&value, "missing")?;
                bail!("Path '{}' not found", args.path)
            }
        }
    }
}
