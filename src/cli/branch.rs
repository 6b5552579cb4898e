//
//  bitbucket-scm-client
//  cli/branch.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Branch commands

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;

use crate::api::server::Ref;
use crate::output::{format_bool, TableRow};

use super::Session;

/// Work with branches
#[derive(Args, Debug)]
pub struct BranchCommand {
    #[command(subcommand)]
    pub command: BranchSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum BranchSubcommand {
    /// List all branches
    #[command(visible_alias = "ls")]
    List(RepoArgs),

    /// Print the default branch
    Default(RepoArgs),
}

/// Identifies a repository.
#[derive(Args, Debug)]
pub struct RepoArgs {
    /// Project key
    pub project: String,

    /// Repository slug
    pub repo: String,
}

/// A branch or tag as shown in list tables.
#[derive(Debug, Serialize)]
pub(super) struct RefListItem {
    name: String,
    id: String,
    commit: Option<String>,
    is_default: bool,
}

impl From<Ref> for RefListItem {
    fn from(r: Ref) -> Self {
        Self {
            name: r.display_id,
            id: r.id,
            commit: r.latest_commit,
            is_default: r.is_default,
        }
    }
}

impl TableRow for RefListItem {
    fn headers() -> &'static [&'static str] {
        &["Name", "Commit", "Default"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        let name = if color && self.is_default {
            style(&self.name).green().bold().to_string()
        } else {
            self.name.clone()
        };
        let commit = self
            .commit
            .as_deref()
            .map(|c| c.chars().take(12).collect())
            .unwrap_or_else(|| "-".to_string());
        vec![name, commit, format_bool(self.is_default, color)]
    }
}

impl BranchCommand {
    pub async fn run(&self, session: &Session) -> Result<()> {
        match &self.command {
            BranchSubcommand::List(args) => self.list(args, session).await,
            BranchSubcommand::Default(args) => self.default_branch(args, session).await,
        }
    }

    async fn list(&self, args: &RepoArgs, session: &Session) -> Result<()> {
        let branches = session
            .client()?
            .get_branches(&args.project, &args.repo)
            .await?;
        let items: Vec<RefListItem> = branches.into_iter().map(RefListItem::from).collect();
        session.writer().write_list(&items, "No branches found.")
    }

    async fn default_branch(&self, args: &RepoArgs, session: &Session) -> Result<()> {
        let branch = session
            .client()?
            .get_default_branch(&args.project, &args.repo)
            .await?;
        let writer = session.writer();
        match branch {
            Some(branch) => writer.write_value(
                &serde_json::to_value(&branch)?,
                &branch.display_id,
            ),
            None => writer.write_value(
                &serde_json::Value::Null,
                "Repository has no default branch.",
            ),
        }
    }
}
