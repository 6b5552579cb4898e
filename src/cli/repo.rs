//
//  bitbucket-scm-client
//  cli/repo.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Repository commands

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;

use crate::api::server::Repository;
use crate::output::{format_bool, format_state, print_field, truncate, TableOutput, TableRow};

use super::Session;

/// Work with repositories
#[derive(Args, Debug)]
pub struct RepoCommand {
    #[command(subcommand)]
    pub command: RepoSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum RepoSubcommand {
    /// List active repositories of a project, sorted by name
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// View repository details
    View(ViewArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project key (defaults to the configured default_project)
    pub project: Option<String>,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Project key
    pub project: String,

    /// Repository slug
    pub repo: String,
}

#[derive(Debug, Serialize)]
struct RepoListItem {
    slug: String,
    name: String,
    description: Option<String>,
    is_public: bool,
}

impl From<Repository> for RepoListItem {
    fn from(repo: Repository) -> Self {
        Self {
            slug: repo.slug,
            name: repo.name,
            description: repo.description,
            is_public: repo.is_public,
        }
    }
}

impl TableRow for RepoListItem {
    fn headers() -> &'static [&'static str] {
        &["Name", "Slug", "Public", "Description"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        let name = if color {
            style(&self.name).bold().to_string()
        } else {
            self.name.clone()
        };
        vec![
            name,
            self.slug.clone(),
            format_bool(self.is_public, color),
            truncate(self.description.as_deref().unwrap_or("-"), 40),
        ]
    }
}

#[derive(Debug, Serialize)]
struct RepoDetail {
    #[serde(flatten)]
    repository: Repository,
}

impl TableOutput for RepoDetail {
    fn print_table(&self, color: bool) {
        let repo = &self.repository;
        let title = format!("{}/{}", repo.project.key, repo.slug);
        if color {
            println!("{}", style(title).bold());
        } else {
            println!("{}", title);
        }
        println!();
        print_field("Name", &repo.name, color);
        if let Some(description) = &repo.description {
            print_field("Description", description, color);
        }
        if let Some(state) = &repo.state {
            print_field("State", &format_state(state, color), color);
        }
        print_field("Public", &format_bool(repo.is_public, color), color);
        print_field("Archived", &format_bool(repo.archived, color), color);
        if let Some(url) = repo.clone_url("http") {
            print_field("Clone (HTTP)", url, color);
        }
        if let Some(url) = repo.clone_url("ssh") {
            print_field("Clone (SSH)", url, color);
        }
        if let Some(url) = repo.web_url() {
            print_field("URL", url, color);
        }
    }
}

impl RepoCommand {
    pub async fn run(&self, session: &Session) -> Result<()> {
        match &self.command {
            RepoSubcommand::List(args) => self.list(args, session).await,
            RepoSubcommand::View(args) => self.view(args, session).await,
        }
    }

    async fn list(&self, args: &ListArgs, session: &Session) -> Result<()> {
        let project = session.project(args.project.as_deref())?;
        let client = session.client()?;

        let items: Vec<RepoListItem> = client
            .get_repositories(&project)
            .await?
            .into_iter()
            .map(RepoListItem::from)
            .collect();

        session.writer().write_list(
            &items,
            &format!("No active repositories found in project '{}'.", project),
        )
    }

    async fn view(&self, args: &ViewArgs, session: &Session) -> Result<()> {
        let client = session.client()?;
        let repository = client.get_repository(&args.project, &args.repo).await?;
        session.writer().write(&RepoDetail { repository })
    }
}
