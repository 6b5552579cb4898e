//
//  bitbucket-scm-client
//  cli/project.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Project commands

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;

use crate::api::server::Project;
use crate::output::{format_bool, print_field, TableOutput};

use super::Session;

/// Work with projects
#[derive(Args, Debug)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectSubcommand {
    /// View project details
    View(ViewArgs),
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Project key (defaults to the configured default_project)
    pub project: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProjectDetail {
    #[serde(flatten)]
    project: Project,
}

impl TableOutput for ProjectDetail {
    fn print_table(&self, color: bool) {
        let project = &self.project;
        if color {
            println!("{}", style(&project.name).bold());
        } else {
            println!("{}", project.name);
        }
        println!();
        print_field("Key", &project.key, color);
        print_field("Public", &format_bool(project.is_public, color), color);
        print_field("Personal", &format_bool(project.is_personal(), color), color);
        if let Some(description) = &project.description {
            print_field("Description", description, color);
        }
        if let Some(link) = project.links.self_link.first() {
            print_field("URL", &link.href, color);
        }
    }
}

impl ProjectCommand {
    pub async fn run(&self, session: &Session) -> Result<()> {
        match &self.command {
            ProjectSubcommand::View(args) => self.view(args, session).await,
        }
    }

    async fn view(&self, args: &ViewArgs, session: &Session) -> Result<()> {
        let key = session.project(args.project.as_deref())?;
        let project = session.client()?.get_project(&key).await?;
        session.writer().write(&ProjectDetail { project })
    }
}
