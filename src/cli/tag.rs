//
//  bitbucket-scm-client
//  cli/tag.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Tag commands

use anyhow::Result;
use clap::{Args, Subcommand};

use super::branch::{RefListItem, RepoArgs};
use super::Session;

/// Work with tags
#[derive(Args, Debug)]
pub struct TagCommand {
    #[command(subcommand)]
    pub command: TagSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TagSubcommand {
    /// List all tags
    #[command(visible_alias = "ls")]
    List(RepoArgs),
}

impl TagCommand {
    pub async fn run(&self, session: &Session) -> Result<()> {
        match &self.command {
            TagSubcommand::List(args) => {
                let tags = session
                    .client()?
                    .get_tags(&args.project, &args.repo)
                    .await?;
                let items: Vec<RefListItem> = tags.into_iter().map(RefListItem::from).collect();
                session.writer().write_list(&items, "No tags found.")
            }
        }
    }
}
