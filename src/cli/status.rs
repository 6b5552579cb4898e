//
//  bitbucket-scm-client
//  cli/status.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Build status commands

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use serde_json::json;

use crate::api::server::{BuildState, BuildStatus};
use crate::output::OutputFormat;

use super::Session;

/// Report commit build statuses
#[derive(Args, Debug)]
pub struct StatusCommand {
    #[command(subcommand)]
    pub command: StatusSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum StatusSubcommand {
    /// Post a build status for a commit
    Post(PostArgs),
}

#[derive(Args, Debug)]
pub struct PostArgs {
    /// Commit hash the status applies to
    pub hash: String,

    /// Build state
    #[arg(long, short = 's', value_enum)]
    pub state: StateArg,

    /// Display name (longer names are cut to 255 characters)
    #[arg(long, short = 'n')]
    pub name: String,

    /// Link back to the build
    #[arg(long)]
    pub url: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateArg {
    #[value(alias = "inprogress")]
    InProgress,
    Successful,
    Failed,
    Stopped,
}

impl From<StateArg> for BuildState {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::InProgress => Self::InProgress,
            StateArg::Successful => Self::Successful,
            StateArg::Failed => Self::Failed,
            StateArg::Stopped => Self::Stopped,
        }
    }
}

impl PostArgs {
    fn build_status(&self) -> BuildStatus {
        BuildStatus {
            hash: self.hash.clone(),
            state: Some(self.state.into()),
            name: self.name.clone(),
            url: self.url.clone(),
            description: self.description.clone(),
        }
    }
}

impl StatusCommand {
    pub async fn run(&self, session: &Session) -> Result<()> {
        match &self.command {
            StatusSubcommand::Post(args) => self.post(args, session).await,
        }
    }

    async fn post(&self, args: &PostArgs, session: &Session) -> Result<()> {
        let status = args.build_status();
        session.client()?.post_build_status(&status).await?;

        let writer = session.writer();
        let state = BuildState::from(args.state);
        if writer.format() == OutputFormat::Json {
            writer.write_value(&json!({ "hash": status.hash, "state": state }), "")
        } else {
            writer.write_success(&format!("Posted {} for {}", state, status.hash));
            Ok(())
        }
    }
}
