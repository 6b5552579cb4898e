//
//  bitbucket-scm-client
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bitbucket_scm_client::api::dispatch::Cancellation;
use bitbucket_scm_client::cli::{error_message, exit_code, Cli, Commands, Session};
use bitbucket_scm_client::exit_codes;
use bitbucket_scm_client::output::{OutputFormat, OutputWriter};

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();

    let cancellation = Cancellation::new();
    watch_ctrl_c(cancellation.clone());

    match run(cli, cancellation).await {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            OutputWriter::new(OutputFormat::Table).write_error(&error_message(&e));
            std::process::exit(exit_code(&e));
        }
    }
}

/// Initialize logging from `BBSCM_LOG`, defaulting to warnings.
fn init_logging() {
    let filter = EnvFilter::try_from_env("BBSCM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Fires the cancellation signal on the first Ctrl+C and exits on the second.
fn watch_ctrl_c(cancellation: Cancellation) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        debug!("Interrupt received, cancelling");
        cancellation.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(exit_codes::CANCELLED);
        }
    });
}

/// Main command dispatcher
async fn run(cli: Cli, cancellation: Cancellation) -> Result<()> {
    if let Commands::Version = cli.command {
        println!("bbscm version {}", bitbucket_scm_client::VERSION);
        return Ok(());
    }

    let session = Session::load(cli.global, cancellation)?;

    match cli.command {
        Commands::Repo(cmd) => cmd.run(&session).await,
        Commands::Project(cmd) => cmd.run(&session).await,
        Commands::Branch(cmd) => cmd.run(&session).await,
        Commands::Tag(cmd) => cmd.run(&session).await,
        Commands::File(cmd) => cmd.run(&session).await,
        Commands::Status(cmd) => cmd.run(&session).await,
        Commands::Version => Ok(()),
    }
}
