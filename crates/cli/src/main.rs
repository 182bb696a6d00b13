// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ot: track long-running backup, replication and restore jobs

mod color;
mod commands;
mod config;
mod env;
mod exit_error;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::operation::OperationCommand;
use crate::commands::track::{ResumeArgs, TrackArgs};
use crate::config::Settings;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

#[derive(Parser)]
#[command(name = "ot", version = VERSION, styles = color::styles())]
#[command(about = "Track long-running backup, replication and restore jobs")]
struct Cli {
    /// Log to stderr instead of the log file
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long = "output", short = 'o', value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Operation(OperationCommand),
    /// Start tracking a job and follow it until it settles
    Track(TrackArgs),
    /// Resume polling every active job of a type
    Resume(ResumeArgs),
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load()?;
    let _guard = logging::init(&settings.state_dir, cli.verbose);
    tracing::debug!(state_dir = %settings.state_dir.display(), "settings loaded");

    match cli.command {
        Commands::Operation(command) => commands::operation::handle(command, &settings, cli.output),
        Commands::Track(args) => commands::track::track(args, &settings, cli.output).await,
        Commands::Resume(args) => commands::track::resume(args, &settings, cli.output).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        if let Some(exit) = e.downcast_ref::<ExitError>() {
            if !exit.message.is_empty() {
                eprintln!("{}", exit.message);
            }
            std::process::exit(exit.code);
        }
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
