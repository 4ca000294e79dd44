//! `ggpk` binary entry point
//!
//! A thin wrapper around `ggpk-formats`: parses the command line, installs
//! the log subscriber and runs one command.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::List { archive, tree } => commands::list(&archive, tree),
        Command::Extract {
            archive,
            path,
            destination,
            recursive,
        } => commands::extract(&archive, &path, &destination, recursive),
        Command::Check { archive, fail_fast } => commands::check(&archive, fail_fast),
        Command::Defrag { archive, output } => commands::defrag(&archive, &output),
        Command::Pack { source, output } => commands::pack(&source, &output),
    }
}
