// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Some(Commands::Cook {
            recipes,
            timeout,
            parallel,
            force,
            fail_fast,
        }) => commands::cmd_cook(&cli.settings, &recipes, timeout, parallel, force, fail_fast),
        Some(Commands::Fetch { recipes }) => commands::cmd_fetch(&cli.settings, &recipes),
        Some(Commands::Status { recipes }) => commands::cmd_status(&cli.settings, &recipes),
        Some(Commands::List) => commands::cmd_list(&cli.settings),
        Some(Commands::Invalidate { recipes }) => commands::cmd_invalidate(&cli.settings, &recipes),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
