//! Snapshift CLI - State Snapshot Migration
//!
//! Command-line interface for moving state snapshots between state files.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::debug;

use snapshift::cli::{commands, Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    debug!("Snapshift v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Snapshift v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            if let Some(suggestion) = commands::recovery_suggestion(&err) {
                eprintln!("Hint: {}", suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Show { path } => commands::show(&path),
        Commands::Pull { path, out } => commands::pull(&path, out.as_deref()),
        Commands::Push {
            bundle,
            path,
            force,
            backup,
        } => commands::push(&bundle, backup.options_for(&path), force),
        Commands::Migrate { from, to, backup } => {
            commands::migrate_state(&from, backup.options_for(&to))
        }
    }
}
