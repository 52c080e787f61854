//! CLI Module
//!
//! Command-line interface for moving state snapshots between state files.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::backends::LocalStateOptions;

/// Snapshift - move state snapshots between state managers
#[derive(Parser, Debug)]
#[command(name = "snapshift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the lineage, serial and digest of a state file
    #[command(name = "show")]
    Show {
        /// Path to the state file
        path: PathBuf,
    },

    /// Export the latest snapshot as a bundle
    #[command(name = "pull")]
    Pull {
        /// Path to the state file
        path: PathBuf,

        /// Write the bundle here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Import a bundle into a state file
    #[command(name = "push")]
    Push {
        /// Bundle to import
        bundle: PathBuf,

        /// Path to the state file
        path: PathBuf,

        /// Skip lineage and serial checks
        #[arg(short, long)]
        force: bool,

        #[command(flatten)]
        backup: BackupArgs,
    },

    /// Copy the latest snapshot from one state file to another
    #[command(name = "migrate")]
    Migrate {
        /// Source state file
        from: PathBuf,

        /// Destination state file
        to: PathBuf,

        #[command(flatten)]
        backup: BackupArgs,
    },
}

/// Backup settings for the state file being written.
#[derive(Args, Debug, Clone, Default)]
pub struct BackupArgs {
    /// Backup path (defaults to the state path plus ".backup")
    #[arg(long, value_name = "PATH")]
    pub backup: Option<PathBuf>,

    /// Do not write a backup
    #[arg(long, conflicts_with = "backup")]
    pub no_backup: bool,
}

impl BackupArgs {
    /// Options for writing the state at `path`.
    pub fn options_for(&self, path: &Path) -> LocalStateOptions {
        let options = LocalStateOptions::new(path);
        match (&self.backup, self.no_backup) {
            (_, true) => options.without_backup(),
            (Some(backup), false) => options.with_backup(backup),
            (None, false) => options,
        }
    }
}
