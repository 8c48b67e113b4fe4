// src/cli/snapshot.rs
//! Snapshot commands

use super::DEFAULT_DB_PATH;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// List snapshots
    List {
        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,
    },
}
