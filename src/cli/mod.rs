// src/cli/mod.rs
//! CLI definitions for depot
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! Management contexts:
//! - `db` - Metadata store maintenance (cleanup)
//! - `mirror` - Remote mirror management
//! - `snapshot` - Snapshot inspection

use clap::{Parser, Subcommand};
use clap_complete::Shell;

mod db;
mod mirror;
mod snapshot;

pub use db::DbCommands;
pub use mirror::MirrorCommands;
pub use snapshot::SnapshotCommands;

/// Default location of the metadata database
pub const DEFAULT_DB_PATH: &str = "/var/lib/depot/depot.db";

#[derive(Parser)]
#[command(name = "depot")]
#[command(author = "Depot Project")]
#[command(version)]
#[command(about = "Debian package repository with mirrors, snapshots and garbage collection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new depot database
    Init {
        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,
    },

    /// Metadata store maintenance
    #[command(subcommand)]
    Db(DbCommands),

    /// Remote mirror management
    #[command(subcommand)]
    Mirror(MirrorCommands),

    /// Snapshot inspection
    #[command(subcommand)]
    Snapshot(SnapshotCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
