// src/cli/db.rs
//! Database maintenance commands

use super::DEFAULT_DB_PATH;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum DbCommands {
    /// Remove packages and pool files no mirror, local repo or snapshot references
    ///
    /// Runs in three steps: collect every referenced package, delete the
    /// unreferenced package records in one batch, then delete pool files
    /// no remaining package points at. Nothing else may modify the
    /// repository while cleanup runs.
    Cleanup {
        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,

        /// Package pool directory (default: <db dir>/pool, or $DEPOT_POOL_DIR)
        #[arg(short, long)]
        pool_dir: Option<String>,

        /// Show what would be removed without removing anything
        #[arg(long)]
        dry_run: bool,

        /// Skip compacting the database afterwards
        #[arg(long)]
        no_compact: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Log progress lines instead of drawing a progress bar (for cron jobs)
        #[arg(long)]
        log_progress: bool,
    },
}
