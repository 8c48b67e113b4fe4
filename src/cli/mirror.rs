// src/cli/mirror.rs
//! Remote mirror commands

use super::DEFAULT_DB_PATH;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum MirrorCommands {
    /// Drop a mirror
    ///
    /// Refuses if snapshots were taken from the mirror, unless --force is
    /// given. Packages the mirror pulled in stay until the next `db cleanup`.
    Drop {
        /// Mirror name
        name: String,

        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,

        /// Drop even if snapshots depend on the mirror
        #[arg(short, long)]
        force: bool,
    },

    /// List mirrors
    List {
        /// Path to the database file
        #[arg(short, long, default_value = DEFAULT_DB_PATH)]
        db_path: String,
    },
}
