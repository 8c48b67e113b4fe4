// src/commands/mod.rs
//! Command handlers for the depot CLI

mod db;
mod mirror;
pub mod progress;
mod snapshot;
mod system;

pub use db::cmd_db_cleanup;
pub use mirror::{cmd_mirror_drop, cmd_mirror_list};
pub use snapshot::cmd_snapshot_list;
pub use system::{cmd_completions, cmd_init};
