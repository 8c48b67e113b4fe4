// src/commands/system.rs
//! System commands (init, completions)

use crate::cli::Cli;
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;
use depot::PackagePool;
use depot::db::paths;
use std::io;
use tracing::info;

/// Initialize the depot database and its package pool
pub fn cmd_init(db_path: &str) -> Result<()> {
    info!("Initializing depot database at: {}", db_path);
    depot::db::init(db_path)?;
    println!("Database initialized successfully at: {}", db_path);

    let pool = PackagePool::new(paths::pool_dir(db_path))?;
    println!("Package pool: {}", pool.root().display());
    Ok(())
}

/// Print shell completions to stdout
pub fn cmd_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "depot", &mut io::stdout());
    Ok(())
}
