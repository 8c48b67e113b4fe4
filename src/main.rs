// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};

mod cli;
mod commands;

use cli::{Cli, Commands, DbCommands, MirrorCommands, SnapshotCommands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { db_path }) => commands::cmd_init(&db_path),

        Some(Commands::Db(DbCommands::Cleanup {
            db_path,
            pool_dir,
            dry_run,
            no_compact,
            json,
            log_progress,
        })) => commands::cmd_db_cleanup(
            &db_path,
            pool_dir.as_deref(),
            dry_run,
            no_compact,
            json,
            log_progress,
        ),

        Some(Commands::Mirror(MirrorCommands::Drop {
            name,
            db_path,
            force,
        })) => commands::cmd_mirror_drop(&name, &db_path, force),
        Some(Commands::Mirror(MirrorCommands::List { db_path })) => {
            commands::cmd_mirror_list(&db_path)
        }

        Some(Commands::Snapshot(SnapshotCommands::List { db_path })) => {
            commands::cmd_snapshot_list(&db_path)
        }

        Some(Commands::Completions { shell }) => commands::cmd_completions(shell),

        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
