// src/commands/db.rs
//! Database maintenance commands

use super::progress::BarProgress;
use anyhow::{Context, Result};
use depot::db::paths;
use depot::{GcOptions, GcReport, LogProgress, PackagePool, ProgressTracker};
use std::path::PathBuf;
use tracing::info;

/// Remove unreferenced packages and pool files
pub fn cmd_db_cleanup(
    db_path: &str,
    pool_dir: Option<&str>,
    dry_run: bool,
    no_compact: bool,
    json: bool,
    log_progress: bool,
) -> Result<()> {
    let conn = depot::db::open(db_path)?;
    let pool_root = pool_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| paths::pool_dir(db_path));
    info!("Cleaning up {} (pool: {})", db_path, pool_root.display());

    let pool = PackagePool::new(&pool_root)
        .with_context(|| format!("Cannot open package pool at {}", pool_root.display()))?;

    let options = GcOptions {
        dry_run,
        compact: !no_compact,
    };
    let progress: Box<dyn ProgressTracker> = if log_progress {
        Box::new(LogProgress::new("cleanup"))
    } else if json {
        Box::new(BarProgress::hidden())
    } else {
        Box::new(BarProgress::new())
    };

    let report = depot::gc::cleanup(&conn, &pool, options, progress.as_ref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &GcReport) {
    if report.dry_run {
        println!("Dry run, nothing was deleted. Cleanup would remove:");
    } else {
        println!("Cleanup removed:");
    }
    println!("  Packages: {}", report.packages_deleted);
    println!("  Pool files: {}", report.files_deleted);
    println!("  Disk space: {}", format_bytes(report.bytes_freed));
}

/// Format bytes as human-readable string
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        b if b >= GB => format!("{:.2} GiB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.2} MiB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.2} KiB", b as f64 / KB as f64),
        b => format!("{} bytes", b),
    }
}
