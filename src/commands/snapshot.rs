// src/commands/snapshot.rs
//! Snapshot commands

use anyhow::Result;
use depot::db::models::Snapshot;

/// List snapshots
pub fn cmd_snapshot_list(db_path: &str) -> Result<()> {
    let conn = depot::db::open(db_path)?;
    let snapshots = Snapshot::list_all(&conn)?;

    if snapshots.is_empty() {
        println!("No snapshots.");
        return Ok(());
    }

    println!("Snapshots:");
    for snapshot in snapshots {
        println!("  {}", snapshot);
    }
    Ok(())
}
