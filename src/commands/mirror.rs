// src/commands/mirror.rs
//! Remote mirror commands

use anyhow::Result;
use depot::Error;
use depot::db::models::{RemoteMirror, Snapshot};
use rusqlite::Connection;
use tracing::info;

/// Drop a mirror, refusing when snapshots depend on it unless forced
pub fn cmd_mirror_drop(name: &str, db_path: &str, force: bool) -> Result<()> {
    info!("Dropping mirror: {}", name);
    let conn = depot::db::open(db_path)?;

    match depot::gc::drop_mirror(&conn, name, force) {
        Ok(outcome) => {
            if !outcome.overridden.is_empty() {
                eprintln!(
                    "Warning: snapshots taken from this mirror keep its packages: {}",
                    outcome.overridden.join(", ")
                );
            }
            println!("Mirror '{}' has been removed.", outcome.mirror);
            println!("Run 'depot db cleanup' to reclaim its packages.");
            Ok(())
        }
        Err(Error::DependentsExist { mirror, snapshots }) => {
            eprintln!("Mirror '{}' was used to create the following snapshots:", mirror);
            for line in dependents_report(&conn, &snapshots)? {
                eprintln!("  {}", line);
            }
            anyhow::bail!("won't delete mirror with snapshots, use --force to override")
        }
        Err(e) => Err(e.into()),
    }
}

/// One `[name]: description` line per dependent snapshot
fn dependents_report(conn: &Connection, names: &[String]) -> Result<Vec<String>> {
    let mut lines = Vec::with_capacity(names.len());
    for name in names {
        match Snapshot::find_by_name(conn, name)? {
            Some(snapshot) => lines.push(snapshot.to_string()),
            None => lines.push(format!("[{}]", name)),
        }
    }
    Ok(lines)
}

/// List mirrors
pub fn cmd_mirror_list(db_path: &str) -> Result<()> {
    let conn = depot::db::open(db_path)?;
    let mirrors = RemoteMirror::list_all(&conn)?;

    if mirrors.is_empty() {
        println!("No mirrors configured.");
        return Ok(());
    }

    println!("Mirrors:");
    for mirror in mirrors {
        let synced = mirror.last_sync.as_deref().unwrap_or("never synced");
        println!(
            "  {} [{} {} {}] ({})",
            mirror.name,
            mirror.url,
            mirror.distribution,
            mirror.components.join(" "),
            synced
        );
    }
    Ok(())
}
