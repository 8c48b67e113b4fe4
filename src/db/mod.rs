// src/db/mod.rs

//! Database layer for depot
//!
//! All repository state (packages, mirrors, local repos, snapshots and their
//! reference lists) lives in a single SQLite database. This module opens and
//! initializes it; row-level access lives in `models`.

pub mod models;
pub mod paths;
pub mod schema;

use crate::error::{Error, Result};
use rusqlite::{Connection, Transaction};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Create the database file (and its directory) and apply the schema
pub fn init(db_path: &str) -> Result<()> {
    let path = Path::new(db_path);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
        debug!("Created database directory: {}", parent.display());
    }

    let conn = Connection::open(path)?;
    configure(&conn)?;
    schema::migrate(&conn)?;

    info!("Initialized database at {}", db_path);
    Ok(())
}

/// Open an existing database
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        return Err(Error::InitError(format!(
            "Database not found at {db_path}; run 'depot init' first"
        )));
    }

    let conn = Connection::open(db_path)?;
    configure(&conn)?;
    Ok(conn)
}

/// Run `f` inside a transaction, committing on success and rolling back on error
///
/// Takes a shared connection so row models can group their statements; the
/// caller must not already be inside a transaction on `conn`.
pub fn transaction<F, T>(conn: &Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction) -> Result<T>,
{
    let tx = conn.unchecked_transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}

fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}
