// src/db/schema.rs

//! Database schema definitions and migrations for depot
//!
//! This module defines the SQLite schema for all core tables and provides
//! a migration system to evolve the schema over time.

use crate::error::{Error, Result};
use rusqlite::Connection;
use tracing::{debug, info};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the schema version tracking table
fn init_schema_version(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    init_schema_version(conn)?;

    let version: Option<i32> = conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version.unwrap_or(0))
}

/// Set the schema version
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Apply all pending migrations to bring the database up to date
pub fn migrate(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;
    info!("Current schema version: {}", current_version);

    if current_version >= SCHEMA_VERSION {
        info!("Schema is up to date");
        return Ok(());
    }

    for version in (current_version + 1)..=SCHEMA_VERSION {
        info!("Applying migration to version {}", version);
        apply_migration(conn, version)?;
        set_schema_version(conn, version)?;
    }

    info!(
        "Schema migration complete. Now at version {}",
        SCHEMA_VERSION
    );
    Ok(())
}

/// Apply a specific migration version
fn apply_migration(conn: &Connection, version: i32) -> Result<()> {
    match version {
        1 => migrate_v1(conn),
        _ => Err(Error::InitError(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Initial schema - Version 1
///
/// - packages / package_files: the package metadata store
/// - mirrors, local_repos, snapshots: retaining entities
/// - snapshot_sources: which entities a snapshot was taken from
/// - ref_lists: package keys each retaining entity keeps alive
fn migrate_v1(conn: &Connection) -> Result<()> {
    debug!("Creating schema version 1");

    conn.execute_batch(
        "
        -- Packages: keyed by an opaque reference key
        CREATE TABLE packages (
            key BLOB PRIMARY KEY,
            name TEXT NOT NULL,
            version TEXT NOT NULL,
            architecture TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX idx_packages_name ON packages(name);

        -- Files that make up a package; each maps to one pool path
        CREATE TABLE package_files (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            package_key BLOB NOT NULL,
            filename TEXT NOT NULL,
            checksum TEXT NOT NULL,
            size INTEGER NOT NULL,
            FOREIGN KEY (package_key) REFERENCES packages(key) ON DELETE CASCADE
        );

        CREATE INDEX idx_package_files_key ON package_files(package_key);

        -- Remote mirrors
        CREATE TABLE mirrors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            url TEXT NOT NULL,
            distribution TEXT NOT NULL,
            components TEXT NOT NULL DEFAULT 'main',
            last_sync TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        -- Local repositories
        CREATE TABLE local_repos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            comment TEXT,
            has_packages INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        -- Snapshots: immutable package sets taken from mirrors, repos or other snapshots
        CREATE TABLE snapshots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            source_kind TEXT NOT NULL CHECK(source_kind IN ('mirror', 'local', 'snapshot')),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE snapshot_sources (
            snapshot_id INTEGER NOT NULL,
            source_id INTEGER NOT NULL,
            PRIMARY KEY (snapshot_id, source_id),
            FOREIGN KEY (snapshot_id) REFERENCES snapshots(id) ON DELETE CASCADE
        );

        CREATE INDEX idx_snapshot_sources_source ON snapshot_sources(source_id);

        -- Reference lists. No foreign key to packages: a list may name a
        -- package the store no longer has, and that must stay visible.
        CREATE TABLE ref_lists (
            owner_kind TEXT NOT NULL CHECK(owner_kind IN ('mirror', 'local', 'snapshot')),
            owner_id INTEGER NOT NULL,
            package_key BLOB NOT NULL,
            PRIMARY KEY (owner_kind, owner_id, package_key)
        );
        ",
    )?;

    debug!("Schema version 1 created successfully");
    Ok(())
}
