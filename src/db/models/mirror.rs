// src/db/models/mirror.rs

//! RemoteMirror model - local copies of upstream package repositories

use super::ref_list::{self, EntityKind};
use crate::db;
use crate::error::{Error, Result};
use crate::reflist::PackageRefList;
use rusqlite::{Connection, OptionalExtension, Row, params};

/// A mirror of a remote repository
///
/// `ref_list` is not part of the row; it stays `None` until loaded, and a
/// mirror that was never synced has no list to load.
#[derive(Debug, Clone)]
pub struct RemoteMirror {
    pub id: Option<i64>,
    pub name: String,
    pub url: String,
    pub distribution: String,
    pub components: Vec<String>,
    pub last_sync: Option<String>,
    pub created_at: Option<String>,
    pub ref_list: Option<PackageRefList>,
}

impl RemoteMirror {
    /// Create a new mirror of the `main` component
    pub fn new(name: String, url: String, distribution: String) -> Self {
        Self {
            id: None,
            name,
            url,
            distribution,
            components: vec!["main".to_string()],
            last_sync: None,
            created_at: None,
            ref_list: None,
        }
    }

    /// Insert this mirror into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO mirrors (name, url, distribution, components) VALUES (?1, ?2, ?3, ?4)",
            params![
                &self.name,
                &self.url,
                &self.distribution,
                self.components.join(" "),
            ],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Find a mirror by name
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, url, distribution, components, last_sync, created_at
             FROM mirrors WHERE name = ?1",
        )?;

        let mirror = stmt.query_row([name], Self::from_row).optional()?;
        Ok(mirror)
    }

    /// List all mirrors ordered by name
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, url, distribution, components, last_sync, created_at
             FROM mirrors ORDER BY name",
        )?;

        let mirrors = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(mirrors)
    }

    /// Load the stored reference list (absent if the mirror was never synced)
    pub fn load_ref_list(&mut self, conn: &Connection) -> Result<()> {
        let id = self.require_id()?;
        self.ref_list = match self.last_sync {
            Some(_) => Some(ref_list::load_ref_list(conn, EntityKind::Mirror, id)?),
            None => None,
        };
        Ok(())
    }

    /// Record the outcome of a sync: the mirror now keeps `list` alive
    pub fn set_ref_list(&mut self, conn: &Connection, list: PackageRefList) -> Result<()> {
        let id = self.require_id()?;
        self.last_sync = db::transaction(conn, |tx| {
            ref_list::save_ref_list(tx, EntityKind::Mirror, id, &list)?;
            tx.execute(
                "UPDATE mirrors SET last_sync = CURRENT_TIMESTAMP WHERE id = ?1",
                [id],
            )?;
            let last_sync = tx.query_row(
                "SELECT last_sync FROM mirrors WHERE id = ?1",
                [id],
                |row| row.get(0),
            )?;
            Ok(last_sync)
        })?;
        self.ref_list = Some(list);
        Ok(())
    }

    /// Delete a mirror and its reference list; packages are left alone
    ///
    /// Both go in one transaction. A mirror row left behind with an emptied
    /// list would still count as synced and stop protecting its packages.
    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        db::transaction(conn, |tx| {
            tx.execute("DELETE FROM mirrors WHERE id = ?1", [id])?;
            ref_list::delete_ref_list(tx, EntityKind::Mirror, id)?;
            Ok(())
        })
    }

    fn require_id(&self) -> Result<i64> {
        self.id.ok_or_else(|| {
            Error::InitError(format!("Mirror '{}' has no ID", self.name))
        })
    }

    /// Convert a database row to a RemoteMirror
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let components: String = row.get(4)?;

        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            url: row.get(2)?,
            distribution: row.get(3)?,
            components: components.split_whitespace().map(str::to_string).collect(),
            last_sync: row.get(5)?,
            created_at: row.get(6)?,
            ref_list: None,
        })
    }
}
