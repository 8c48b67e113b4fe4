// src/db/models/local_repo.rs

//! LocalRepo model - repositories populated by uploads rather than mirroring

use super::ref_list::{self, EntityKind};
use crate::error::{Error, Result};
use crate::reflist::PackageRefList;
use rusqlite::{Connection, OptionalExtension, Row, params};

/// A local package repository
#[derive(Debug, Clone)]
pub struct LocalRepo {
    pub id: Option<i64>,
    pub name: String,
    pub comment: Option<String>,
    /// Whether a reference list was ever stored for this repo
    pub has_packages: bool,
    pub created_at: Option<String>,
    pub ref_list: Option<PackageRefList>,
}

impl LocalRepo {
    pub fn new(name: String) -> Self {
        Self {
            id: None,
            name,
            comment: None,
            has_packages: false,
            created_at: None,
            ref_list: None,
        }
    }

    /// Insert this repo into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO local_repos (name, comment) VALUES (?1, ?2)",
            params![&self.name, &self.comment],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Find a repo by name
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, comment, has_packages, created_at FROM local_repos WHERE name = ?1",
        )?;

        let repo = stmt.query_row([name], Self::from_row).optional()?;
        Ok(repo)
    }

    /// List all repos ordered by name
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, comment, has_packages, created_at FROM local_repos ORDER BY name",
        )?;

        let repos = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(repos)
    }

    /// Load the stored reference list (absent if packages were never added)
    pub fn load_ref_list(&mut self, conn: &Connection) -> Result<()> {
        let id = self.require_id()?;
        self.ref_list = if self.has_packages {
            Some(ref_list::load_ref_list(conn, EntityKind::LocalRepo, id)?)
        } else {
            None
        };
        Ok(())
    }

    /// Replace the repo's package set
    pub fn set_ref_list(&mut self, conn: &Connection, list: PackageRefList) -> Result<()> {
        let id = self.require_id()?;
        ref_list::save_ref_list(conn, EntityKind::LocalRepo, id, &list)?;
        conn.execute("UPDATE local_repos SET has_packages = 1 WHERE id = ?1", [id])?;
        self.has_packages = true;
        self.ref_list = Some(list);
        Ok(())
    }

    fn require_id(&self) -> Result<i64> {
        self.id.ok_or_else(|| {
            Error::InitError(format!("Local repo '{}' has no ID", self.name))
        })
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            comment: row.get(2)?,
            has_packages: row.get::<_, i32>(3)? != 0,
            created_at: row.get(4)?,
            ref_list: None,
        })
    }
}
