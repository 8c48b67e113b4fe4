// src/db/models/snapshot.rs

//! Snapshot model - immutable package sets taken from mirrors and local repos

use super::local_repo::LocalRepo;
use super::mirror::RemoteMirror;
use super::ref_list::{self, EntityKind};
use crate::error::{Error, Result};
use crate::reflist::PackageRefList;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fmt;

/// A named, frozen set of package references
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    /// What kind of entity the sources are
    pub source_kind: EntityKind,
    /// IDs of the entities this snapshot was taken from
    pub source_ids: Vec<i64>,
    pub created_at: Option<String>,
    pub ref_list: PackageRefList,
}

impl Snapshot {
    /// Snapshot the current package set of a synced mirror
    pub fn from_mirror(name: String, mirror: &RemoteMirror) -> Result<Self> {
        let id = mirror
            .id
            .ok_or_else(|| Error::InitError(format!("Mirror '{}' has no ID", mirror.name)))?;
        let refs = mirror.ref_list.clone().ok_or_else(|| {
            Error::InitError(format!(
                "Mirror '{}' has not been synced; nothing to snapshot",
                mirror.name
            ))
        })?;

        Ok(Self {
            id: None,
            name,
            description: Some(format!("Snapshot from mirror '{}'", mirror.name)),
            source_kind: EntityKind::Mirror,
            source_ids: vec![id],
            created_at: None,
            ref_list: refs,
        })
    }

    /// Snapshot the current package set of a local repo
    pub fn from_local_repo(name: String, repo: &LocalRepo) -> Result<Self> {
        let id = repo
            .id
            .ok_or_else(|| Error::InitError(format!("Local repo '{}' has no ID", repo.name)))?;

        Ok(Self {
            id: None,
            name,
            description: Some(format!("Snapshot from local repo '{}'", repo.name)),
            source_kind: EntityKind::LocalRepo,
            source_ids: vec![id],
            created_at: None,
            ref_list: repo.ref_list.clone().unwrap_or_default(),
        })
    }

    /// Insert this snapshot, its sources and its reference list
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO snapshots (name, description, source_kind) VALUES (?1, ?2, ?3)",
            params![&self.name, &self.description, self.source_kind.as_str()],
        )?;
        let id = conn.last_insert_rowid();

        let mut stmt = conn.prepare(
            "INSERT INTO snapshot_sources (snapshot_id, source_id) VALUES (?1, ?2)",
        )?;
        for source_id in &self.source_ids {
            stmt.execute(params![id, source_id])?;
        }

        ref_list::save_ref_list(conn, EntityKind::Snapshot, id, &self.ref_list)?;

        self.id = Some(id);
        Ok(id)
    }

    /// Find a snapshot by name (reference list not loaded)
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, description, source_kind, created_at FROM snapshots WHERE name = ?1",
        )?;

        let snapshot = stmt.query_row([name], Self::from_row).optional()?;
        match snapshot {
            Some(mut snapshot) => {
                snapshot.load_sources(conn)?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// List all snapshots ordered by name (reference lists not loaded)
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, description, source_kind, created_at FROM snapshots ORDER BY name",
        )?;

        let mut snapshots = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for snapshot in &mut snapshots {
            snapshot.load_sources(conn)?;
        }
        Ok(snapshots)
    }

    /// Snapshots taken (directly) from the given entity
    pub fn find_by_source(conn: &Connection, kind: EntityKind, source_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT s.id, s.name, s.description, s.source_kind, s.created_at
             FROM snapshots s
             JOIN snapshot_sources src ON src.snapshot_id = s.id
             WHERE s.source_kind = ?1 AND src.source_id = ?2
             ORDER BY s.name",
        )?;

        let mut snapshots = stmt
            .query_map(params![kind.as_str(), source_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for snapshot in &mut snapshots {
            snapshot.load_sources(conn)?;
        }
        Ok(snapshots)
    }

    /// Load the stored reference list
    pub fn load_ref_list(&mut self, conn: &Connection) -> Result<()> {
        let id = self
            .id
            .ok_or_else(|| Error::InitError(format!("Snapshot '{}' has no ID", self.name)))?;
        self.ref_list = ref_list::load_ref_list(conn, EntityKind::Snapshot, id)?;
        Ok(())
    }

    fn load_sources(&mut self, conn: &Connection) -> Result<()> {
        let Some(id) = self.id else {
            return Ok(());
        };
        let mut stmt = conn.prepare(
            "SELECT source_id FROM snapshot_sources WHERE snapshot_id = ?1 ORDER BY source_id",
        )?;
        self.source_ids = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(())
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let kind: String = row.get(3)?;
        let source_kind = kind.parse::<EntityKind>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;

        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            description: row.get(2)?,
            source_kind,
            source_ids: Vec::new(),
            created_at: row.get(4)?,
            ref_list: PackageRefList::new(),
        })
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "[{}]: {}", self.name, description),
            None => write!(f, "[{}]", self.name),
        }
    }
}
