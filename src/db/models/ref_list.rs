// src/db/models/ref_list.rs

//! Reference list storage - package keys kept alive by mirrors, local repos and snapshots

use crate::error::{Error, Result};
use crate::reflist::PackageRefList;
use rusqlite::{Connection, params};
use std::fmt;
use std::str::FromStr;

/// The kinds of retaining entity that own a reference list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Mirror,
    LocalRepo,
    Snapshot,
}

impl EntityKind {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Mirror => "mirror",
            EntityKind::LocalRepo => "local",
            EntityKind::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Mirror => "mirror",
            EntityKind::LocalRepo => "local repo",
            EntityKind::Snapshot => "snapshot",
        };
        f.write_str(label)
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mirror" => Ok(EntityKind::Mirror),
            "local" => Ok(EntityKind::LocalRepo),
            "snapshot" => Ok(EntityKind::Snapshot),
            _ => Err(Error::ParseError(format!("Invalid entity kind: {s}"))),
        }
    }
}

/// Load the reference list owned by an entity (empty if it has none stored)
pub fn load_ref_list(conn: &Connection, kind: EntityKind, owner_id: i64) -> Result<PackageRefList> {
    let mut stmt = conn.prepare(
        "SELECT package_key FROM ref_lists WHERE owner_kind = ?1 AND owner_id = ?2",
    )?;

    let keys = stmt
        .query_map(params![kind.as_str(), owner_id], |row| row.get::<_, Vec<u8>>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(PackageRefList::from_keys(keys))
}

/// Replace the reference list owned by an entity
pub fn save_ref_list(
    conn: &Connection,
    kind: EntityKind,
    owner_id: i64,
    list: &PackageRefList,
) -> Result<()> {
    delete_ref_list(conn, kind, owner_id)?;

    let mut stmt = conn.prepare(
        "INSERT INTO ref_lists (owner_kind, owner_id, package_key) VALUES (?1, ?2, ?3)",
    )?;
    for key in list.iter() {
        stmt.execute(params![kind.as_str(), owner_id, key])?;
    }

    Ok(())
}

/// Delete the reference list owned by an entity
pub fn delete_ref_list(conn: &Connection, kind: EntityKind, owner_id: i64) -> Result<()> {
    conn.execute(
        "DELETE FROM ref_lists WHERE owner_kind = ?1 AND owner_id = ?2",
        params![kind.as_str(), owner_id],
    )?;
    Ok(())
}
