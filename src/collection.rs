// src/collection.rs

//! SQLite-backed collections
//!
//! These adapt the row models in `db::models` to the interfaces the cleanup
//! core consumes. Every collection borrows the same connection, so the
//! metadata batch opened through `PackageCollection` covers all of them.

use crate::db::models::{EntityKind, LocalRepo, PackageRecord, RemoteMirror, Snapshot};
use crate::error::{Error, Result};
use crate::gc::traits::{EntityCollection, MirrorRegistry, PackageStore, SnapshotIndex};
use crate::reflist::{PackageRefList, display_key};
use rusqlite::Connection;
use tracing::debug;

/// Hands out collections over one connection
#[derive(Clone, Copy)]
pub struct CollectionFactory<'c> {
    conn: &'c Connection,
}

impl<'c> CollectionFactory<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn mirrors(&self) -> MirrorCollection<'c> {
        MirrorCollection { conn: self.conn }
    }

    pub fn local_repos(&self) -> LocalRepoCollection<'c> {
        LocalRepoCollection { conn: self.conn }
    }

    pub fn snapshots(&self) -> SnapshotCollection<'c> {
        SnapshotCollection { conn: self.conn }
    }

    pub fn packages(&self) -> PackageCollection<'c> {
        PackageCollection { conn: self.conn }
    }
}

pub struct MirrorCollection<'c> {
    conn: &'c Connection,
}

impl EntityCollection<RemoteMirror> for MirrorCollection<'_> {
    fn for_each(&self, visit: &mut dyn FnMut(&mut RemoteMirror) -> Result<()>) -> Result<()> {
        for mut mirror in RemoteMirror::list_all(self.conn)? {
            visit(&mut mirror)?;
        }
        Ok(())
    }

    fn load_complete(&self, mirror: &mut RemoteMirror) -> Result<()> {
        mirror.load_ref_list(self.conn)
    }
}

impl MirrorRegistry for MirrorCollection<'_> {
    fn by_name(&self, name: &str) -> Result<RemoteMirror> {
        RemoteMirror::find_by_name(self.conn, name)?
            .ok_or_else(|| Error::NotFoundError(format!("Mirror '{name}' not found")))
    }

    fn drop_mirror(&self, mirror: &RemoteMirror) -> Result<()> {
        let id = mirror
            .id
            .ok_or_else(|| Error::InitError(format!("Mirror '{}' has no ID", mirror.name)))?;
        RemoteMirror::delete(self.conn, id)
    }
}

pub struct LocalRepoCollection<'c> {
    conn: &'c Connection,
}

impl EntityCollection<LocalRepo> for LocalRepoCollection<'_> {
    fn for_each(&self, visit: &mut dyn FnMut(&mut LocalRepo) -> Result<()>) -> Result<()> {
        for mut repo in LocalRepo::list_all(self.conn)? {
            visit(&mut repo)?;
        }
        Ok(())
    }

    fn load_complete(&self, repo: &mut LocalRepo) -> Result<()> {
        repo.load_ref_list(self.conn)
    }
}

pub struct SnapshotCollection<'c> {
    conn: &'c Connection,
}

impl EntityCollection<Snapshot> for SnapshotCollection<'_> {
    fn for_each(&self, visit: &mut dyn FnMut(&mut Snapshot) -> Result<()>) -> Result<()> {
        for mut snapshot in Snapshot::list_all(self.conn)? {
            visit(&mut snapshot)?;
        }
        Ok(())
    }

    fn load_complete(&self, snapshot: &mut Snapshot) -> Result<()> {
        snapshot.load_ref_list(self.conn)
    }
}

impl SnapshotIndex for SnapshotCollection<'_> {
    fn by_remote_repo_source(&self, mirror: &RemoteMirror) -> Result<Vec<Snapshot>> {
        match mirror.id {
            Some(id) => Snapshot::find_by_source(self.conn, EntityKind::Mirror, id),
            None => Ok(Vec::new()),
        }
    }
}

/// The package table, with batches mapped onto an immediate transaction
pub struct PackageCollection<'c> {
    conn: &'c Connection,
}

impl PackageStore for PackageCollection<'_> {
    fn all_package_refs(&self) -> Result<PackageRefList> {
        PackageRecord::all_keys(self.conn)
    }

    fn by_key(&self, key: &[u8]) -> Result<PackageRecord> {
        PackageRecord::get_by_key(self.conn, key)
    }

    fn delete_by_key(&self, key: &[u8]) -> Result<()> {
        if PackageRecord::delete(self.conn, key)? == 0 {
            debug!("Package {} was already gone", display_key(key));
        }
        Ok(())
    }

    fn start_batch(&self) -> Result<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn finish_batch(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn abort_batch(&self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    fn compact(&self) -> Result<()> {
        debug!("Compacting database");
        self.conn.execute_batch("VACUUM")?;
        Ok(())
    }
}
