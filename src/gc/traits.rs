// src/gc/traits.rs

//! Collaborator interfaces used by the cleanup core
//!
//! The mark-and-sweep code only talks to these traits. The SQLite-backed
//! implementations live in `crate::collection`, the filesystem pool in
//! `crate::filesystem`.

use crate::db::models::{LocalRepo, PackageRecord, RemoteMirror, Snapshot};
use crate::error::Result;
use crate::progress::ProgressTracker;
use crate::reflist::PackageRefList;

/// An entity whose existence keeps packages alive
pub trait RetainingEntity {
    fn name(&self) -> &str;

    /// Packages kept alive by this entity, if it has a reference list at all
    fn ref_list(&self) -> Option<&PackageRefList>;
}

/// A collection of retaining entities of one kind
pub trait EntityCollection<E: RetainingEntity> {
    /// Visit every entity, stopping at the first error from `visit`
    fn for_each(&self, visit: &mut dyn FnMut(&mut E) -> Result<()>) -> Result<()>;

    /// Load everything about an entity, including its reference list
    fn load_complete(&self, entity: &mut E) -> Result<()>;
}

/// The package metadata store
pub trait PackageStore {
    /// Keys of every package the store knows about
    fn all_package_refs(&self) -> Result<PackageRefList>;

    /// Fetch a package record; missing keys are an error
    fn by_key(&self, key: &[u8]) -> Result<PackageRecord>;

    fn delete_by_key(&self, key: &[u8]) -> Result<()>;

    /// Open a write batch; deletes issued until `finish_batch` commit together
    fn start_batch(&self) -> Result<()>;

    /// Commit the open batch
    fn finish_batch(&self) -> Result<()>;

    /// Discard the open batch
    fn abort_batch(&self) -> Result<()>;

    /// Reclaim space after large deletions
    fn compact(&self) -> Result<()>;
}

/// The physical package pool
pub trait PoolStorage {
    /// Derive the pool path of a package file
    fn relative_path(&self, filename: &str, checksum: &str) -> Result<String>;

    /// Every file currently in the pool, sorted
    fn filepath_list(&self, progress: &dyn ProgressTracker) -> Result<Vec<String>>;

    /// Delete a file, returning the number of bytes it occupied
    fn remove(&self, path: &str) -> Result<u64>;

    fn size_of(&self, path: &str) -> Result<u64>;
}

/// Name lookup and removal of mirrors
pub trait MirrorRegistry {
    /// Resolve a mirror by name; unknown names are `Error::NotFoundError`
    fn by_name(&self, name: &str) -> Result<RemoteMirror>;

    /// Remove the mirror's own metadata (not its packages)
    fn drop_mirror(&self, mirror: &RemoteMirror) -> Result<()>;
}

/// Reverse lookup from a mirror to the snapshots taken from it
pub trait SnapshotIndex {
    fn by_remote_repo_source(&self, mirror: &RemoteMirror) -> Result<Vec<Snapshot>>;
}

impl RetainingEntity for RemoteMirror {
    fn name(&self) -> &str {
        &self.name
    }

    fn ref_list(&self) -> Option<&PackageRefList> {
        self.ref_list.as_ref()
    }
}

impl RetainingEntity for LocalRepo {
    fn name(&self) -> &str {
        &self.name
    }

    fn ref_list(&self) -> Option<&PackageRefList> {
        self.ref_list.as_ref()
    }
}

// A loaded snapshot always has a list, even if it is empty
impl RetainingEntity for Snapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn ref_list(&self) -> Option<&PackageRefList> {
        Some(&self.ref_list)
    }
}
