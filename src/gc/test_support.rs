// src/gc/test_support.rs

//! In-memory collaborators for exercising the cleanup core
//!
//! Each fake can be told to fail at one specific point so tests can check
//! that errors abort the right phase and leave the right state behind.

use super::traits::{
    EntityCollection, MirrorRegistry, PackageStore, PoolStorage, RetainingEntity, SnapshotIndex,
};
use crate::db::models::{EntityKind, LocalRepo, PackageFile, PackageRecord, RemoteMirror, Snapshot};
use crate::error::{Error, Result};
use crate::filesystem::derive_path;
use crate::progress::ProgressTracker;
use crate::reflist::{PackageRefList, display_key};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;

pub(crate) fn refs(keys: &[&str]) -> PackageRefList {
    PackageRefList::from_keys(keys.iter().map(|k| k.as_bytes().to_vec()))
}

pub(crate) fn keys(list: &PackageRefList) -> Vec<String> {
    list.iter().map(display_key).collect()
}

pub(crate) fn mirror(name: &str, keys: Option<&[&str]>) -> RemoteMirror {
    let mut mirror = RemoteMirror::new(
        name.to_string(),
        "http://deb.example.org/debian".to_string(),
        "wheezy".to_string(),
    );
    mirror.ref_list = keys.map(refs);
    mirror
}

pub(crate) fn local_repo(name: &str, keys: Option<&[&str]>) -> LocalRepo {
    let mut repo = LocalRepo::new(name.to_string());
    repo.has_packages = keys.is_some();
    repo.ref_list = keys.map(refs);
    repo
}

pub(crate) fn snapshot(name: &str, keys: &[&str]) -> Snapshot {
    Snapshot {
        id: None,
        name: name.to_string(),
        description: None,
        source_kind: EntityKind::Snapshot,
        source_ids: Vec::new(),
        created_at: None,
        ref_list: refs(keys),
    }
}

/// Snapshot taken from the mirror with the given id
pub(crate) fn snapshot_of(name: &str, mirror_id: i64) -> Snapshot {
    let mut snap = snapshot(name, &[]);
    snap.source_kind = EntityKind::Mirror;
    snap.source_ids = vec![mirror_id];
    snap
}

/// Package with a fixed key and `(filename, checksum)` files of 10 bytes each
pub(crate) fn package(key: &str, files: &[(&str, &str)]) -> PackageRecord {
    let mut record = PackageRecord::new(key.to_string(), "1.0".to_string(), "amd64".to_string());
    for (filename, checksum) in files {
        record = record.with_file(PackageFile::new(
            filename.to_string(),
            checksum.to_string(),
            10,
        ));
    }
    record.key = key.as_bytes().to_vec();
    record
}

fn injected(what: &str) -> Error {
    Error::Io(io::Error::other(format!("injected failure: {what}")))
}

/// Entity collection backed by a vector of fully loaded entities
pub(crate) struct FakeCollection<E> {
    entities: Vec<E>,
    fail_on: Option<String>,
    loaded: RefCell<Vec<String>>,
}

impl<E> FakeCollection<E> {
    pub(crate) fn new(entities: Vec<E>) -> Self {
        Self {
            entities,
            fail_on: None,
            loaded: RefCell::new(Vec::new()),
        }
    }

    /// Make `load_complete` fail for the named entity
    pub(crate) fn failing_on(mut self, name: &str) -> Self {
        self.fail_on = Some(name.to_string());
        self
    }

    /// Names successfully loaded so far, in visit order
    pub(crate) fn loaded(&self) -> Vec<String> {
        self.loaded.borrow().clone()
    }
}

impl<E: RetainingEntity + Clone> EntityCollection<E> for FakeCollection<E> {
    fn for_each(&self, visit: &mut dyn FnMut(&mut E) -> Result<()>) -> Result<()> {
        for entity in &self.entities {
            let mut entity = entity.clone();
            visit(&mut entity)?;
        }
        Ok(())
    }

    fn load_complete(&self, entity: &mut E) -> Result<()> {
        if self.fail_on.as_deref() == Some(entity.name()) {
            return Err(Error::ParseError(format!(
                "corrupt reference list for {}",
                entity.name()
            )));
        }
        self.loaded.borrow_mut().push(entity.name().to_string());
        Ok(())
    }
}

/// Package store with batch semantics: an aborted or failed commit restores the pre-batch state
#[derive(Default)]
pub(crate) struct FakeStore {
    packages: RefCell<BTreeMap<Vec<u8>, PackageRecord>>,
    backup: RefCell<Option<BTreeMap<Vec<u8>, PackageRecord>>>,
    events: RefCell<Vec<String>>,
    fail_delete: Option<Vec<u8>>,
    fail_resolve: Option<Vec<u8>>,
    fail_commit: bool,
}

impl FakeStore {
    pub(crate) fn new(packages: Vec<PackageRecord>) -> Self {
        let store = Self::default();
        store.packages.replace(
            packages
                .into_iter()
                .map(|record| (record.key.clone(), record))
                .collect(),
        );
        store
    }

    pub(crate) fn failing_delete(mut self, key: &str) -> Self {
        self.fail_delete = Some(key.as_bytes().to_vec());
        self
    }

    pub(crate) fn failing_resolve(mut self, key: &str) -> Self {
        self.fail_resolve = Some(key.as_bytes().to_vec());
        self
    }

    pub(crate) fn failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    /// Keys currently stored
    pub(crate) fn keys(&self) -> Vec<String> {
        self.packages.borrow().keys().map(|k| display_key(k)).collect()
    }

    /// Calls made against the store, e.g. `start`, `delete b`, `finish`
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    fn record(&self, event: String) {
        self.events.borrow_mut().push(event);
    }

    fn restore(&self) {
        if let Some(saved) = self.backup.borrow_mut().take() {
            self.packages.replace(saved);
        }
    }
}

impl PackageStore for FakeStore {
    fn all_package_refs(&self) -> Result<PackageRefList> {
        Ok(PackageRefList::from_keys(
            self.packages.borrow().keys().cloned(),
        ))
    }

    fn by_key(&self, key: &[u8]) -> Result<PackageRecord> {
        if self.fail_resolve.as_deref() == Some(key) {
            return Err(injected("resolve"));
        }
        self.packages
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFoundError(format!("Package {} not found", display_key(key))))
    }

    fn delete_by_key(&self, key: &[u8]) -> Result<()> {
        self.record(format!("delete {}", display_key(key)));
        if self.fail_delete.as_deref() == Some(key) {
            return Err(injected("delete"));
        }
        self.packages.borrow_mut().remove(key);
        Ok(())
    }

    fn start_batch(&self) -> Result<()> {
        self.record("start".to_string());
        self.backup.replace(Some(self.packages.borrow().clone()));
        Ok(())
    }

    fn finish_batch(&self) -> Result<()> {
        self.record("finish".to_string());
        if self.fail_commit {
            self.restore();
            return Err(injected("commit"));
        }
        self.backup.replace(None);
        Ok(())
    }

    fn abort_batch(&self) -> Result<()> {
        self.record("abort".to_string());
        self.restore();
        Ok(())
    }

    fn compact(&self) -> Result<()> {
        self.record("compact".to_string());
        Ok(())
    }
}

/// Pool of `(path, size)` entries
#[derive(Default)]
pub(crate) struct FakePool {
    files: RefCell<BTreeMap<String, u64>>,
    fail_remove: Option<String>,
    fail_list: bool,
}

impl FakePool {
    pub(crate) fn new(files: &[(&str, u64)]) -> Self {
        let pool = Self::default();
        pool.files.replace(
            files
                .iter()
                .map(|(path, size)| (path.to_string(), *size))
                .collect(),
        );
        pool
    }

    pub(crate) fn failing_remove(mut self, path: &str) -> Self {
        self.fail_remove = Some(path.to_string());
        self
    }

    pub(crate) fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl PoolStorage for FakePool {
    fn relative_path(&self, filename: &str, checksum: &str) -> Result<String> {
        derive_path(filename, checksum)
    }

    fn filepath_list(&self, progress: &dyn ProgressTracker) -> Result<Vec<String>> {
        if self.fail_list {
            return Err(injected("list"));
        }
        let paths = self.paths();
        progress.increment(paths.len() as u64);
        Ok(paths)
    }

    fn remove(&self, path: &str) -> Result<u64> {
        if self.fail_remove.as_deref() == Some(path) {
            return Err(injected("remove"));
        }
        self.files.borrow_mut().remove(path).ok_or_else(|| {
            Error::Io(io::Error::new(io::ErrorKind::NotFound, path.to_string()))
        })
    }

    fn size_of(&self, path: &str) -> Result<u64> {
        self.files.borrow().get(path).copied().ok_or_else(|| {
            Error::Io(io::Error::new(io::ErrorKind::NotFound, path.to_string()))
        })
    }
}

/// Mirror registry and snapshot index over plain vectors
pub(crate) struct FakeRegistry {
    mirrors: RefCell<Vec<RemoteMirror>>,
    snapshots: Vec<Snapshot>,
    fail_drop: bool,
}

impl FakeRegistry {
    pub(crate) fn new(mirrors: Vec<RemoteMirror>, snapshots: Vec<Snapshot>) -> Self {
        Self {
            mirrors: RefCell::new(mirrors),
            snapshots,
            fail_drop: false,
        }
    }

    pub(crate) fn failing_drop(mut self) -> Self {
        self.fail_drop = true;
        self
    }

    pub(crate) fn mirror_names(&self) -> Vec<String> {
        self.mirrors.borrow().iter().map(|m| m.name.clone()).collect()
    }

    /// The mirrors still registered, as a collection the mark phase can walk
    pub(crate) fn remaining(&self) -> FakeCollection<RemoteMirror> {
        FakeCollection::new(self.mirrors.borrow().clone())
    }
}

impl MirrorRegistry for FakeRegistry {
    fn by_name(&self, name: &str) -> Result<RemoteMirror> {
        self.mirrors
            .borrow()
            .iter()
            .find(|m| m.name == name)
            .cloned()
            .ok_or_else(|| Error::NotFoundError(format!("Mirror '{name}' not found")))
    }

    fn drop_mirror(&self, mirror: &RemoteMirror) -> Result<()> {
        if self.fail_drop {
            return Err(injected(&format!("drop {}", mirror.name)));
        }
        self.mirrors.borrow_mut().retain(|m| m.name != mirror.name);
        Ok(())
    }
}

impl SnapshotIndex for FakeRegistry {
    fn by_remote_repo_source(&self, mirror: &RemoteMirror) -> Result<Vec<Snapshot>> {
        let Some(id) = mirror.id else {
            return Ok(Vec::new());
        };
        Ok(self
            .snapshots
            .iter()
            .filter(|s| s.source_kind == EntityKind::Mirror && s.source_ids.contains(&id))
            .cloned()
            .collect())
    }
}
