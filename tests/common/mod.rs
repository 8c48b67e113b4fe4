// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use depot::db;
use depot::db::models::{LocalRepo, PackageRecord, RemoteMirror, Snapshot};
use depot::gc::traits::PoolStorage;
use depot::{PackagePool, PackageRefList, ProgressTracker};
use rusqlite::Connection;
use tempfile::TempDir;

/// A throwaway repository: database plus package pool in one temp dir.
///
/// Keep the struct alive for the duration of the test; dropping it removes
/// everything.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub db_path: String,
    pub conn: Connection,
    pub pool: PackagePool,
}

impl TestRepo {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir
            .path()
            .join("depot.db")
            .to_str()
            .unwrap()
            .to_string();

        db::init(&db_path).unwrap();
        let conn = db::open(&db_path).unwrap();
        let pool = PackagePool::new(temp_dir.path().join("pool")).unwrap();

        Self {
            temp_dir,
            db_path,
            conn,
            pool,
        }
    }

    /// Store `<name>_<version>_amd64.deb` with `content` in the pool and record the package.
    pub fn add_package(&self, name: &str, version: &str, content: &[u8]) -> Vec<u8> {
        let filename = format!("{name}_{version}_amd64.deb");
        let file = self.pool.store(&filename, content).unwrap();

        let mut record = PackageRecord::new(name.to_string(), version.to_string(), "amd64".to_string())
            .with_file(file);
        record.insert(&self.conn).unwrap();
        record.key
    }

    /// Put a file in the pool that no package owns. Returns its pool path.
    pub fn add_orphan_file(&self, filename: &str, content: &[u8]) -> String {
        let file = self.pool.store(filename, content).unwrap();
        self.pool
            .relative_path(&file.filename, &file.checksum)
            .unwrap()
    }

    /// Create a mirror and record a sync that pulled in `keys`.
    pub fn add_mirror(&self, name: &str, keys: &[Vec<u8>]) -> RemoteMirror {
        let mut mirror = RemoteMirror::new(
            name.to_string(),
            "http://deb.debian.org/debian".to_string(),
            "wheezy".to_string(),
        );
        mirror.insert(&self.conn).unwrap();
        mirror
            .set_ref_list(&self.conn, PackageRefList::from_keys(keys.to_vec()))
            .unwrap();
        mirror
    }

    /// Create a local repo holding `keys`.
    pub fn add_local_repo(&self, name: &str, keys: &[Vec<u8>]) -> LocalRepo {
        let mut repo = LocalRepo::new(name.to_string());
        repo.insert(&self.conn).unwrap();
        repo.set_ref_list(&self.conn, PackageRefList::from_keys(keys.to_vec()))
            .unwrap();
        repo
    }

    /// Snapshot a synced mirror.
    pub fn snapshot_mirror(&self, name: &str, mirror: &RemoteMirror) -> Snapshot {
        let mut snapshot = Snapshot::from_mirror(name.to_string(), mirror).unwrap();
        snapshot.insert(&self.conn).unwrap();
        snapshot
    }

    pub fn package_keys(&self) -> Vec<Vec<u8>> {
        PackageRecord::all_keys(&self.conn).unwrap().into_keys()
    }

    pub fn pool_paths(&self) -> Vec<String> {
        self.pool
            .filepath_list(&depot::SilentProgress::new())
            .unwrap()
    }

    /// Pool path of every file of every package still in the store.
    pub fn referenced_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for key in self.package_keys() {
            let record = PackageRecord::get_by_key(&self.conn, &key).unwrap();
            paths.extend(record.filepath_list(&self.pool).unwrap());
        }
        paths.sort();
        paths.dedup();
        paths
    }

    pub fn cleanup(&self, options: depot::GcOptions) -> depot::Result<depot::GcReport> {
        depot::gc::cleanup(&self.conn, &self.pool, options, &depot::SilentProgress::new())
    }

    pub fn cleanup_with(
        &self,
        options: depot::GcOptions,
        progress: &dyn ProgressTracker,
    ) -> depot::Result<depot::GcReport> {
        depot::gc::cleanup(&self.conn, &self.pool, options, progress)
    }
}
