// src/gc/mod.rs

//! Garbage collection for the package store and pool
//!
//! A cleanup run is mark-and-sweep:
//! 1. Mark: union the reference lists of every mirror, local repo and snapshot
//! 2. Sweep metadata: delete every package record outside that set, in one batch
//! 3. Sweep the pool: delete every file no live package points at
//!
//! Marking finishes over all three collections before anything is deleted,
//! and a failure in any phase stops the run. Callers must make sure nothing
//! else writes to the repository while a run is in progress.
//!
//! Dropping a mirror is a separate, narrower operation guarded by
//! `DependencyGuard`; the packages it kept alive are reclaimed by the next
//! cleanup run.

mod guard;
mod live;
mod metadata;
mod pool;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use guard::{DependencyGuard, DropOutcome};
pub use live::LiveSetCollector;
pub use metadata::MetadataSweeper;
pub use pool::{PoolReconciler, PoolSweep};

use self::traits::{PackageStore, PoolStorage};
use crate::collection::CollectionFactory;
use crate::error::Result;
use crate::filesystem::PackagePool;
use crate::progress::{ProgressTracker, SilentProgress};
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

/// Options for a cleanup run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcOptions {
    /// Report what would be deleted without deleting anything
    pub dry_run: bool,
    /// Compact the metadata store after a successful sweep
    pub compact: bool,
}

impl Default for GcOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            compact: true,
        }
    }
}

/// Outcome of a cleanup run
///
/// On a dry run the counts describe what would have been deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GcReport {
    pub packages_deleted: usize,
    pub files_deleted: usize,
    pub bytes_freed: u64,
    pub dry_run: bool,
}

/// Runs the mark, metadata sweep and pool sweep phases in order
pub struct GarbageCollector<'a> {
    collector: LiveSetCollector<'a>,
    store: &'a dyn PackageStore,
    pool: &'a dyn PoolStorage,
    progress: Option<&'a dyn ProgressTracker>,
    options: GcOptions,
}

impl<'a> GarbageCollector<'a> {
    pub fn new(
        collector: LiveSetCollector<'a>,
        store: &'a dyn PackageStore,
        pool: &'a dyn PoolStorage,
    ) -> Self {
        Self {
            collector,
            store,
            pool,
            progress: None,
            options: GcOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GcOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressTracker) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run a full cleanup
    pub fn run(&self) -> Result<GcReport> {
        let silent = SilentProgress::new();
        let progress: &dyn ProgressTracker = match self.progress {
            Some(progress) => progress,
            None => &silent,
        };

        let result = self.run_phases(progress);
        match &result {
            Ok(report) if report.dry_run => progress.finish_with_message("Dry run complete"),
            Ok(_) => progress.finish_with_message("Cleanup complete"),
            Err(e) => progress.finish_with_error(&e.to_string()),
        }
        result
    }

    fn run_phases(&self, progress: &dyn ProgressTracker) -> Result<GcReport> {
        let dry_run = self.options.dry_run;

        info!("Loading mirrors, local repos and snapshots");
        progress.set_message("Loading mirrors, local repos and snapshots");
        let live = self.collector.collect_live()?;

        let sweeper = MetadataSweeper::new(self.store);
        let packages_deleted = if dry_run {
            sweeper.plan(&live)?.len()
        } else {
            progress.set_message("Deleting unreferenced packages");
            sweeper.sweep(&live)?
        };

        // File paths come from the live set computed above, not from
        // whatever is left in the store after the metadata sweep
        let reconciler = PoolReconciler::new(self.store, self.pool, progress);
        let sweep = if dry_run {
            let orphans = reconciler.plan(&live)?;
            let mut bytes_freed = 0;
            for path in &orphans {
                bytes_freed += self.pool.size_of(path)?;
            }
            PoolSweep {
                files_deleted: orphans.len(),
                bytes_freed,
            }
        } else {
            reconciler.reconcile(&live)?
        };

        if self.options.compact && !dry_run {
            info!("Compacting database");
            progress.set_message("Compacting database");
            self.store.compact()?;
        }

        let report = GcReport {
            packages_deleted,
            files_deleted: sweep.files_deleted,
            bytes_freed: sweep.bytes_freed,
            dry_run,
        };
        info!(
            "Cleanup {}: {} packages, {} files, {} bytes",
            if dry_run { "would remove" } else { "removed" },
            report.packages_deleted,
            report.files_deleted,
            report.bytes_freed
        );
        Ok(report)
    }
}

/// Clean up the repository behind `conn` and `pool`
pub fn cleanup(
    conn: &Connection,
    pool: &PackagePool,
    options: GcOptions,
    progress: &dyn ProgressTracker,
) -> Result<GcReport> {
    let factory = CollectionFactory::new(conn);
    let mirrors = factory.mirrors();
    let local_repos = factory.local_repos();
    let snapshots = factory.snapshots();
    let packages = factory.packages();

    GarbageCollector::new(
        LiveSetCollector::new(&mirrors, &local_repos, &snapshots),
        &packages,
        pool,
    )
    .with_options(options)
    .with_progress(progress)
    .run()
}

/// Drop the named mirror unless snapshots depend on it (or `force` is set)
pub fn drop_mirror(conn: &Connection, name: &str, force: bool) -> Result<DropOutcome> {
    let factory = CollectionFactory::new(conn);
    let mirrors = factory.mirrors();
    let snapshots = factory.snapshots();

    DependencyGuard::new(&mirrors, &snapshots).safe_drop_mirror(name, force)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::gc::test_support::{
        FakeCollection, FakePool, FakeStore, local_repo, mirror, package, snapshot,
    };
    use crate::progress::{CallbackProgress, ProgressEvent};
    use std::sync::{Arc, Mutex};

    fn store() -> FakeStore {
        FakeStore::new(vec![
            package("a", &[("a.deb", "aaaa01")]),
            package("b", &[("b.deb", "bbbb01")]),
            package("c", &[("c.deb", "cccc01")]),
        ])
    }

    fn pool() -> FakePool {
        FakePool::new(&[
            ("aa/aa/a.deb", 100),
            ("bb/bb/b.deb", 200),
            ("cc/cc/c.deb", 300),
            ("ff/ff/orphan.deb", 5),
        ])
    }

    #[test]
    fn test_run_sweeps_and_compacts() {
        let mirrors = FakeCollection::new(vec![mirror("m1", Some(&["a"]))]);
        let repos = FakeCollection::new(vec![local_repo("r1", None)]);
        let snapshots = FakeCollection::new(vec![snapshot("s1", &["b"])]);
        let store = store();
        let pool = pool();

        let report = GarbageCollector::new(
            LiveSetCollector::new(&mirrors, &repos, &snapshots),
            &store,
            &pool,
        )
        .run()
        .unwrap();

        assert_eq!(
            report,
            GcReport {
                packages_deleted: 1,
                files_deleted: 2,
                bytes_freed: 305,
                dry_run: false,
            }
        );
        assert_eq!(store.keys(), vec!["a", "b"]);
        assert_eq!(pool.paths(), vec!["aa/aa/a.deb", "bb/bb/b.deb"]);
        assert_eq!(store.events().last().map(String::as_str), Some("compact"));
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let mirrors = FakeCollection::new(vec![mirror("m1", Some(&["a"]))]);
        let repos = FakeCollection::<crate::db::models::LocalRepo>::new(Vec::new());
        let snapshots = FakeCollection::<crate::db::models::Snapshot>::new(Vec::new());
        let store = store();
        let pool = pool();

        let report = GarbageCollector::new(
            LiveSetCollector::new(&mirrors, &repos, &snapshots),
            &store,
            &pool,
        )
        .with_options(GcOptions {
            dry_run: true,
            compact: true,
        })
        .run()
        .unwrap();

        assert_eq!(report.packages_deleted, 2);
        assert_eq!(report.files_deleted, 3);
        assert_eq!(report.bytes_freed, 505);
        assert!(report.dry_run);
        assert_eq!(store.keys(), vec!["a", "b", "c"]);
        assert_eq!(pool.paths().len(), 4);
        assert!(store.events().is_empty());
    }

    #[test]
    fn test_no_compact() {
        let mirrors = FakeCollection::new(vec![mirror("m1", Some(&["a", "b", "c"]))]);
        let repos = FakeCollection::<crate::db::models::LocalRepo>::new(Vec::new());
        let snapshots = FakeCollection::<crate::db::models::Snapshot>::new(Vec::new());
        let store = store();
        let pool = pool();

        GarbageCollector::new(
            LiveSetCollector::new(&mirrors, &repos, &snapshots),
            &store,
            &pool,
        )
        .with_options(GcOptions {
            dry_run: false,
            compact: false,
        })
        .run()
        .unwrap();

        assert!(!store.events().contains(&"compact".to_string()));
    }

    #[test]
    fn test_load_failure_deletes_nothing() {
        let mirrors = FakeCollection::new(vec![mirror("m1", Some(&["a"]))]);
        let repos = FakeCollection::<crate::db::models::LocalRepo>::new(Vec::new());
        let snapshots = FakeCollection::new(vec![snapshot("s1", &["b"])]).failing_on("s1");
        let store = store();
        let pool = pool();

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let progress = CallbackProgress::new(move |event| sink.lock().unwrap().push(event));

        let err = GarbageCollector::new(
            LiveSetCollector::new(&mirrors, &repos, &snapshots),
            &store,
            &pool,
        )
        .with_progress(&progress)
        .run()
        .unwrap_err();

        assert!(matches!(err, Error::LoadFailure { .. }));
        assert_eq!(store.keys(), vec!["a", "b", "c"]);
        assert_eq!(pool.paths().len(), 4);
        assert!(store.events().is_empty());
        assert!(matches!(
            events.lock().unwrap().last(),
            Some(ProgressEvent::Error(_))
        ));
    }

    #[test]
    fn test_commit_failure_skips_pool_sweep() {
        let mirrors = FakeCollection::new(vec![mirror("m1", Some(&["a"]))]);
        let repos = FakeCollection::<crate::db::models::LocalRepo>::new(Vec::new());
        let snapshots = FakeCollection::<crate::db::models::Snapshot>::new(Vec::new());
        let store = store().failing_commit();
        let pool = pool();

        let err = GarbageCollector::new(
            LiveSetCollector::new(&mirrors, &repos, &snapshots),
            &store,
            &pool,
        )
        .run()
        .unwrap_err();

        assert!(matches!(err, Error::CommitFailure(_)));
        assert_eq!(pool.paths().len(), 4);
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let mirrors = FakeCollection::new(vec![mirror("m1", Some(&["c"]))]);
        let repos = FakeCollection::<crate::db::models::LocalRepo>::new(Vec::new());
        let snapshots = FakeCollection::<crate::db::models::Snapshot>::new(Vec::new());
        let store = store();
        let pool = pool();

        let gc = GarbageCollector::new(
            LiveSetCollector::new(&mirrors, &repos, &snapshots),
            &store,
            &pool,
        );
        let first = gc.run().unwrap();
        assert_eq!(first.packages_deleted, 2);

        let second = gc.run().unwrap();
        assert_eq!(second, GcReport::default());
    }
}
