// src/gc/pool.rs

//! Pool sweep: delete files no live package points at

use super::traits::{PackageStore, PoolStorage};
use crate::error::{DeleteTarget, Error, Result};
use crate::progress::ProgressTracker;
use crate::reflist::{PackageRefList, sorted_difference};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Totals of a pool sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolSweep {
    pub files_deleted: usize,
    pub bytes_freed: u64,
}

pub struct PoolReconciler<'a> {
    store: &'a dyn PackageStore,
    pool: &'a dyn PoolStorage,
    progress: &'a dyn ProgressTracker,
}

impl<'a> PoolReconciler<'a> {
    pub fn new(
        store: &'a dyn PackageStore,
        pool: &'a dyn PoolStorage,
        progress: &'a dyn ProgressTracker,
    ) -> Self {
        Self {
            store,
            pool,
            progress,
        }
    }

    /// Sorted, deduplicated pool paths of every file owned by a live package
    ///
    /// A live key the store cannot resolve aborts with `ResolveFailure`.
    pub fn referenced_files(&self, live: &PackageRefList) -> Result<Vec<String>> {
        self.progress.set_message("Collecting referenced files");
        self.progress.set_length(live.len() as u64);

        let mut referenced = Vec::new();
        live.for_each(|key| {
            let paths = self
                .store
                .by_key(key)
                .and_then(|record| record.filepath_list(self.pool))
                .map_err(|e| Error::ResolveFailure {
                    key: key.to_vec(),
                    source: Box::new(e),
                })?;
            referenced.extend(paths);
            self.progress.increment(1);
            Ok(())
        })?;

        referenced.sort();
        referenced.dedup();
        Ok(referenced)
    }

    /// Pool files a reconcile against `live` would delete, sorted
    pub fn plan(&self, live: &PackageRefList) -> Result<Vec<String>> {
        let referenced = self.referenced_files(live)?;

        self.progress.set_message("Scanning package pool");
        self.progress.set_length(0);
        let mut existing = self
            .pool
            .filepath_list(self.progress)
            .map_err(|e| Error::PoolListFailure(Box::new(e)))?;
        existing.sort();

        let orphans = sorted_difference(&existing, &referenced);
        debug!(
            "{} files in pool, {} referenced, {} orphaned",
            existing.len(),
            referenced.len(),
            orphans.len()
        );
        Ok(orphans)
    }

    /// Delete every orphaned pool file
    ///
    /// Deletion is file by file. If one fails, files already removed stay removed.
    pub fn reconcile(&self, live: &PackageRefList) -> Result<PoolSweep> {
        let orphans = self.plan(live)?;
        if orphans.is_empty() {
            info!("No unreferenced files in pool");
            return Ok(PoolSweep::default());
        }

        info!("Deleting {} unreferenced files", orphans.len());
        self.progress.set_message("Deleting unreferenced files");
        self.progress.set_length(orphans.len() as u64);

        let mut sweep = PoolSweep::default();
        for path in &orphans {
            let size = self.pool.remove(path).map_err(|e| {
                warn!(
                    "Pool sweep stopped after {} files ({} bytes)",
                    sweep.files_deleted, sweep.bytes_freed
                );
                Error::DeleteFailure {
                    target: DeleteTarget::File(path.clone()),
                    source: Box::new(e),
                }
            })?;
            sweep.files_deleted += 1;
            sweep.bytes_freed += size;
            self.progress.increment(1);
        }

        Ok(sweep)
    }
}
