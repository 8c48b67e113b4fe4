// src/gc/metadata.rs

//! Metadata sweep: delete package records nothing references

use super::traits::PackageStore;
use crate::error::{DeleteTarget, Error, Result};
use crate::reflist::{PackageRefList, display_key};
use tracing::{debug, info, warn};

pub struct MetadataSweeper<'a> {
    store: &'a dyn PackageStore,
}

impl<'a> MetadataSweeper<'a> {
    pub fn new(store: &'a dyn PackageStore) -> Self {
        Self { store }
    }

    /// Keys a sweep against `live` would delete
    pub fn plan(&self, live: &PackageRefList) -> Result<PackageRefList> {
        let all = self.store.all_package_refs()?;
        let garbage = all.subtract(live);
        debug!(
            "{} packages in store, {} live, {} unreferenced",
            all.len(),
            live.len(),
            garbage.len()
        );
        Ok(garbage)
    }

    /// Delete every package not in `live` inside one batch
    ///
    /// Either all unreferenced records go or none do. Returns how many were deleted.
    pub fn sweep(&self, live: &PackageRefList) -> Result<usize> {
        let garbage = self.plan(live)?;
        if garbage.is_empty() {
            info!("No unreferenced packages");
            return Ok(0);
        }

        info!("Deleting {} unreferenced packages", garbage.len());
        self.store.start_batch()?;

        let deleted = garbage.for_each(|key| {
            debug!("Deleting package {}", display_key(key));
            self.store
                .delete_by_key(key)
                .map_err(|e| Error::DeleteFailure {
                    target: DeleteTarget::Package(key.to_vec()),
                    source: Box::new(e),
                })
        });

        if let Err(err) = deleted {
            if let Err(abort_err) = self.store.abort_batch() {
                warn!("Failed to roll back package deletions: {}", abort_err);
            }
            return Err(err);
        }

        self.store
            .finish_batch()
            .map_err(|e| Error::CommitFailure(Box::new(e)))?;

        Ok(garbage.len())
    }
}
