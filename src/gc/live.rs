// src/gc/live.rs

//! Mark phase: compute the set of package references that are still live

use super::traits::{EntityCollection, RetainingEntity};
use crate::db::models::{EntityKind, LocalRepo, RemoteMirror, Snapshot};
use crate::error::{Error, Result};
use crate::reflist::PackageRefList;
use tracing::{debug, info};

/// Walks every retaining-entity collection and unions their reference lists
pub struct LiveSetCollector<'a> {
    mirrors: &'a dyn EntityCollection<RemoteMirror>,
    local_repos: &'a dyn EntityCollection<LocalRepo>,
    snapshots: &'a dyn EntityCollection<Snapshot>,
}

impl<'a> LiveSetCollector<'a> {
    pub fn new(
        mirrors: &'a dyn EntityCollection<RemoteMirror>,
        local_repos: &'a dyn EntityCollection<LocalRepo>,
        snapshots: &'a dyn EntityCollection<Snapshot>,
    ) -> Self {
        Self {
            mirrors,
            local_repos,
            snapshots,
        }
    }

    /// Union of every reference list held by mirrors, local repos and snapshots
    ///
    /// All three collections are drained before this returns. Any failure
    /// aborts the whole collection; a partial live set is never returned.
    pub fn collect_live(&self) -> Result<PackageRefList> {
        let mut live = PackageRefList::new();

        let mirrors = collect_from(self.mirrors, EntityKind::Mirror, &mut live)?;
        let local_repos = collect_from(self.local_repos, EntityKind::LocalRepo, &mut live)?;
        let snapshots = collect_from(self.snapshots, EntityKind::Snapshot, &mut live)?;

        info!(
            "Live set: {} packages from {} mirrors, {} local repos, {} snapshots",
            live.len(),
            mirrors,
            local_repos,
            snapshots
        );
        Ok(live)
    }
}

/// Merge the reference lists of one collection into `live`, returning how many entities were visited
fn collect_from<E: RetainingEntity>(
    collection: &dyn EntityCollection<E>,
    kind: EntityKind,
    live: &mut PackageRefList,
) -> Result<usize> {
    let mut visited = 0;

    collection.for_each(&mut |entity: &mut E| {
        collection
            .load_complete(entity)
            .map_err(|e| Error::LoadFailure {
                kind,
                name: entity.name().to_string(),
                source: Box::new(e),
            })?;

        match entity.ref_list() {
            Some(refs) => {
                debug!("{} '{}' keeps {} packages", kind, entity.name(), refs.len());
                *live = live.merge(refs, false);
            }
            None => debug!("{} '{}' has no package list", kind, entity.name()),
        }

        visited += 1;
        Ok(())
    })?;

    Ok(visited)
}
