// src/gc/guard.rs

//! Refuse to drop mirrors that snapshots were taken from

use super::traits::{MirrorRegistry, SnapshotIndex};
use crate::error::{Error, Result};
use serde::Serialize;
use tracing::{info, warn};

/// Result of a successful mirror drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropOutcome {
    pub mirror: String,
    /// Snapshots that depended on the mirror and were overridden with `force`
    pub overridden: Vec<String>,
}

pub struct DependencyGuard<'a> {
    mirrors: &'a dyn MirrorRegistry,
    snapshots: &'a dyn SnapshotIndex,
}

impl<'a> DependencyGuard<'a> {
    pub fn new(mirrors: &'a dyn MirrorRegistry, snapshots: &'a dyn SnapshotIndex) -> Self {
        Self { mirrors, snapshots }
    }

    /// Drop a mirror's metadata unless snapshots still depend on it
    ///
    /// Only the mirror record and its own reference list go away. Packages it
    /// pulled in are reclaimed by the next cleanup run, once nothing else
    /// references them.
    pub fn safe_drop_mirror(&self, name: &str, force: bool) -> Result<DropOutcome> {
        let mirror = self.mirrors.by_name(name)?;

        let dependents: Vec<String> = self
            .snapshots
            .by_remote_repo_source(&mirror)?
            .into_iter()
            .map(|snapshot| snapshot.name)
            .collect();

        if !dependents.is_empty() {
            if !force {
                return Err(Error::DependentsExist {
                    mirror: mirror.name,
                    snapshots: dependents,
                });
            }
            warn!(
                "Dropping mirror '{}' although snapshots depend on it: {}",
                mirror.name,
                dependents.join(", ")
            );
        }

        self.mirrors.drop_mirror(&mirror)?;
        info!("Mirror '{}' dropped", mirror.name);

        Ok(DropOutcome {
            mirror: mirror.name,
            overridden: dependents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{LocalRepo, Snapshot};
    use crate::gc::live::LiveSetCollector;
    use crate::gc::test_support::{FakeCollection, FakeRegistry, keys, mirror, snapshot_of};

    /// Run the mark phase over whatever mirrors the registry still holds
    fn live_after(registry: &FakeRegistry) -> Vec<String> {
        let mirrors = registry.remaining();
        let local_repos: FakeCollection<LocalRepo> = FakeCollection::new(Vec::new());
        let snapshots: FakeCollection<Snapshot> = FakeCollection::new(Vec::new());
        let live = LiveSetCollector::new(&mirrors, &local_repos, &snapshots)
            .collect_live()
            .unwrap();
        keys(&live)
    }

    fn registry() -> FakeRegistry {
        let mut wheezy = mirror("wheezy-main", Some(&["a"]));
        wheezy.id = Some(1);
        let mut sid = mirror("sid-main", None);
        sid.id = Some(2);

        FakeRegistry::new(vec![wheezy, sid], vec![snapshot_of("snap1", 1)])
    }

    #[test]
    fn test_refuses_mirror_with_snapshots() {
        let registry = registry();
        let err = DependencyGuard::new(&registry, &registry)
            .safe_drop_mirror("wheezy-main", false)
            .unwrap_err();

        match err {
            Error::DependentsExist { mirror, snapshots } => {
                assert_eq!(mirror, "wheezy-main");
                assert_eq!(snapshots, vec!["snap1"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(registry.mirror_names(), vec!["wheezy-main", "sid-main"]);
        assert_eq!(live_after(&registry), vec!["a"]);
    }

    #[test]
    fn test_failed_drop_keeps_mirror_live() {
        let registry = registry().failing_drop();
        let err = DependencyGuard::new(&registry, &registry)
            .safe_drop_mirror("sid-main", false)
            .unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_recoverable());
        assert_eq!(registry.mirror_names(), vec!["wheezy-main", "sid-main"]);
        assert_eq!(live_after(&registry), vec!["a"]);
    }

    #[test]
    fn test_force_overrides_dependents() {
        let registry = registry();
        let outcome = DependencyGuard::new(&registry, &registry)
            .safe_drop_mirror("wheezy-main", true)
            .unwrap();

        assert_eq!(outcome.mirror, "wheezy-main");
        assert_eq!(outcome.overridden, vec!["snap1"]);
        assert_eq!(registry.mirror_names(), vec!["sid-main"]);
    }

    #[test]
    fn test_drops_unreferenced_mirror() {
        let registry = registry();
        let outcome = DependencyGuard::new(&registry, &registry)
            .safe_drop_mirror("sid-main", false)
            .unwrap();

        assert!(outcome.overridden.is_empty());
        assert_eq!(registry.mirror_names(), vec!["wheezy-main"]);
    }

    #[test]
    fn test_unknown_mirror() {
        let registry = registry();
        let err = DependencyGuard::new(&registry, &registry)
            .safe_drop_mirror("nope", true)
            .unwrap_err();
        assert!(matches!(err, Error::NotFoundError(_)));
        assert!(err.is_recoverable());
    }
}
