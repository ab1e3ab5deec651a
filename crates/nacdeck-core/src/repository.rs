// ── External collaborators ──
//
// The entity repository the dashboard loads from, and the opaque
// key-value store snapshots are persisted to. Both are traits so a real
// backend can replace the in-memory implementations here.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::error::CoreError;
use crate::fixtures;
use crate::model::{Policy, Project, Site, TimelineEvent};
use crate::store::{DashboardSnapshot, DataStore};

/// Bulk access to one entity type.
///
/// Single-record creation goes through the store's validated
/// `create_*` operations, not the repository.
pub trait EntityRepository<T> {
    fn list(&self) -> Result<Vec<T>, CoreError>;
    fn save(&self, items: &[T]) -> Result<(), CoreError>;
}

/// Read every collection from a repository that serves all four types.
pub fn collect_snapshot<R>(repo: &R) -> Result<DashboardSnapshot, CoreError>
where
    R: EntityRepository<Site>
        + EntityRepository<Policy>
        + EntityRepository<TimelineEvent>
        + EntityRepository<Project>,
{
    Ok(DashboardSnapshot {
        sites: EntityRepository::<Site>::list(repo)?,
        policies: EntityRepository::<Policy>::list(repo)?,
        events: EntityRepository::<TimelineEvent>::list(repo)?,
        projects: EntityRepository::<Project>::list(repo)?,
    })
}

/// In-memory repository seeded with the demo fixtures.
pub struct FixtureRepository {
    data: RwLock<DashboardSnapshot>,
}

impl FixtureRepository {
    pub fn new() -> Self {
        Self::with_snapshot(fixtures::snapshot())
    }

    pub fn with_snapshot(snapshot: DashboardSnapshot) -> Self {
        Self {
            data: RwLock::new(snapshot),
        }
    }

    fn read<T: Clone>(&self, pick: impl Fn(&DashboardSnapshot) -> &Vec<T>) -> Vec<T> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        pick(&data).clone()
    }

    fn write<T: Clone>(&self, items: &[T], pick: impl Fn(&mut DashboardSnapshot) -> &mut Vec<T>) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        *pick(&mut data) = items.to_vec();
    }
}

impl Default for FixtureRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRepository<Site> for FixtureRepository {
    fn list(&self) -> Result<Vec<Site>, CoreError> {
        Ok(self.read(|d| &d.sites))
    }

    fn save(&self, items: &[Site]) -> Result<(), CoreError> {
        self.write(items, |d| &mut d.sites);
        Ok(())
    }
}

impl EntityRepository<Policy> for FixtureRepository {
    fn list(&self) -> Result<Vec<Policy>, CoreError> {
        Ok(self.read(|d| &d.policies))
    }

    fn save(&self, items: &[Policy]) -> Result<(), CoreError> {
        self.write(items, |d| &mut d.policies);
        Ok(())
    }
}

impl EntityRepository<TimelineEvent> for FixtureRepository {
    fn list(&self) -> Result<Vec<TimelineEvent>, CoreError> {
        Ok(self.read(|d| &d.events))
    }

    fn save(&self, items: &[TimelineEvent]) -> Result<(), CoreError> {
        self.write(items, |d| &mut d.events);
        Ok(())
    }
}

impl EntityRepository<Project> for FixtureRepository {
    fn list(&self) -> Result<Vec<Project>, CoreError> {
        Ok(self.read(|d| &d.projects))
    }

    fn save(&self, items: &[Project]) -> Result<(), CoreError> {
        self.write(items, |d| &mut d.projects);
        Ok(())
    }
}

// ── Key-value snapshots ──────────────────────────────────────────────

/// Opaque get/set of JSON blobs.
pub trait SnapshotStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn set(&self, key: &str, value: String) -> Result<(), CoreError>;
}

#[derive(Default)]
pub struct MemorySnapshotStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), CoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value);
        Ok(())
    }
}

impl DataStore {
    /// Serialize every collection under `key`.
    pub fn save_snapshot(&self, kv: &dyn SnapshotStore, key: &str) -> Result<(), CoreError> {
        let blob = serde_json::to_string(&self.to_snapshot())?;
        debug!(key, bytes = blob.len(), "saving dashboard snapshot");
        kv.set(key, blob)
    }

    /// Replace the store's contents with the blob under `key`.
    ///
    /// Returns `Ok(false)` when nothing is stored there. A malformed blob
    /// is an error and leaves the store untouched.
    pub fn restore_snapshot(&self, kv: &dyn SnapshotStore, key: &str) -> Result<bool, CoreError> {
        let Some(blob) = kv.get(key)? else {
            return Ok(false);
        };
        let snapshot: DashboardSnapshot = serde_json::from_str(&blob)?;
        self.apply_snapshot(snapshot);
        Ok(true)
    }
}
