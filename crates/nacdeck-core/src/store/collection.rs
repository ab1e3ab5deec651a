// ── Generic reactive entity collection ──
//
// Insertion-ordered storage with O(1) lookups and push-based change
// notification via `watch` channels.

use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use tokio::sync::watch;

use crate::model::EntityId;

/// A reactive collection for a single entity type.
///
/// Uses an `IndexMap` so snapshots keep the order records were first
/// inserted in (filters are stable against it). Every mutation bumps a
/// version counter and rebuilds the snapshot that subscribers receive.
pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    /// Primary storage: EntityId -> entity, in insertion order.
    by_id: RwLock<IndexMap<EntityId, Arc<T>>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: RwLock::new(IndexMap::new()),
            version,
            snapshot,
        }
    }

    /// Insert or update an entity. Returns `true` if the id was new.
    ///
    /// Updating an existing id keeps its original position.
    pub(crate) fn upsert(&self, id: EntityId, entity: impl Into<Arc<T>>) -> bool {
        let is_new = {
            let mut map = self.by_id.write().unwrap_or_else(PoisonError::into_inner);
            map.insert(id, entity.into()).is_none()
        };

        self.publish();
        is_new
    }

    /// Apply `f` to a copy of the entity and store the result.
    /// Returns the new value, or `None` if the id is unknown.
    pub(crate) fn modify(&self, id: &EntityId, f: impl FnOnce(&mut T)) -> Option<Arc<T>> {
        let updated = {
            let mut map = self.by_id.write().unwrap_or_else(PoisonError::into_inner);
            let slot = map.get_mut(id)?;
            let mut value = T::clone(&**slot);
            f(&mut value);
            let value = Arc::new(value);
            *slot = Arc::clone(&value);
            value
        };

        self.publish();
        Some(updated)
    }

    /// Remove an entity by id. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, id: &EntityId) -> Option<Arc<T>> {
        let removed = self
            .by_id
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(id);
        if removed.is_some() {
            self.publish();
        }
        removed
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.by_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(Arc::clone)
    }

    pub(crate) fn contains(&self, id: &EntityId) -> bool {
        self.by_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    #[cfg(test)]
    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Remove all entities.
    pub(crate) fn clear(&self) {
        self.by_id
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.publish();
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return all current ids in insertion order.
    pub(crate) fn ids(&self) -> Vec<EntityId> {
        self.by_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Rebuild the snapshot vec, broadcast it, and bump the version.
    fn publish(&self) {
        let values: Vec<Arc<T>> = self
            .by_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Arc::clone)
            .collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn upsert_returns_true_for_new_id() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert!(col.upsert(EntityId::from("a"), String::from("hello")));
    }

    #[test]
    fn upsert_returns_false_for_existing_id() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert(EntityId::from("a"), String::from("hello"));
        assert!(!col.upsert(EntityId::from("a"), String::from("world")));
        assert_eq!(*col.get(&EntityId::from("a")).unwrap(), "world");
    }

    #[test]
    fn snapshot_preserves_insertion_order() {
        let col: EntityCollection<String> = EntityCollection::new();
        for key in ["c", "a", "b"] {
            col.upsert(EntityId::from(key), key.to_owned());
        }
        // Re-upserting keeps the original slot.
        col.upsert(EntityId::from("c"), String::from("c2"));

        let snap = col.snapshot();
        let values: Vec<&str> = snap.iter().map(|s| s.as_str()).collect();
        assert_eq!(values, ["c2", "a", "b"]);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let col: EntityCollection<String> = EntityCollection::new();
        for key in ["a", "b", "c"] {
            col.upsert(EntityId::from(key), key.to_owned());
        }
        let removed = col.remove(&EntityId::from("b"));
        assert_eq!(*removed.unwrap(), "b");
        assert_eq!(col.ids(), vec![EntityId::from("a"), EntityId::from("c")]);
    }

    #[test]
    fn remove_unknown_id_does_not_publish() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert(EntityId::from("a"), String::from("x"));
        let before = col.version();
        assert!(col.remove(&EntityId::from("zzz")).is_none());
        assert_eq!(col.version(), before);
    }

    #[test]
    fn modify_replaces_value_and_bumps_version() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert(EntityId::from("a"), String::from("x"));
        let before = col.version();

        let updated = col.modify(&EntityId::from("a"), |s| s.push('!')).unwrap();
        assert_eq!(*updated, "x!");
        assert_eq!(col.version(), before + 1);
        assert!(col.modify(&EntityId::from("missing"), |_| {}).is_none());
    }

    #[test]
    fn clear_empties_everything() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert(EntityId::from("1"), String::from("x"));
        col.upsert(EntityId::from("2"), String::from("y"));
        assert_eq!(col.len(), 2);

        col.clear();
        assert!(col.is_empty());
        assert!(col.snapshot().is_empty());
    }

    #[test]
    fn subscribers_see_new_snapshots() {
        let col: EntityCollection<String> = EntityCollection::new();
        let rx = col.subscribe();
        col.upsert(EntityId::from("1"), String::from("x"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow().len(), 1);
    }
}
