// ── Reactive entity streams ──
//
// Subscription types for consuming entity changes from the DataStore,
// plus the filter predicates and memoized views built on top of them.

pub mod filter;
mod view;

use std::sync::Arc;

use tokio::sync::watch;

pub use filter::{
    Criterion, EventFilter, Filter, PolicyFilter, ProjectFilter, SiteFilter, TextQuery, apply,
};
pub use view::FilteredView;

/// A subscription to a collection of entities.
///
/// Point-in-time snapshot access plus change notification through
/// [`changed()`](Self::changed).
pub struct EntityStream<T: Clone + Send + Sync + 'static> {
    current: Arc<Vec<Arc<T>>>,
    receiver: watch::Receiver<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Vec<Arc<T>>>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Get the snapshot captured at creation time (or at the last `changed()`).
    pub fn current(&self) -> &Arc<Vec<Arc<T>>> {
        &self.current
    }

    /// Get the latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Arc<Vec<Arc<T>>> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the sender (DataStore) has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<Vec<Arc<T>>>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }
}
