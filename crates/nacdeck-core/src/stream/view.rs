// ── Memoized filtered views ──
//
// A FilteredView is the explicit recomputation point between the store
// and a list consumer: it re-runs the filter only when the collection
// snapshot (by `Arc` identity) or the criteria change.

use std::sync::Arc;

use tracing::debug;

use super::EntityStream;
use super::filter::{Filter, apply};

struct Memo<T, F> {
    source: Arc<Vec<Arc<T>>>,
    filter: F,
    result: Arc<Vec<Arc<T>>>,
}

/// A filter applied to a live entity subscription.
pub struct FilteredView<T: Clone + Send + Sync + 'static, F> {
    stream: EntityStream<T>,
    filter: F,
    memo: Option<Memo<T, F>>,
    recomputations: u64,
}

impl<T, F> FilteredView<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Filter<T> + Clone + PartialEq,
{
    pub fn new(stream: EntityStream<T>, filter: F) -> Self {
        Self {
            stream,
            filter,
            memo: None,
            recomputations: 0,
        }
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Replace the criteria. The next read recomputes if they differ.
    pub fn set_filter(&mut self, filter: F) {
        self.filter = filter;
    }

    /// Filtered rows for the latest snapshot.
    pub fn rows(&mut self) -> Arc<Vec<Arc<T>>> {
        let source = self.stream.latest();
        if let Some(memo) = &self.memo {
            if Arc::ptr_eq(&memo.source, &source) && memo.filter == self.filter {
                return Arc::clone(&memo.result);
            }
        }

        let result = Arc::new(apply(&source, &self.filter));
        self.recomputations += 1;
        debug!(
            total = source.len(),
            matched = result.len(),
            "filtered view recomputed"
        );
        self.memo = Some(Memo {
            source,
            filter: self.filter.clone(),
            result: Arc::clone(&result),
        });
        result
    }

    /// Total rows in the unfiltered snapshot.
    pub fn total(&self) -> usize {
        self.stream.latest().len()
    }

    /// Wait for the underlying collection to change, then return the
    /// recomputed rows. Returns `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<Arc<Vec<Arc<T>>>> {
        self.stream.changed().await?;
        Some(self.rows())
    }

    /// How many times the filter has actually run.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::UpdateSiteRequest;
    use crate::fixtures;
    use crate::model::{DeploymentStatus, EntityId};
    use crate::store::DataStore;
    use crate::stream::{Criterion, SiteFilter};

    fn loaded_store() -> DataStore {
        let store = DataStore::new();
        store.apply_snapshot(fixtures::snapshot());
        store
    }

    #[test]
    fn repeated_reads_reuse_the_memo() {
        let store = loaded_store();
        let mut view = FilteredView::new(store.subscribe_sites(), SiteFilter::new());
        let first = view.rows();
        let second = view.rows();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(view.recomputations(), 1);
        assert_eq!(first.len(), view.total());
    }

    #[test]
    fn changing_criteria_recomputes() {
        let store = loaded_store();
        let mut view = FilteredView::new(store.subscribe_sites(), SiteFilter::new());
        let all = view.rows().len();

        view.set_filter(SiteFilter::new().status(Criterion::Only(DeploymentStatus::Completed)));
        let completed = view.rows();
        assert!(completed.len() < all);
        assert_eq!(view.recomputations(), 2);

        // Same criteria again: no extra work.
        view.set_filter(SiteFilter::new().status(Criterion::Only(DeploymentStatus::Completed)));
        view.rows();
        assert_eq!(view.recomputations(), 2);
    }

    #[test]
    fn store_mutation_recomputes() {
        let store = loaded_store();
        let mut view = FilteredView::new(
            store.subscribe_sites(),
            SiteFilter::new().status(Criterion::Only(DeploymentStatus::OnHold)),
        );
        let before = view.rows().len();

        store
            .update_site(
                &EntityId::from("site-nyc-hq"),
                UpdateSiteRequest {
                    status: Some(DeploymentStatus::OnHold),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(view.rows().len(), before + 1);
        assert_eq!(view.recomputations(), 2);
    }

    #[tokio::test]
    async fn changed_yields_recomputed_rows() {
        let store = loaded_store();
        let mut view = FilteredView::new(store.subscribe_sites(), SiteFilter::new());
        let before = view.rows().len();

        store.delete_site(&EntityId::from("site-nyc-hq")).unwrap();
        let rows = view.changed().await.unwrap();
        assert_eq!(rows.len(), before - 1);
    }
}
