// ── Dashboard facade ──
//
// Owns one DataStore and one MetricsSimulator, routes write commands to
// the store, and ties every pending simulated-delay operation to a
// cancellation token so unmounting never leaves work behind.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use strum::Display;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::aggregate::{DashboardSummary, PolicySummary, SiteSummary};
use crate::command::{Command, CommandResult};
use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::metrics::{MetricsSimulator, MetricsSource, SyntheticMetrics};
use crate::model::{Policy, Project, Site, TimelineEvent};
use crate::repository::{EntityRepository, FixtureRepository, SnapshotStore, collect_snapshot};
use crate::store::DataStore;
use crate::stream::{EventFilter, FilteredView, PolicyFilter, ProjectFilter, SiteFilter, apply};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DashboardState {
    /// Constructed, nothing loaded yet.
    Empty,
    Loading,
    Ready,
    /// Torn down; every further operation fails with `Cancelled`.
    Unmounted,
}

/// Resolve after `delay`, or fail with [`CoreError::Cancelled`] as soon
/// as `cancel` fires. Cancellation wins if both are ready.
pub async fn simulate_latency(delay: Duration, cancel: &CancellationToken) -> Result<(), CoreError> {
    if cancel.is_cancelled() {
        return Err(CoreError::Cancelled);
    }
    if delay.is_zero() {
        return Ok(());
    }
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(CoreError::Cancelled),
        () = tokio::time::sleep(delay) => Ok(()),
    }
}

/// The main entry point for consumers.
///
/// Cheaply cloneable. Each dashboard owns its own store; two dashboards
/// loading the same fixtures diverge independently after local edits.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    store: Arc<DataStore>,
    metrics: MetricsSimulator,
    state: watch::Sender<DashboardState>,
    cancel: CancellationToken,
}

impl Dashboard {
    /// Create a dashboard with synthetic metrics. Does not load anything;
    /// call [`load()`](Self::load) or [`mount()`](Self::mount).
    pub fn new(config: DashboardConfig) -> Self {
        let source = SyntheticMetrics::new(config.metrics_seed, &config.metrics_bounds);
        Self::with_metrics_source(config, source)
    }

    /// Create a dashboard fed by a custom metrics source.
    pub fn with_metrics_source(config: DashboardConfig, source: impl MetricsSource + 'static) -> Self {
        let metrics = MetricsSimulator::new(source, config.metrics_interval);
        let (state, _) = watch::channel(DashboardState::Empty);

        Self {
            inner: Arc::new(DashboardInner {
                config,
                store: Arc::new(DataStore::new()),
                metrics,
                state,
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    pub fn metrics(&self) -> &MetricsSimulator {
        &self.inner.metrics
    }

    pub fn state(&self) -> DashboardState {
        *self.inner.state.borrow()
    }

    pub fn state_changes(&self) -> watch::Receiver<DashboardState> {
        self.inner.state.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load the demo fixtures after the simulated network delay.
    pub async fn load(&self) -> Result<(), CoreError> {
        self.load_from(&FixtureRepository::new()).await
    }

    /// Load every collection from `repo` after the simulated delay.
    ///
    /// If the dashboard is unmounted while waiting, nothing is written.
    pub async fn load_from<R>(&self, repo: &R) -> Result<(), CoreError>
    where
        R: EntityRepository<Site>
            + EntityRepository<Policy>
            + EntityRepository<TimelineEvent>
            + EntityRepository<Project>,
    {
        self.ensure_mounted()?;
        self.set_state(DashboardState::Loading);

        self.delay().await?;
        let snapshot = collect_snapshot(repo)?;
        self.ensure_mounted()?;
        self.inner.store.apply_snapshot(snapshot);

        self.set_state(DashboardState::Ready);
        info!(
            sites = self.inner.store.site_count(),
            policies = self.inner.store.policy_count(),
            "dashboard loaded"
        );
        Ok(())
    }

    /// Load the fixtures and start the metrics timer.
    ///
    /// An `unmount` racing this call always wins: the timer is never left
    /// running on an unmounted dashboard.
    pub async fn mount(&self) -> Result<(), CoreError> {
        self.load().await?;
        self.ensure_mounted()?;
        self.inner.metrics.start()?;
        if self.inner.cancel.is_cancelled() {
            self.inner.metrics.stop().await;
            return Err(CoreError::Cancelled);
        }
        Ok(())
    }

    /// Tear down: abandon pending delayed work and stop the metrics timer.
    pub async fn unmount(&self) {
        self.inner.cancel.cancel();
        self.inner.metrics.stop().await;
        self.inner.state.send_replace(DashboardState::Unmounted);
        info!("dashboard unmounted");
    }

    /// One-shot: load, run closure, unmount. Metrics never start.
    pub async fn oneshot<F, Fut, T>(config: DashboardConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Dashboard) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let dashboard = Dashboard::new(config);
        dashboard.load().await?;
        let result = f(dashboard.clone()).await;
        dashboard.unmount().await;
        result
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Execute a write after the simulated save delay.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        self.ensure_mounted()?;
        self.delay().await?;
        route_command(&self.inner.store, cmd)
    }

    /// Persist the store under `key` after the simulated delay.
    pub async fn save(&self, kv: &dyn SnapshotStore, key: &str) -> Result<(), CoreError> {
        self.ensure_mounted()?;
        self.delay().await?;
        self.inner.store.save_snapshot(kv, key)
    }

    /// Replace the store with the snapshot under `key`, if any.
    pub async fn restore(&self, kv: &dyn SnapshotStore, key: &str) -> Result<bool, CoreError> {
        self.ensure_mounted()?;
        self.delay().await?;
        let restored = self.inner.store.restore_snapshot(kv, key)?;
        if restored {
            self.set_state(DashboardState::Ready);
        }
        Ok(restored)
    }

    // ── Derived views ────────────────────────────────────────────────

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::compute(
            &self.inner.store,
            self.inner.config.effectiveness_scope,
            Utc::now(),
        )
    }

    /// Site summary over the rows matching `filter`.
    pub fn site_summary(&self, filter: &SiteFilter) -> SiteSummary {
        SiteSummary::from_sites(&apply(&self.inner.store.sites_snapshot(), filter))
    }

    /// Policy summary over the rows matching `filter`, using the
    /// configured effectiveness scope.
    pub fn policy_summary(&self, filter: &PolicyFilter) -> PolicySummary {
        PolicySummary::from_policies(
            &apply(&self.inner.store.policies_snapshot(), filter),
            self.inner.config.effectiveness_scope,
        )
    }

    pub fn site_view(&self, filter: SiteFilter) -> FilteredView<Site, SiteFilter> {
        FilteredView::new(self.inner.store.subscribe_sites(), filter)
    }

    pub fn policy_view(&self, filter: PolicyFilter) -> FilteredView<Policy, PolicyFilter> {
        FilteredView::new(self.inner.store.subscribe_policies(), filter)
    }

    pub fn event_view(&self, filter: EventFilter) -> FilteredView<TimelineEvent, EventFilter> {
        FilteredView::new(self.inner.store.subscribe_events(), filter)
    }

    pub fn project_view(&self, filter: ProjectFilter) -> FilteredView<Project, ProjectFilter> {
        FilteredView::new(self.inner.store.subscribe_projects(), filter)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn ensure_mounted(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        Ok(())
    }

    /// Move to `next` unless already unmounted, which is terminal.
    fn set_state(&self, next: DashboardState) {
        self.inner.state.send_if_modified(|state| {
            if *state == DashboardState::Unmounted || *state == next {
                return false;
            }
            *state = next;
            true
        });
    }

    async fn delay(&self) -> Result<(), CoreError> {
        let delay = self.inner.config.simulated_latency;
        debug!(delay_ms = delay.as_millis(), "simulating network latency");
        simulate_latency(delay, &self.inner.cancel).await
    }
}

fn route_command(store: &DataStore, cmd: Command) -> Result<CommandResult, CoreError> {
    match cmd {
        // ── Sites ────────────────────────────────────────────────────
        Command::CreateSite(req) => store.create_site(req).map(CommandResult::Site),
        Command::UpdateSite { id, update } => {
            store.update_site(&id, update).map(CommandResult::Site)
        }
        Command::DeleteSite { id } => store.delete_site(&id).map(|_| CommandResult::Ok),

        // ── Policies ─────────────────────────────────────────────────
        Command::CreatePolicy(req) => store.create_policy(req).map(CommandResult::Policy),
        Command::UpdatePolicy { id, update } => {
            store.update_policy(&id, update).map(CommandResult::Policy)
        }
        Command::DeletePolicy { id } => store.delete_policy(&id).map(|_| CommandResult::Ok),

        // ── Timeline ─────────────────────────────────────────────────
        Command::CreateTimelineEvent(req) => {
            store.create_event(req).map(CommandResult::TimelineEvent)
        }
        Command::UpdateTimelineEvent { id, update } => store
            .update_event(&id, update)
            .map(CommandResult::TimelineEvent),
        Command::DeleteTimelineEvent { id } => {
            store.delete_event(&id).map(|_| CommandResult::Ok)
        }

        // ── Projects ─────────────────────────────────────────────────
        Command::CreateProject(req) => store.create_project(req).map(CommandResult::Project),
        Command::UpdateProject { id, update } => {
            store.update_project(&id, update).map(CommandResult::Project)
        }
        Command::DeleteProject { id } => store.delete_project(&id).map(|_| CommandResult::Ok),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::{CreateSiteRequest, UpdateSiteRequest};
    use crate::model::{DeploymentStatus, EntityId, Location, NetworkProfile, Priority, RiskLevel};
    use crate::repository::MemorySnapshotStore;
    use crate::stream::Criterion;

    fn config() -> DashboardConfig {
        DashboardConfig {
            metrics_seed: Some(5),
            ..DashboardConfig::default()
        }
    }

    fn new_site(code: &str) -> CreateSiteRequest {
        CreateSiteRequest {
            name: format!("{code} Office"),
            site_code: code.into(),
            location: Location {
                region: "Europe".into(),
                country: "Spain".into(),
                city: "Madrid".into(),
                address: String::new(),
                timezone: "Europe/Madrid".into(),
                coordinates: None,
            },
            status: DeploymentStatus::Planning,
            priority: Priority::Medium,
            risk_level: RiskLevel::Low,
            network: NetworkProfile::default(),
            budget: None,
            tags: vec![],
            stakeholders: vec![],
            compliance_frameworks: vec![],
            go_live: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn load_waits_for_latency_then_fills_store() {
        let dash = Dashboard::new(config());
        assert_eq!(dash.state(), DashboardState::Empty);

        let started = tokio::time::Instant::now();
        dash.load().await.unwrap();
        assert!(started.elapsed() >= dash.config().simulated_latency);
        assert_eq!(dash.state(), DashboardState::Ready);
        assert!(dash.store().site_count() > 0);
        assert!(dash.store().last_loaded().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_during_load_abandons_it() {
        let dash = Dashboard::new(config());
        let loader = {
            let dash = dash.clone();
            tokio::spawn(async move { dash.load().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        dash.unmount().await;

        let result = loader.await.unwrap();
        assert!(matches!(result, Err(CoreError::Cancelled)));
        assert!(dash.store().is_empty());
        assert_eq!(dash.state(), DashboardState::Unmounted);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_latency_returns_promptly() {
        let cancel = CancellationToken::new();
        let waiter = {
            let cancel = cancel.clone();
            tokio::spawn(async move { simulate_latency(Duration::from_secs(60), &cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();
        assert!(matches!(waiter.await.unwrap(), Err(CoreError::Cancelled)));
        assert!(simulate_latency(Duration::ZERO, &cancel).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn execute_routes_commands_to_the_store() {
        let dash = Dashboard::new(config());
        dash.load().await.unwrap();
        let before = dash.store().site_count();

        let CommandResult::Site(site) = dash
            .execute(Command::CreateSite(new_site("MAD-01")))
            .await
            .unwrap()
        else {
            panic!("expected a site");
        };
        assert_eq!(dash.store().site_count(), before + 1);

        dash.execute(Command::UpdateSite {
            id: site.id.clone(),
            update: UpdateSiteRequest {
                progress: Some(30),
                ..Default::default()
            },
        })
        .await
        .unwrap();
        assert_eq!(dash.store().site(&site.id).unwrap().progress, 30);

        let err = dash
            .execute(Command::DeleteSite {
                id: EntityId::from("site-missing"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_runs_after_unmount() {
        let dash = Dashboard::new(config());
        dash.load().await.unwrap();
        dash.unmount().await;

        let err = dash
            .execute(Command::CreateSite(new_site("MAD-02")))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Cancelled));
        assert!(matches!(dash.load().await, Err(CoreError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn mount_starts_metrics_and_unmount_stops_them() {
        let dash = Dashboard::new(config());
        dash.mount().await.unwrap();
        assert!(dash.metrics().is_running());
        assert_eq!(dash.metrics().active_timers(), 1);

        tokio::time::sleep(dash.config().metrics_interval * 2).await;
        assert!(dash.metrics().latest().tick >= 1);

        dash.unmount().await;
        assert!(!dash.metrics().is_running());
        assert_eq!(dash.metrics().active_timers(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_unmount_never_leaves_a_timer_running() {
        for _ in 0..50 {
            let dash = Dashboard::new(DashboardConfig {
                simulated_latency: Duration::ZERO,
                ..config()
            });
            let mounting = {
                let dash = dash.clone();
                tokio::spawn(async move { dash.mount().await })
            };
            let unmounting = {
                let dash = dash.clone();
                tokio::spawn(async move { dash.unmount().await })
            };
            let mounted = mounting.await.unwrap();
            unmounting.await.unwrap();

            assert!(mounted.is_ok() || matches!(mounted, Err(CoreError::Cancelled)));
            assert!(!dash.metrics().is_running());
            assert_eq!(dash.metrics().active_timers(), 0);
            assert_eq!(dash.state(), DashboardState::Unmounted);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dashboards_do_not_share_stores() {
        let a = Dashboard::new(config());
        let b = Dashboard::new(config());
        a.load().await.unwrap();
        b.load().await.unwrap();

        a.execute(Command::DeleteSite {
            id: EntityId::from("site-nyc-hq"),
        })
        .await
        .unwrap();
        assert_eq!(a.store().site_count() + 1, b.store().site_count());
    }

    #[tokio::test(start_paused = true)]
    async fn save_and_restore_through_snapshot_store() {
        let kv = MemorySnapshotStore::new();
        let a = Dashboard::new(config());
        a.load().await.unwrap();
        a.execute(Command::CreateSite(new_site("MAD-03"))).await.unwrap();
        a.save(&kv, "demo").await.unwrap();

        let b = Dashboard::new(config());
        assert!(b.restore(&kv, "demo").await.unwrap());
        assert_eq!(b.store().to_snapshot(), a.store().to_snapshot());
        assert_eq!(b.state(), DashboardState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn filtered_summaries() {
        let dash = Dashboard::new(config());
        dash.load().await.unwrap();

        let europe = dash.site_summary(&SiteFilter::new().region(Criterion::Only("Europe".into())));
        assert!(europe.total > 0);
        assert!(europe.total < dash.store().site_count());

        let overview = dash.summary();
        assert_eq!(overview.sites.total, dash.store().site_count());
        assert_eq!(
            overview.policies.effectiveness_scope,
            dash.config().effectiveness_scope
        );

        let mut view = dash.site_view(SiteFilter::new());
        assert_eq!(view.rows().len(), dash.store().site_count());
    }

    #[tokio::test(start_paused = true)]
    async fn event_and_project_views_follow_the_store() {
        let dash = Dashboard::new(config());
        dash.load().await.unwrap();

        let nyc = EntityId::from("site-nyc-hq");
        let mut events = dash.event_view(EventFilter::new().site(Criterion::Only(nyc.clone())));
        let before = events.rows();
        assert!(!before.is_empty());
        assert!(before.iter().all(|e| e.site_id.as_ref() == Some(&nyc)));

        let mut projects = dash.project_view(ProjectFilter::new().search("refresh"));
        assert_eq!(projects.rows().len(), 1);
        assert_eq!(projects.recomputations(), 1);

        dash.execute(Command::DeleteSite { id: nyc }).await.unwrap();
        assert!(events.rows().is_empty());
        assert_eq!(events.recomputations(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn oneshot_unmounts_afterwards() {
        let count = Dashboard::oneshot(config(), |dash| async move {
            Ok(dash.store().policy_count())
        })
        .await
        .unwrap();
        assert!(count > 0);
    }
}
