//! Reactive data layer for NAC rollout dashboards.
//!
//! This crate owns the domain model, the in-memory store, and the derived
//! views consumed by the `nacdeck` CLI:
//!
//! - **[`Dashboard`]**: Facade owning one [`DataStore`] and one
//!   [`MetricsSimulator`]. [`load()`](Dashboard::load) fills the store after a
//!   cancellable simulated delay, [`execute()`](Dashboard::execute) routes
//!   [`Command`]s, and [`unmount()`](Dashboard::unmount) abandons pending work
//!   and stops the metrics timer.
//!
//! - **[`DataStore`]**: Insertion-ordered `EntityCollection<T>`s
//!   (`IndexMap` + `tokio::sync::watch` channels) for sites, policies,
//!   timeline events and projects. Every write validates required fields,
//!   0–100 ranges and cross-entity references.
//!
//! - **[`EntityStream<T>`]** and **[`FilteredView`]**: Subscriptions with
//!   `current()` / `latest()` / `changed()`, and memoized filter results
//!   recomputed only when the snapshot or the criteria change.
//!
//! - **[`aggregate`]**: Zero-guarded counts, percentages and summaries.
//!
//! - **[`metrics`]**: The [`MetricsSource`] seam and its synthetic
//!   implementation, driven on an interval by [`MetricsSimulator`].

pub mod aggregate;
pub mod command;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fixtures;
pub mod metrics;
pub mod model;
pub mod repository;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::{
    DashboardSummary, EffectivenessScope, PolicySummary, ProjectSummary, SiteSummary,
    TimelineSummary,
};
pub use command::requests::*;
pub use command::{Command, CommandResult};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardState, simulate_latency};
pub use error::CoreError;
pub use metrics::{
    MetricsBounds, MetricsSimulator, MetricsSnapshot, MetricsSource, MetricsStream,
    SimulatorState, SyntheticMetrics,
};
pub use repository::{EntityRepository, FixtureRepository, MemorySnapshotStore, SnapshotStore};
pub use store::{DashboardSnapshot, DataStore};
pub use stream::{
    Criterion, EntityStream, EventFilter, FilteredView, PolicyFilter, ProjectFilter, SiteFilter,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Budget, Coordinates, DeploymentStatus, EntityId, EventStatus, EventType, Location,
    NetworkProfile, Policy, PolicyCategory, PolicyStatus, PolicyType, Priority, Project,
    RiskLevel, Site, TimelineEvent,
};
