// ── Runtime dashboard configuration ──
//
// How a Dashboard behaves: metrics cadence, simulated latency and the
// aggregation scope. Core never reads config files; the CLI builds a
// `DashboardConfig` and hands it in.

use std::time::Duration;

use crate::aggregate::EffectivenessScope;
use crate::metrics::MetricsBounds;

/// Tick period of the synthetic metrics timer.
pub const DEFAULT_METRICS_INTERVAL: Duration = Duration::from_millis(3_000);

/// Delay applied to mock load and save operations.
pub const DEFAULT_SIMULATED_LATENCY: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// How often the metrics simulator emits a snapshot.
    pub metrics_interval: Duration,
    /// Mock network delay for load/save. Zero disables it.
    pub simulated_latency: Duration,
    /// Fixed seed for reproducible metrics; entropy when `None`.
    pub metrics_seed: Option<u64>,
    pub metrics_bounds: MetricsBounds,
    pub effectiveness_scope: EffectivenessScope,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            metrics_interval: DEFAULT_METRICS_INTERVAL,
            simulated_latency: DEFAULT_SIMULATED_LATENCY,
            metrics_seed: None,
            metrics_bounds: MetricsBounds::default(),
            effectiveness_scope: EffectivenessScope::default(),
        }
    }
}
