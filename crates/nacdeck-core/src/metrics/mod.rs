// ── Simulated operational metrics ──
//
// Display-only telemetry for the live dashboard widgets. The data types
// live here; `generator` produces snapshots and `simulator` drives the
// generator on an interval.

mod generator;
mod simulator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use generator::{MetricsSource, SyntheticMetrics};
pub use simulator::{MetricsSimulator, MetricsStream, SimulatorState};

/// Success rate never leaves this band.
pub const SUCCESS_RATE_RANGE: (f64, f64) = (90.0, 100.0);

/// Upper limit for any configured response time, in milliseconds.
const RESPONSE_CEILING_MS: f64 = 60_000.0;

/// Spreads smaller than this are treated as zero.
const MIN_SPREAD: f64 = 0.001;

/// One point-in-time bundle of simulated NAC telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    /// 0 for the initial snapshot, then +1 per tick.
    pub tick: u64,
    pub devices: DeviceCounters,
    /// Cumulative policy evaluations.
    pub policies_evaluated: u64,
    pub response_time_ms: f64,
    /// Percentage of successful authentications.
    pub success_rate: f64,
    pub active_sessions: u32,
    pub compliance: ComplianceBreakdown,
    pub risk: RiskHistogram,
}

/// Cumulative access decisions. Never decrease.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCounters {
    pub allowed: u64,
    pub blocked: u64,
    pub quarantined: u64,
}

impl DeviceCounters {
    pub fn total(&self) -> u64 {
        self.allowed
            .saturating_add(self.blocked)
            .saturating_add(self.quarantined)
    }
}

/// Device compliance split in whole percentages; always sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceBreakdown {
    pub compliant: u8,
    pub non_compliant: u8,
    pub unknown: u8,
}

impl ComplianceBreakdown {
    pub fn total(&self) -> u32 {
        u32::from(self.compliant) + u32::from(self.non_compliant) + u32::from(self.unknown)
    }
}

/// Devices per risk-score band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskHistogram {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
}

/// Tuning for the synthetic generator.
///
/// Any combination of values is accepted; [`MetricsBounds::sanitized`]
/// repairs inverted ranges, negative spreads and non-finite numbers
/// before the generator uses them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsBounds {
    pub min_response_ms: f64,
    pub max_response_ms: f64,
    /// Largest response-time change per tick.
    pub response_jitter_ms: f64,
    /// Largest success-rate change per tick, in percentage points.
    pub success_jitter: f64,
    /// Compliance rate never drops below this.
    pub compliance_floor: u8,
    /// Largest compliance change per tick, in percentage points.
    pub compliance_jitter: u8,
    /// Largest increase of the allowed-device counter per tick.
    pub max_allowed_step: u64,
    /// Largest increase of the blocked-device counter per tick.
    pub max_blocked_step: u64,
    /// Largest increase of the quarantined-device counter per tick.
    pub max_quarantined_step: u64,
    pub max_sessions: u32,
    /// Largest active-session change per tick.
    pub session_jitter: u32,
    /// Largest change of a risk histogram bin per tick.
    pub risk_jitter: u32,
}

impl Default for MetricsBounds {
    fn default() -> Self {
        Self {
            min_response_ms: 20.0,
            max_response_ms: 250.0,
            response_jitter_ms: 8.0,
            success_jitter: 0.6,
            compliance_floor: 70,
            compliance_jitter: 2,
            max_allowed_step: 25,
            max_blocked_step: 4,
            max_quarantined_step: 1,
            max_sessions: 5_000,
            session_jitter: 40,
            risk_jitter: 3,
        }
    }
}

impl MetricsBounds {
    /// A copy that is safe to sample from: finite, ordered, non-negative.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let finite = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };

        let mut min = finite(self.min_response_ms, defaults.min_response_ms)
            .clamp(0.0, RESPONSE_CEILING_MS);
        let mut max = finite(self.max_response_ms, defaults.max_response_ms)
            .clamp(0.0, RESPONSE_CEILING_MS);
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }

        Self {
            min_response_ms: min,
            max_response_ms: max,
            response_jitter_ms: spread(
                finite(self.response_jitter_ms, defaults.response_jitter_ms),
                max - min,
            ),
            success_jitter: spread(
                finite(self.success_jitter, defaults.success_jitter),
                SUCCESS_RATE_RANGE.1 - SUCCESS_RATE_RANGE.0,
            ),
            compliance_floor: self.compliance_floor.min(100),
            compliance_jitter: self.compliance_jitter.min(100),
            max_allowed_step: self.max_allowed_step,
            max_blocked_step: self.max_blocked_step,
            max_quarantined_step: self.max_quarantined_step,
            max_sessions: self.max_sessions,
            session_jitter: self.session_jitter,
            risk_jitter: self.risk_jitter,
        }
    }
}

fn spread(value: f64, max: f64) -> f64 {
    let value = value.clamp(0.0, max);
    if value < MIN_SPREAD { 0.0 } else { value }
}
