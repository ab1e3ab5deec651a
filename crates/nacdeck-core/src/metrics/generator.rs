// Synthetic telemetry: each snapshot is derived from the previous one by
// bounded random deltas. Nothing here can fail or panic.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    ComplianceBreakdown, DeviceCounters, MetricsBounds, MetricsSnapshot, RiskHistogram,
    SUCCESS_RATE_RANGE,
};

/// Where dashboard metrics come from.
///
/// The synthetic generator is the only implementation today; a real
/// telemetry feed would implement this trait and leave consumers alone.
pub trait MetricsSource: Send {
    /// The first snapshot of a run.
    fn initial(&mut self, now: DateTime<Utc>) -> MetricsSnapshot;

    /// The snapshot following `previous`.
    fn next(&mut self, previous: &MetricsSnapshot, now: DateTime<Utc>) -> MetricsSnapshot;
}

/// Randomized but internally consistent metrics.
pub struct SyntheticMetrics<R = StdRng> {
    rng: R,
    bounds: MetricsBounds,
}

impl SyntheticMetrics<StdRng> {
    /// Deterministic sequence for a given seed.
    pub fn seeded(seed: u64, bounds: &MetricsBounds) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), bounds)
    }

    pub fn from_entropy(bounds: &MetricsBounds) -> Self {
        Self::with_rng(StdRng::from_entropy(), bounds)
    }

    /// Seeded when `seed` is set, entropy otherwise.
    pub fn new(seed: Option<u64>, bounds: &MetricsBounds) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed, bounds),
            None => Self::from_entropy(bounds),
        }
    }
}

impl<R: Rng> SyntheticMetrics<R> {
    pub fn with_rng(rng: R, bounds: &MetricsBounds) -> Self {
        Self {
            rng,
            bounds: bounds.sanitized(),
        }
    }

    pub fn bounds(&self) -> &MetricsBounds {
        &self.bounds
    }

    /// `value` moved by at most `spread` in either direction, kept in `[lo, hi]`.
    fn walk_f64(&mut self, value: f64, spread: f64, lo: f64, hi: f64) -> f64 {
        let base = if value.is_finite() { value } else { lo };
        let delta = if spread > 0.0 {
            self.rng.gen_range(-spread..=spread)
        } else {
            0.0
        };
        round_tenth(base + delta).clamp(lo, hi)
    }

    /// Integer random walk in `[lo, hi]`.
    fn walk_u32(&mut self, value: u32, spread: u32, lo: u32, hi: u32) -> u32 {
        let up = self.rng.gen_range(0..=spread);
        let down = self.rng.gen_range(0..=spread);
        value.saturating_add(up).saturating_sub(down).clamp(lo, hi)
    }

    fn step(&mut self, max: u64) -> u64 {
        self.rng.gen_range(0..=max)
    }
}

/// `non_compliant` is capped to what `compliant` leaves; `unknown` takes the rest.
fn compliance(compliant: u8, non_compliant: u8) -> ComplianceBreakdown {
    let compliant = compliant.min(100);
    let remainder = 100 - compliant;
    let non_compliant = non_compliant.min(remainder);
    ComplianceBreakdown {
        compliant,
        non_compliant,
        unknown: remainder - non_compliant,
    }
}

impl<R: Rng + Send> MetricsSource for SyntheticMetrics<R> {
    fn initial(&mut self, now: DateTime<Utc>) -> MetricsSnapshot {
        let b = self.bounds.clone();
        let allowed = self.rng.gen_range(1_000..=1_500);
        let blocked = self.rng.gen_range(50..=120);
        let quarantined = self.rng.gen_range(5..=25);
        let devices = DeviceCounters {
            allowed,
            blocked,
            quarantined,
        };
        let compliant = self.rng.gen_range(b.compliance_floor.max(85)..=100);
        let non_compliant = self.rng.gen_range(0..=100 - compliant);

        MetricsSnapshot {
            timestamp: now,
            tick: 0,
            devices,
            policies_evaluated: devices.total().saturating_mul(3),
            response_time_ms: round_tenth((b.min_response_ms + b.max_response_ms) / 2.0)
                .clamp(b.min_response_ms, b.max_response_ms),
            success_rate: round_tenth(self.rng.gen_range(96.0..=99.5)),
            active_sessions: self.rng.gen_range(200..=400).min(b.max_sessions),
            compliance: compliance(compliant, non_compliant),
            risk: RiskHistogram {
                low: self.rng.gen_range(600..=900),
                medium: self.rng.gen_range(150..=300),
                high: self.rng.gen_range(20..=60),
                critical: self.rng.gen_range(0..=10),
            },
        }
    }

    fn next(&mut self, previous: &MetricsSnapshot, now: DateTime<Utc>) -> MetricsSnapshot {
        let b = self.bounds.clone();

        let allowed = self.step(b.max_allowed_step);
        let blocked = self.step(b.max_blocked_step);
        let quarantined = self.step(b.max_quarantined_step);
        let decisions = allowed.saturating_add(blocked).saturating_add(quarantined);
        // Every decision runs one to three policies.
        let evaluations = decisions.saturating_mul(self.rng.gen_range(1..=3));

        let devices = DeviceCounters {
            allowed: previous.devices.allowed.saturating_add(allowed),
            blocked: previous.devices.blocked.saturating_add(blocked),
            quarantined: previous.devices.quarantined.saturating_add(quarantined),
        };

        let compliant = self.walk_u32(
            u32::from(previous.compliance.compliant),
            u32::from(b.compliance_jitter),
            u32::from(b.compliance_floor),
            100,
        );
        let compliant = u8::try_from(compliant).unwrap_or(100);
        let non_compliant = self.walk_u32(
            u32::from(previous.compliance.non_compliant),
            u32::from(b.compliance_jitter),
            0,
            u32::from(100 - compliant),
        );
        let non_compliant = u8::try_from(non_compliant).unwrap_or(0);

        let risk = RiskHistogram {
            low: self.walk_u32(previous.risk.low, b.risk_jitter, 0, u32::MAX),
            medium: self.walk_u32(previous.risk.medium, b.risk_jitter, 0, u32::MAX),
            high: self.walk_u32(previous.risk.high, b.risk_jitter, 0, u32::MAX),
            critical: self.walk_u32(previous.risk.critical, b.risk_jitter, 0, u32::MAX),
        };

        MetricsSnapshot {
            timestamp: now,
            tick: previous.tick.saturating_add(1),
            devices,
            policies_evaluated: previous.policies_evaluated.saturating_add(evaluations),
            response_time_ms: self.walk_f64(
                previous.response_time_ms,
                b.response_jitter_ms,
                b.min_response_ms,
                b.max_response_ms,
            ),
            success_rate: self.walk_f64(
                previous.success_rate,
                b.success_jitter,
                SUCCESS_RATE_RANGE.0,
                SUCCESS_RATE_RANGE.1,
            ),
            active_sessions: self.walk_u32(
                previous.active_sessions,
                b.session_jitter,
                0,
                b.max_sessions,
            ),
            compliance: compliance(compliant, non_compliant),
            risk,
        }
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use proptest::prelude::*;

    use super::*;

    fn run(source: &mut impl MetricsSource, ticks: usize) -> Vec<MetricsSnapshot> {
        let start = Utc::now();
        let mut out = vec![source.initial(start)];
        for i in 1..=ticks {
            let now = start + Duration::seconds(i64::try_from(i).unwrap_or(i64::MAX) * 3);
            let next = source.next(out.last().unwrap(), now);
            out.push(next);
        }
        out
    }

    fn assert_well_formed(s: &MetricsSnapshot, bounds: &MetricsBounds) {
        assert!(s.success_rate >= SUCCESS_RATE_RANGE.0 && s.success_rate <= SUCCESS_RATE_RANGE.1);
        assert!(s.response_time_ms >= bounds.min_response_ms);
        assert!(s.response_time_ms <= bounds.max_response_ms);
        assert!(s.response_time_ms.is_finite());
        assert_eq!(s.compliance.total(), 100);
        assert!(s.compliance.compliant >= bounds.compliance_floor);
        assert!(s.active_sessions <= bounds.max_sessions);
    }

    #[test]
    fn same_seed_same_sequence() {
        let bounds = MetricsBounds::default();
        let now = Utc::now();
        let mut a = SyntheticMetrics::seeded(7, &bounds);
        let mut b = SyntheticMetrics::seeded(7, &bounds);
        let first_a = a.initial(now);
        let first_b = b.initial(now);
        assert_eq!(first_a, first_b);
        assert_eq!(a.next(&first_a, now), b.next(&first_b, now));
    }

    #[test]
    fn ticks_advance_and_stay_in_bounds() {
        let bounds = MetricsBounds::default();
        let mut source = SyntheticMetrics::seeded(42, &bounds);
        let series = run(&mut source, 200);
        for (i, snap) in series.iter().enumerate() {
            assert_eq!(snap.tick, u64::try_from(i).unwrap());
            assert_well_formed(snap, &bounds);
        }
    }

    #[test]
    fn compliance_breakdown_moves_by_at_most_the_jitter() {
        let bounds = MetricsBounds::default();
        let jitter = bounds.compliance_jitter;
        let mut source = SyntheticMetrics::seeded(42, &bounds);
        for pair in run(&mut source, 200).windows(2) {
            let (a, b) = (&pair[0].compliance, &pair[1].compliance);
            assert!(a.compliant.abs_diff(b.compliant) <= jitter);
            assert!(a.non_compliant.abs_diff(b.non_compliant) <= jitter);
            assert_eq!(b.total(), 100);
        }
    }

    #[test]
    fn zero_jitter_freezes_gauges() {
        let bounds = MetricsBounds {
            response_jitter_ms: 0.0,
            success_jitter: 0.0,
            compliance_jitter: 0,
            session_jitter: 0,
            risk_jitter: 0,
            max_allowed_step: 0,
            max_blocked_step: 0,
            max_quarantined_step: 0,
            ..MetricsBounds::default()
        };
        let mut source = SyntheticMetrics::seeded(1, &bounds);
        let series = run(&mut source, 10);
        let first = &series[0];
        for snap in &series[1..] {
            assert_eq!(snap.devices, first.devices);
            assert_eq!(snap.policies_evaluated, first.policies_evaluated);
            assert!((snap.success_rate - first.success_rate).abs() < f64::EPSILON);
            assert_eq!(snap.active_sessions, first.active_sessions);
            assert_eq!(snap.risk, first.risk);
            assert_eq!(snap.compliance, first.compliance);
        }
    }

    #[test]
    fn saturating_counters_do_not_overflow() {
        let bounds = MetricsBounds::default();
        let mut source = SyntheticMetrics::seeded(3, &bounds);
        let mut snap = source.initial(Utc::now());
        snap.devices.allowed = u64::MAX - 1;
        snap.policies_evaluated = u64::MAX;
        let next = source.next(&snap, Utc::now());
        assert!(next.devices.allowed >= snap.devices.allowed);
        assert_eq!(next.policies_evaluated, u64::MAX);
    }

    #[test]
    fn non_finite_previous_values_recover() {
        let bounds = MetricsBounds::default();
        let mut source = SyntheticMetrics::seeded(9, &bounds);
        let mut snap = source.initial(Utc::now());
        snap.response_time_ms = f64::NAN;
        snap.success_rate = f64::INFINITY;
        let next = source.next(&snap, Utc::now());
        assert_well_formed(&next, &bounds);
    }

    proptest! {
        #[test]
        fn cumulative_counters_never_decrease(seed in any::<u64>(), ticks in 1usize..60) {
            let bounds = MetricsBounds::default();
            let mut source = SyntheticMetrics::seeded(seed, &bounds);
            let series = run(&mut source, ticks);
            for pair in series.windows(2) {
                prop_assert!(pair[1].devices.allowed >= pair[0].devices.allowed);
                prop_assert!(pair[1].devices.blocked >= pair[0].devices.blocked);
                prop_assert!(pair[1].devices.quarantined >= pair[0].devices.quarantined);
                prop_assert!(pair[1].policies_evaluated >= pair[0].policies_evaluated);
            }
        }

        #[test]
        fn arbitrary_bounds_never_panic(
            seed in any::<u64>(),
            min in prop::num::f64::ANY,
            max in prop::num::f64::ANY,
            jitter in prop::num::f64::ANY,
            success_jitter in prop::num::f64::ANY,
            floor in any::<u8>(),
            compliance_jitter in any::<u8>(),
        ) {
            let bounds = MetricsBounds {
                min_response_ms: min,
                max_response_ms: max,
                response_jitter_ms: jitter,
                success_jitter,
                compliance_floor: floor,
                compliance_jitter,
                ..MetricsBounds::default()
            };
            let mut source = SyntheticMetrics::seeded(seed, &bounds);
            let sane = source.bounds().clone();
            for snap in run(&mut source, 5) {
                prop_assert_eq!(snap.compliance.total(), 100);
                prop_assert!(snap.response_time_ms >= sane.min_response_ms);
                prop_assert!(snap.response_time_ms <= sane.max_response_ms);
                prop_assert!(snap.success_rate >= SUCCESS_RATE_RANGE.0);
                prop_assert!(snap.success_rate <= SUCCESS_RATE_RANGE.1);
            }
        }
    }
}
