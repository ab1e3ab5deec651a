// ── Aggregation layer ──
//
// Summary statistics over (possibly filtered) snapshots for the
// dashboard cards. Everything here is infallible: empty collections
// produce zeros, never NaN, and missing numbers count as 0.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::model::{
    DeploymentStatus, EntityId, EventStatus, EventType, Policy, PolicyStatus, PolicyType,
    Priority, Project, RiskLevel, Site, TimelineEvent,
};
use crate::store::DataStore;

/// Most upcoming milestones listed in a timeline summary.
const UPCOMING_MILESTONES: usize = 5;

// ── Primitives ───────────────────────────────────────────────────────

/// `part / total` as a whole percentage, rounded half up. 0 when `total` is 0.
pub fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let scaled = part.saturating_mul(200).saturating_add(total) / total.saturating_mul(2);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Mean of whole numbers, rounded half up. 0 for an empty input.
pub fn rounded_mean(values: impl IntoIterator<Item = u32>) -> u32 {
    let (sum, count) = values
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), v| (sum + u64::from(v), count + 1));
    if count == 0 {
        return 0;
    }
    u32::try_from((sum * 2 + count) / (count * 2)).unwrap_or(u32::MAX)
}

/// Count items per key, keys in first-seen order.
pub fn count_by<T, K: Eq + Hash>(items: &[Arc<T>], key: impl Fn(&T) -> K) -> IndexMap<K, usize> {
    let mut counts = IndexMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

/// Count items per enum variant. Every variant is present (zeros
/// included) in declaration order, so the counts sum to `items.len()`.
pub fn breakdown<T, E>(items: &[Arc<T>], key: impl Fn(&T) -> E) -> IndexMap<E, usize>
where
    E: IntoEnumIterator + Eq + Hash,
{
    let mut counts: IndexMap<E, usize> = E::iter().map(|variant| (variant, 0)).collect();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

/// Sum of a numeric field. `None` and non-finite values count as 0.
pub fn sum_by<T>(items: &[Arc<T>], value: impl Fn(&T) -> Option<f64>) -> f64 {
    items
        .iter()
        .filter_map(|item| value(item))
        .filter(|v| v.is_finite())
        .sum()
}

/// Mean of a numeric field over every item, missing values as 0.
/// 0.0 for an empty collection.
pub fn mean_by<T>(items: &[Arc<T>], value: impl Fn(&T) -> Option<f64>) -> f64 {
    let Some(count) = u32::try_from(items.len()).ok().filter(|c| *c > 0) else {
        return 0.0;
    };
    sum_by(items, value) / f64::from(count)
}

// ── Sites ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkTotals {
    pub switches: u64,
    pub access_points: u64,
    pub firewalls: u64,
    pub vlans: u64,
    pub ad_integration_sites: usize,
    pub certificate_auth_sites: usize,
    pub guest_network_sites: usize,
    pub byod_sites: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteSummary {
    pub total: usize,
    pub by_status: IndexMap<DeploymentStatus, usize>,
    pub by_priority: IndexMap<Priority, usize>,
    pub by_risk: IndexMap<RiskLevel, usize>,
    pub by_region: IndexMap<String, usize>,
    pub completed: usize,
    /// Completed sites as a percentage of all sites.
    pub completion_percent: u32,
    /// Mean rollout progress across sites.
    pub average_progress: u32,
    /// Sites with high or critical risk.
    pub at_risk: usize,
    pub budget_by_currency: IndexMap<String, f64>,
    pub network: NetworkTotals,
}

impl SiteSummary {
    pub fn from_sites(sites: &[Arc<Site>]) -> Self {
        let completed = sites.iter().filter(|s| s.status.is_completed()).count();

        let mut budget_by_currency: IndexMap<String, f64> = IndexMap::new();
        for budget in sites.iter().filter_map(|s| s.budget.as_ref()) {
            let amount = budget.amount.filter(|a| a.is_finite()).unwrap_or(0.0);
            *budget_by_currency.entry(budget.currency.clone()).or_insert(0.0) += amount;
        }

        let mut network = NetworkTotals::default();
        for profile in sites.iter().map(|s| &s.network) {
            network.switches += u64::from(profile.switches);
            network.access_points += u64::from(profile.access_points);
            network.firewalls += u64::from(profile.firewalls);
            network.vlans += u64::from(profile.vlans);
            network.ad_integration_sites += usize::from(profile.ad_integration);
            network.certificate_auth_sites += usize::from(profile.certificate_auth);
            network.guest_network_sites += usize::from(profile.guest_network);
            network.byod_sites += usize::from(profile.byod);
        }

        Self {
            total: sites.len(),
            by_status: breakdown(sites, |s| s.status),
            by_priority: breakdown(sites, |s| s.priority),
            by_risk: breakdown(sites, |s| s.risk_level),
            by_region: count_by(sites, |s| s.location.region.clone()),
            completed,
            completion_percent: percentage(completed, sites.len()),
            average_progress: rounded_mean(sites.iter().map(|s| u32::from(s.progress))),
            at_risk: sites.iter().filter(|s| s.risk_level.is_elevated()).count(),
            budget_by_currency,
            network,
        }
    }
}

// ── Policies ─────────────────────────────────────────────────────────

/// Which policies count towards the average effectiveness.
///
/// Drafts have never been enforced and always report 0, so including
/// them drags the average down; `Active` is the default.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum EffectivenessScope {
    /// Only policies currently active.
    #[default]
    Active,
    /// Every policy that has left draft (active, inactive, deprecated).
    Launched,
    /// Every policy, drafts included.
    All,
}

impl EffectivenessScope {
    pub fn includes(self, status: PolicyStatus) -> bool {
        match self {
            Self::Active => status.is_active(),
            Self::Launched => status.is_launched(),
            Self::All => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicySummary {
    pub total: usize,
    pub by_status: IndexMap<PolicyStatus, usize>,
    pub by_type: IndexMap<PolicyType, usize>,
    pub active: usize,
    pub total_violations: u64,
    pub average_effectiveness: u32,
    pub effectiveness_scope: EffectivenessScope,
    /// Policies that contributed to `average_effectiveness`.
    pub scored: usize,
}

impl PolicySummary {
    pub fn from_policies(policies: &[Arc<Policy>], scope: EffectivenessScope) -> Self {
        let scored: Vec<u32> = policies
            .iter()
            .filter(|p| scope.includes(p.status))
            .map(|p| u32::from(p.effectiveness))
            .collect();

        Self {
            total: policies.len(),
            by_status: breakdown(policies, |p| p.status),
            by_type: breakdown(policies, |p| p.policy_type),
            active: policies.iter().filter(|p| p.status.is_active()).count(),
            total_violations: policies.iter().map(|p| u64::from(p.violations)).sum(),
            average_effectiveness: rounded_mean(scored.iter().copied()),
            effectiveness_scope: scope,
            scored: scored.len(),
        }
    }
}

// ── Timeline ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneDigest {
    pub id: EntityId,
    pub title: String,
    pub start: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSummary {
    pub total: usize,
    pub by_status: IndexMap<EventStatus, usize>,
    pub by_type: IndexMap<EventType, usize>,
    pub completed_percent: u32,
    pub average_progress: u32,
    /// Past their end date and neither completed nor cancelled.
    pub overdue: usize,
    pub upcoming_milestones: Vec<MilestoneDigest>,
}

impl TimelineSummary {
    pub fn from_events(events: &[Arc<TimelineEvent>], now: DateTime<Utc>) -> Self {
        let completed = events
            .iter()
            .filter(|e| e.status == EventStatus::Completed)
            .count();

        let mut upcoming: Vec<MilestoneDigest> = events
            .iter()
            .filter(|e| {
                e.event_type == EventType::Milestone && e.start >= now && !e.status.is_closed()
            })
            .map(|e| MilestoneDigest {
                id: e.id.clone(),
                title: e.title.clone(),
                start: e.start,
            })
            .collect();
        upcoming.sort_by_key(|m| m.start);
        upcoming.truncate(UPCOMING_MILESTONES);

        Self {
            total: events.len(),
            by_status: breakdown(events, |e| e.status),
            by_type: breakdown(events, |e| e.event_type),
            completed_percent: percentage(completed, events.len()),
            average_progress: rounded_mean(events.iter().map(|e| u32::from(e.progress))),
            overdue: events.iter().filter(|e| e.is_overdue(now)).count(),
            upcoming_milestones: upcoming,
        }
    }
}

// ── Projects ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub total: usize,
    pub by_status: IndexMap<DeploymentStatus, usize>,
    pub average_progress: u32,
    /// Distinct sites covered by at least one project.
    pub sites_covered: usize,
    pub budget_by_currency: IndexMap<String, f64>,
}

impl ProjectSummary {
    pub fn from_projects(projects: &[Arc<Project>]) -> Self {
        let covered: HashSet<&EntityId> = projects.iter().flat_map(|p| &p.site_ids).collect();

        let mut budget_by_currency: IndexMap<String, f64> = IndexMap::new();
        for budget in projects.iter().filter_map(|p| p.budget.as_ref()) {
            let amount = budget.amount.filter(|a| a.is_finite()).unwrap_or(0.0);
            *budget_by_currency.entry(budget.currency.clone()).or_insert(0.0) += amount;
        }

        Self {
            total: projects.len(),
            by_status: breakdown(projects, |p| p.status),
            average_progress: rounded_mean(projects.iter().map(|p| u32::from(p.progress))),
            sites_covered: covered.len(),
            budget_by_currency,
        }
    }
}

// ── Whole dashboard ──────────────────────────────────────────────────

/// Every card on the overview page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub sites: SiteSummary,
    pub policies: PolicySummary,
    pub timeline: TimelineSummary,
    pub projects: ProjectSummary,
    pub generated_at: DateTime<Utc>,
}

impl DashboardSummary {
    pub fn compute(store: &DataStore, scope: EffectivenessScope, now: DateTime<Utc>) -> Self {
        Self {
            sites: SiteSummary::from_sites(&store.sites_snapshot()),
            policies: PolicySummary::from_policies(&store.policies_snapshot(), scope),
            timeline: TimelineSummary::from_events(&store.events_snapshot(), now),
            projects: ProjectSummary::from_projects(&store.projects_snapshot()),
            generated_at: now,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;
    use crate::fixtures;
    use crate::model::Budget;

    fn sites() -> Vec<Arc<Site>> {
        fixtures::sites().into_iter().map(Arc::new).collect()
    }

    fn policy(status: PolicyStatus, effectiveness: u8) -> Arc<Policy> {
        let mut p = fixtures::policies().remove(0);
        p.status = status;
        p.effectiveness = effectiveness;
        Arc::new(p)
    }

    #[test]
    fn percentage_guards_zero_total() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(5, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(4, 4), 100);
    }

    #[test]
    fn rounded_mean_of_nothing_is_zero() {
        assert_eq!(rounded_mean(std::iter::empty()), 0);
        assert_eq!(rounded_mean([94]), 94);
        assert_eq!(rounded_mean([1, 2]), 2);
    }

    #[test]
    fn empty_site_collection_reports_zero_percent() {
        let summary = SiteSummary::from_sites(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.completion_percent, 0);
        assert_eq!(summary.average_progress, 0);
        assert_eq!(format!("{}%", summary.completion_percent), "0%");
        assert!(summary.by_status.values().all(|c| *c == 0));
    }

    #[test]
    fn mean_and_sum_treat_missing_as_zero() {
        let mut a = fixtures::sites().remove(0);
        a.budget = Some(Budget::new(100.0, "USD"));
        let mut b = a.clone();
        b.budget = Some(Budget {
            amount: None,
            currency: "USD".into(),
        });
        let mut c = a.clone();
        c.budget = None;
        let items = vec![Arc::new(a), Arc::new(b), Arc::new(c)];

        let amount = |s: &Site| s.budget.as_ref().and_then(|b| b.amount);
        assert!((sum_by(&items, amount) - 100.0).abs() < f64::EPSILON);
        assert!((mean_by(&items, amount) - 100.0 / 3.0).abs() < 1e-9);
        assert!(mean_by::<Site>(&[], amount).abs() < f64::EPSILON);

        let summary = SiteSummary::from_sites(&items);
        assert!((summary.budget_by_currency["USD"] - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn average_effectiveness_excludes_drafts_by_default() {
        let policies = vec![
            policy(PolicyStatus::Active, 94),
            policy(PolicyStatus::Draft, 0),
        ];
        let summary = PolicySummary::from_policies(&policies, EffectivenessScope::default());
        assert_eq!(summary.average_effectiveness, 94);
        assert_eq!(summary.scored, 1);

        let blanket = PolicySummary::from_policies(&policies, EffectivenessScope::All);
        assert_eq!(blanket.average_effectiveness, 47);
    }

    #[test]
    fn launched_scope_includes_inactive() {
        let policies = vec![
            policy(PolicyStatus::Active, 90),
            policy(PolicyStatus::Inactive, 70),
            policy(PolicyStatus::Draft, 0),
        ];
        let summary = PolicySummary::from_policies(&policies, EffectivenessScope::Launched);
        assert_eq!(summary.average_effectiveness, 80);
        assert_eq!(summary.scored, 2);
    }

    #[test]
    fn no_active_policies_average_is_zero() {
        let policies = vec![policy(PolicyStatus::Draft, 0)];
        let summary = PolicySummary::from_policies(&policies, EffectivenessScope::Active);
        assert_eq!(summary.average_effectiveness, 0);
        assert_eq!(summary.scored, 0);
    }

    #[test]
    fn timeline_overdue_and_upcoming() {
        let events: Vec<Arc<TimelineEvent>> =
            fixtures::events().into_iter().map(Arc::new).collect();
        let now = Utc.with_ymd_and_hms(2026, 2, 15, 0, 0, 0).unwrap();
        let summary = TimelineSummary::from_events(&events, now);

        let expected_overdue = events.iter().filter(|e| e.is_overdue(now)).count();
        assert_eq!(summary.overdue, expected_overdue);
        assert!(summary.upcoming_milestones.len() <= UPCOMING_MILESTONES);
        assert!(
            summary
                .upcoming_milestones
                .windows(2)
                .all(|w| w[0].start <= w[1].start)
        );
        assert!(summary.upcoming_milestones.iter().all(|m| m.start >= now));
    }

    #[test]
    fn dashboard_summary_from_fixtures() {
        let store = DataStore::new();
        store.apply_snapshot(fixtures::snapshot());
        let now = Utc.with_ymd_and_hms(2026, 2, 15, 0, 0, 0).unwrap();
        let summary = DashboardSummary::compute(&store, EffectivenessScope::Active, now);

        assert_eq!(summary.sites.total, store.site_count());
        assert_eq!(summary.policies.total, store.policy_count());
        assert_eq!(summary.timeline.total, store.event_count());
        assert_eq!(summary.projects.total, store.project_count());
        assert!(summary.projects.sites_covered <= store.site_count());
    }

    proptest! {
        #[test]
        fn status_counts_sum_to_total(
            statuses in prop::collection::vec(
                prop::sample::select(DeploymentStatus::iter().collect::<Vec<_>>()),
                0..40,
            )
        ) {
            let template = sites().remove(0);
            let items: Vec<Arc<Site>> = statuses
                .iter()
                .map(|status| {
                    let mut site = Site::clone(&template);
                    site.status = *status;
                    Arc::new(site)
                })
                .collect();

            let summary = SiteSummary::from_sites(&items);
            prop_assert_eq!(summary.by_status.values().sum::<usize>(), items.len());
            prop_assert_eq!(summary.by_priority.values().sum::<usize>(), items.len());
            prop_assert_eq!(summary.by_region.values().sum::<usize>(), items.len());
            prop_assert!(summary.completion_percent <= 100);
        }

        #[test]
        fn percentage_never_exceeds_100_for_subsets(part in 0usize..10_000, total in 0usize..10_000) {
            prop_assume!(part <= total);
            prop_assert!(percentage(part, total) <= 100);
        }
    }
}
