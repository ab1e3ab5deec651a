// ── Filter predicates for entity snapshots ──
//
// Each filter is a plain value: a free-text query plus independent
// categorical criteria, combined with logical AND. Filters are `Eq +
// Hash` so a (snapshot, filter) pair can key a memo cache.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::model::{
    DeploymentStatus, EntityId, EventStatus, EventType, Policy, PolicyCategory, PolicyStatus,
    PolicyType, Priority, Project, RiskLevel, Site, TimelineEvent,
};

/// A predicate over one entity type.
pub trait Filter<T> {
    fn matches(&self, item: &T) -> bool;
}

/// Keep the items matching `filter`, preserving their relative order.
pub fn apply<T, F: Filter<T> + ?Sized>(items: &[Arc<T>], filter: &F) -> Vec<Arc<T>> {
    items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

// ── Criterion ───────────────────────────────────────────────────────

/// One categorical constraint. `All` places no constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Criterion<T> {
    All,
    Only(T),
}

impl<T> Default for Criterion<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T: PartialEq> Criterion<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == value,
        }
    }
}

impl<T> Criterion<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl<T> From<Option<T>> for Criterion<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::All, Self::Only)
    }
}

impl<T: FromStr> FromStr for Criterion<T> {
    type Err = T::Err;

    /// `"all"` (any case) or an empty string yields [`Criterion::All`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl<T: fmt::Display> fmt::Display for Criterion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(value) => value.fmt(f),
        }
    }
}

// ── Free-text query ─────────────────────────────────────────────────

/// Case-insensitive substring query. Stored trimmed and lowercased;
/// an empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TextQuery(String);

impl TextQuery {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the query is empty or any field contains it.
    pub fn matches_any<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        self.is_empty()
            || fields
                .into_iter()
                .any(|field| field.to_lowercase().contains(&self.0))
    }
}

impl From<&str> for TextQuery {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

// ── Sites ───────────────────────────────────────────────────────────

/// Site list criteria. Text search covers name, site code, city,
/// region and tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SiteFilter {
    pub query: TextQuery,
    pub status: Criterion<DeploymentStatus>,
    pub priority: Criterion<Priority>,
    pub risk: Criterion<RiskLevel>,
    /// Compared case-insensitively against `location.region`.
    pub region: Criterion<String>,
}

impl SiteFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn search(mut self, query: &str) -> Self {
        self.query = TextQuery::new(query);
        self
    }

    #[must_use]
    pub fn status(mut self, status: impl Into<Criterion<DeploymentStatus>>) -> Self {
        self.status = status.into();
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: impl Into<Criterion<Priority>>) -> Self {
        self.priority = priority.into();
        self
    }

    #[must_use]
    pub fn risk(mut self, risk: impl Into<Criterion<RiskLevel>>) -> Self {
        self.risk = risk.into();
        self
    }

    #[must_use]
    pub fn region(mut self, region: impl Into<Criterion<String>>) -> Self {
        self.region = region.into();
        self
    }
}

impl Filter<Site> for SiteFilter {
    fn matches(&self, site: &Site) -> bool {
        self.status.matches(&site.status)
            && self.priority.matches(&site.priority)
            && self.risk.matches(&site.risk_level)
            && match &self.region {
                Criterion::All => true,
                Criterion::Only(region) => region.eq_ignore_ascii_case(&site.location.region),
            }
            && self.query.matches_any(
                [
                    site.name.as_str(),
                    site.site_code.as_str(),
                    site.location.city.as_str(),
                    site.location.region.as_str(),
                ]
                .into_iter()
                .chain(site.tags.iter().map(String::as_str)),
            )
    }
}

// ── Policies ────────────────────────────────────────────────────────

/// Policy list criteria. Text search covers name, description,
/// conditions and actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PolicyFilter {
    pub query: TextQuery,
    pub status: Criterion<PolicyStatus>,
    pub policy_type: Criterion<PolicyType>,
    pub category: Criterion<PolicyCategory>,
    pub priority: Criterion<Priority>,
}

impl PolicyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn search(mut self, query: &str) -> Self {
        self.query = TextQuery::new(query);
        self
    }

    #[must_use]
    pub fn status(mut self, status: impl Into<Criterion<PolicyStatus>>) -> Self {
        self.status = status.into();
        self
    }

    #[must_use]
    pub fn policy_type(mut self, policy_type: impl Into<Criterion<PolicyType>>) -> Self {
        self.policy_type = policy_type.into();
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<Criterion<PolicyCategory>>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: impl Into<Criterion<Priority>>) -> Self {
        self.priority = priority.into();
        self
    }
}

impl Filter<Policy> for PolicyFilter {
    fn matches(&self, policy: &Policy) -> bool {
        self.status.matches(&policy.status)
            && self.policy_type.matches(&policy.policy_type)
            && self.category.matches(&policy.category)
            && self.priority.matches(&policy.priority)
            && self.query.matches_any(
                [policy.name.as_str(), policy.description.as_str()]
                    .into_iter()
                    .chain(policy.conditions.iter().map(String::as_str))
                    .chain(policy.actions.iter().map(String::as_str)),
            )
    }
}

// ── Timeline ────────────────────────────────────────────────────────

/// Timeline criteria. Text search covers title, description and assignees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EventFilter {
    pub query: TextQuery,
    pub event_type: Criterion<EventType>,
    pub status: Criterion<EventStatus>,
    pub priority: Criterion<Priority>,
    /// `Only(id)` keeps events linked to that site.
    pub site: Criterion<EntityId>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn search(mut self, query: &str) -> Self {
        self.query = TextQuery::new(query);
        self
    }

    #[must_use]
    pub fn event_type(mut self, event_type: impl Into<Criterion<EventType>>) -> Self {
        self.event_type = event_type.into();
        self
    }

    #[must_use]
    pub fn status(mut self, status: impl Into<Criterion<EventStatus>>) -> Self {
        self.status = status.into();
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: impl Into<Criterion<Priority>>) -> Self {
        self.priority = priority.into();
        self
    }

    #[must_use]
    pub fn site(mut self, site: impl Into<Criterion<EntityId>>) -> Self {
        self.site = site.into();
        self
    }
}

impl Filter<TimelineEvent> for EventFilter {
    fn matches(&self, event: &TimelineEvent) -> bool {
        self.event_type.matches(&event.event_type)
            && self.status.matches(&event.status)
            && self.priority.matches(&event.priority)
            && match &self.site {
                Criterion::All => true,
                Criterion::Only(id) => event.site_id.as_ref() == Some(id),
            }
            && self.query.matches_any(
                [event.title.as_str(), event.description.as_str()]
                    .into_iter()
                    .chain(event.assignees.iter().map(String::as_str)),
            )
    }
}

// ── Projects ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProjectFilter {
    pub query: TextQuery,
    pub status: Criterion<DeploymentStatus>,
}

impl ProjectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn search(mut self, query: &str) -> Self {
        self.query = TextQuery::new(query);
        self
    }

    #[must_use]
    pub fn status(mut self, status: impl Into<Criterion<DeploymentStatus>>) -> Self {
        self.status = status.into();
        self
    }
}

impl Filter<Project> for ProjectFilter {
    fn matches(&self, project: &Project) -> bool {
        self.status.matches(&project.status)
            && self
                .query
                .matches_any([project.name.as_str(), project.description.as_str()])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::fixtures;

    fn sites() -> Vec<Arc<Site>> {
        fixtures::sites().into_iter().map(Arc::new).collect()
    }

    fn policies() -> Vec<Arc<Policy>> {
        fixtures::policies().into_iter().map(Arc::new).collect()
    }

    fn ids<T>(items: &[Arc<T>], id: impl Fn(&T) -> &EntityId) -> Vec<EntityId> {
        items.iter().map(|i| id(&**i).clone()).collect()
    }

    #[test]
    fn status_filter_selects_exact_matches() {
        let all = sites();
        let filter = SiteFilter::new().status(Criterion::Only(DeploymentStatus::Completed));
        let out = apply(&all, &filter);
        assert!(!out.is_empty());
        assert!(out.iter().all(|s| s.status == DeploymentStatus::Completed));
        let expected = all
            .iter()
            .filter(|s| s.status == DeploymentStatus::Completed)
            .count();
        assert_eq!(out.len(), expected);
    }

    #[test]
    fn empty_query_matches_everything() {
        let all = sites();
        assert_eq!(apply(&all, &SiteFilter::new().search("   ")).len(), all.len());
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let all = sites();
        let by_name = apply(&all, &SiteFilter::new().search("nyc"));
        assert!(by_name.iter().any(|s| s.name.contains("NYC")));

        // Only reachable through the "headquarters" tag.
        let by_tag = apply(&all, &SiteFilter::new().search("HEADQUARTERS"));
        assert_eq!(ids(&by_tag, |s| &s.id), vec![EntityId::from("site-nyc-hq")]);
    }

    #[test]
    fn record_matching_several_fields_appears_once() {
        // "London" is both the name prefix and the city of the UK site.
        let all = sites();
        let out = apply(&all, &SiteFilter::new().search("london"));
        let mut seen = ids(&out, |s| &s.id);
        seen.dedup();
        assert_eq!(seen.len(), out.len());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn region_filter_ignores_case() {
        let all = sites();
        let upper = apply(&all, &SiteFilter::new().region(Criterion::Only("EUROPE".into())));
        let lower = apply(&all, &SiteFilter::new().region(Criterion::Only("europe".into())));
        assert!(!upper.is_empty());
        assert_eq!(ids(&upper, |s| &s.id), ids(&lower, |s| &s.id));
    }

    #[test]
    fn policy_search_covers_conditions() {
        let all = policies();
        let out = apply(&all, &PolicyFilter::new().search("certificate"));
        assert!(!out.is_empty());
    }

    #[test]
    fn event_site_filter() {
        let events: Vec<Arc<TimelineEvent>> =
            fixtures::events().into_iter().map(Arc::new).collect();
        let site = EntityId::from("site-nyc-hq");
        let out = apply(&events, &EventFilter::new().site(Criterion::Only(site.clone())));
        assert!(!out.is_empty());
        assert!(out.iter().all(|e| e.site_id.as_ref() == Some(&site)));
    }

    #[test]
    fn criterion_parses_all() {
        let c: Criterion<PolicyStatus> = "ALL".parse().unwrap();
        assert!(c.is_all());
        let c: Criterion<PolicyStatus> = "active".parse().unwrap();
        assert_eq!(c, Criterion::Only(PolicyStatus::Active));
        assert!("bogus".parse::<Criterion<PolicyStatus>>().is_err());
        assert_eq!(Criterion::Only(DeploymentStatus::OnHold).to_string(), "on-hold");
    }

    // ── Properties ──────────────────────────────────────────────────

    fn any_site_filter() -> impl Strategy<Value = SiteFilter> {
        let statuses: Vec<DeploymentStatus> = DeploymentStatus::iter().collect();
        let priorities: Vec<Priority> = Priority::iter().collect();
        let risks: Vec<RiskLevel> = RiskLevel::iter().collect();
        (
            prop::sample::select(vec!["", "nyc", "o", "campus", "pci", "zz"]),
            prop::option::of(prop::sample::select(statuses)),
            prop::option::of(prop::sample::select(priorities)),
            prop::option::of(prop::sample::select(risks)),
            prop::option::of(prop::sample::select(vec![
                "Europe".to_owned(),
                "north america".to_owned(),
                "APAC".to_owned(),
            ])),
        )
            .prop_map(|(q, status, priority, risk, region)| {
                SiteFilter::new()
                    .search(q)
                    .status(status)
                    .priority(priority)
                    .risk(risk)
                    .region(region)
            })
    }

    proptest! {
        #[test]
        fn filtering_is_idempotent(filter in any_site_filter()) {
            let once = apply(&sites(), &filter);
            let twice = apply(&once, &filter);
            prop_assert_eq!(ids(&once, |s| &s.id), ids(&twice, |s| &s.id));
        }

        #[test]
        fn adding_a_constraint_never_grows_the_result(
            filter in any_site_filter(),
            risk in prop::sample::select(RiskLevel::iter().collect::<Vec<_>>()),
        ) {
            prop_assume!(filter.risk.is_all());
            let all = sites();
            let base = apply(&all, &filter);
            let tightened = apply(&all, &filter.clone().risk(Criterion::Only(risk)));
            prop_assert!(tightened.len() <= base.len());
            let base_ids = ids(&base, |s| &s.id);
            prop_assert!(ids(&tightened, |s| &s.id).iter().all(|id| base_ids.contains(id)));
        }

        #[test]
        fn explicit_all_equals_omitted_dimension(filter in any_site_filter()) {
            let all = sites();
            let cases = [
                (
                    SiteFilter { status: Criterion::default(), ..filter.clone() },
                    SiteFilter { status: "all".parse().unwrap(), ..filter.clone() },
                ),
                (
                    SiteFilter { priority: Criterion::default(), ..filter.clone() },
                    SiteFilter { priority: "All".parse().unwrap(), ..filter.clone() },
                ),
                (
                    SiteFilter { risk: Criterion::default(), ..filter.clone() },
                    SiteFilter { risk: "ALL".parse().unwrap(), ..filter.clone() },
                ),
                (
                    SiteFilter { region: Criterion::default(), ..filter.clone() },
                    SiteFilter { region: "all".parse().unwrap(), ..filter.clone() },
                ),
            ];
            for (omitted, explicit) in &cases {
                prop_assert_eq!(
                    ids(&apply(&all, omitted), |s| &s.id),
                    ids(&apply(&all, explicit), |s| &s.id)
                );
            }
        }

        #[test]
        fn output_preserves_relative_order(filter in any_site_filter()) {
            let all = sites();
            let all_ids = ids(&all, |s| &s.id);
            let positions: Vec<usize> = apply(&all, &filter)
                .iter()
                .map(|s| all_ids.iter().position(|id| id == &s.id).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn all_equals_omitting_the_dimension() {
        let all = sites();
        for status in DeploymentStatus::iter() {
            let base = SiteFilter::new().status(Criterion::Only(status));
            let with_all_priority = base.clone().priority(Criterion::All);
            assert_eq!(
                ids(&apply(&all, &base), |s| &s.id),
                ids(&apply(&all, &with_all_priority), |s| &s.id)
            );
        }
    }
}
