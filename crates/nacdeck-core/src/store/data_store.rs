// ── Central reactive data store ──
//
// Owns every dashboard collection. All writes are validated here:
// required fields, 0–100 ranges, and references between entities.
// Mutations are broadcast to subscribers via `watch` channels.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::collection::EntityCollection;
use crate::command::{
    CreatePolicyRequest, CreateProjectRequest, CreateSiteRequest, CreateTimelineEventRequest,
    UpdatePolicyRequest, UpdateProjectRequest, UpdateSiteRequest, UpdateTimelineEventRequest,
};
use crate::error::CoreError;
use crate::model::{EntityId, Policy, Project, Site, TimelineEvent};
use crate::stream::EntityStream;

/// Central reactive store for all dashboard entities.
///
/// Owned by a single [`Dashboard`](crate::Dashboard); two dashboards never
/// share a store.
pub struct DataStore {
    pub(crate) sites: EntityCollection<Site>,
    pub(crate) policies: EntityCollection<Policy>,
    pub(crate) events: EntityCollection<TimelineEvent>,
    pub(crate) projects: EntityCollection<Project>,
    pub(crate) last_loaded: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (last_loaded, _) = watch::channel(None);

        Self {
            sites: EntityCollection::new(),
            policies: EntityCollection::new(),
            events: EntityCollection::new(),
            projects: EntityCollection::new(),
            last_loaded,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn sites_snapshot(&self) -> Arc<Vec<Arc<Site>>> {
        self.sites.snapshot()
    }

    pub fn policies_snapshot(&self) -> Arc<Vec<Arc<Policy>>> {
        self.policies.snapshot()
    }

    pub fn events_snapshot(&self) -> Arc<Vec<Arc<TimelineEvent>>> {
        self.events.snapshot()
    }

    pub fn projects_snapshot(&self) -> Arc<Vec<Arc<Project>>> {
        self.projects.snapshot()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn site(&self, id: &EntityId) -> Option<Arc<Site>> {
        self.sites.get(id)
    }

    pub fn policy(&self, id: &EntityId) -> Option<Arc<Policy>> {
        self.policies.get(id)
    }

    pub fn event(&self, id: &EntityId) -> Option<Arc<TimelineEvent>> {
        self.events.get(id)
    }

    pub fn project(&self, id: &EntityId) -> Option<Arc<Project>> {
        self.projects.get(id)
    }

    /// Find a site by id or (case-insensitive) site code.
    pub fn find_site(&self, identifier: &str) -> Option<Arc<Site>> {
        self.sites.get(&EntityId::from(identifier)).or_else(|| {
            self.sites
                .snapshot()
                .iter()
                .find(|s| s.site_code.eq_ignore_ascii_case(identifier))
                .cloned()
        })
    }

    // ── Count accessors ──────────────────────────────────────────────

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    pub fn policy_count(&self) -> usize {
        self.policies.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
            && self.policies.is_empty()
            && self.events.is_empty()
            && self.projects.is_empty()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_sites(&self) -> EntityStream<Site> {
        EntityStream::new(self.sites.subscribe())
    }

    pub fn subscribe_policies(&self) -> EntityStream<Policy> {
        EntityStream::new(self.policies.subscribe())
    }

    pub fn subscribe_events(&self) -> EntityStream<TimelineEvent> {
        EntityStream::new(self.events.subscribe())
    }

    pub fn subscribe_projects(&self) -> EntityStream<Project> {
        EntityStream::new(self.projects.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_loaded(&self) -> Option<DateTime<Utc>> {
        *self.last_loaded.borrow()
    }

    // ── Sites ────────────────────────────────────────────────────────

    pub fn create_site(&self, req: CreateSiteRequest) -> Result<Arc<Site>, CoreError> {
        let site = Site {
            id: EntityId::generate(),
            name: req.name.trim().to_owned(),
            site_code: req.site_code.trim().to_owned(),
            location: req.location,
            status: req.status,
            priority: req.priority,
            progress: 0,
            risk_level: req.risk_level,
            network: req.network,
            budget: req.budget,
            tags: req.tags,
            stakeholders: req.stakeholders,
            compliance_frameworks: req.compliance_frameworks,
            go_live: req.go_live,
        };
        validate_site(&site)?;
        self.ensure_unique_site_code(&site.site_code, None)?;

        debug!(id = %site.id, name = %site.name, "site created");
        Ok(self.put_site(site))
    }

    pub fn update_site(
        &self,
        id: &EntityId,
        update: UpdateSiteRequest,
    ) -> Result<Arc<Site>, CoreError> {
        let current = self
            .sites
            .get(id)
            .ok_or_else(|| CoreError::not_found("site", id))?;
        let mut site = Site::clone(&current);

        if let Some(name) = update.name {
            site.name = name.trim().to_owned();
        }
        if let Some(code) = update.site_code {
            site.site_code = code.trim().to_owned();
        }
        if let Some(status) = update.status {
            site.status = status;
        }
        if let Some(priority) = update.priority {
            site.priority = priority;
        }
        if let Some(progress) = update.progress {
            site.progress = progress;
        }
        if let Some(risk) = update.risk_level {
            site.risk_level = risk;
        }
        if let Some(network) = update.network {
            site.network = network;
        }
        if let Some(budget) = update.budget {
            site.budget = Some(budget);
        }
        if let Some(tags) = update.tags {
            site.tags = tags;
        }
        if let Some(go_live) = update.go_live {
            site.go_live = Some(go_live);
        }
        validate_site(&site)?;
        self.ensure_unique_site_code(&site.site_code, Some(id))?;

        Ok(self.put_site(site))
    }

    /// Remove a site and detach it from every policy, event and project
    /// that referenced it.
    pub fn delete_site(&self, id: &EntityId) -> Result<Arc<Site>, CoreError> {
        let removed = self
            .sites
            .remove(id)
            .ok_or_else(|| CoreError::not_found("site", id))?;

        let mut detached = 0usize;
        for policy in self.policies.snapshot().iter() {
            if policy.applied_sites.contains(id) {
                self.policies
                    .modify(&policy.id, |p| p.applied_sites.retain(|s| s != id));
                detached += 1;
            }
        }
        for event in self.events.snapshot().iter() {
            if event.site_id.as_ref() == Some(id) {
                self.events.modify(&event.id, |e| e.site_id = None);
                detached += 1;
            }
        }
        for project in self.projects.snapshot().iter() {
            if project.site_ids.contains(id) {
                self.projects
                    .modify(&project.id, |p| p.site_ids.retain(|s| s != id));
                detached += 1;
            }
        }
        if detached > 0 {
            warn!(site = %id, detached, "deleted site was still referenced; references removed");
        }

        Ok(removed)
    }

    // ── Policies ─────────────────────────────────────────────────────

    pub fn create_policy(&self, req: CreatePolicyRequest) -> Result<Arc<Policy>, CoreError> {
        let policy = Policy {
            id: EntityId::generate(),
            name: req.name.trim().to_owned(),
            description: req.description,
            policy_type: req.policy_type,
            category: req.category,
            status: req.status,
            priority: req.priority,
            conditions: req.conditions,
            actions: req.actions,
            effectiveness: 0,
            violations: 0,
            applied_sites: dedup(req.applied_sites),
            last_modified: Utc::now(),
        };
        validate_policy(&policy)?;
        self.ensure_sites_exist(&format!("policy '{}'", policy.name), &policy.applied_sites)?;

        debug!(id = %policy.id, name = %policy.name, "policy created");
        Ok(self.put_policy(policy))
    }

    pub fn update_policy(
        &self,
        id: &EntityId,
        update: UpdatePolicyRequest,
    ) -> Result<Arc<Policy>, CoreError> {
        let current = self
            .policies
            .get(id)
            .ok_or_else(|| CoreError::not_found("policy", id))?;
        let mut policy = Policy::clone(&current);

        if let Some(name) = update.name {
            policy.name = name.trim().to_owned();
        }
        if let Some(description) = update.description {
            policy.description = description;
        }
        if let Some(status) = update.status {
            policy.status = status;
        }
        if let Some(priority) = update.priority {
            policy.priority = priority;
        }
        if let Some(conditions) = update.conditions {
            policy.conditions = conditions;
        }
        if let Some(actions) = update.actions {
            policy.actions = actions;
        }
        if let Some(effectiveness) = update.effectiveness {
            policy.effectiveness = effectiveness;
        }
        if let Some(violations) = update.violations {
            policy.violations = violations;
        }
        if let Some(sites) = update.applied_sites {
            policy.applied_sites = dedup(sites);
        }
        policy.last_modified = Utc::now();
        validate_policy(&policy)?;
        self.ensure_sites_exist(&format!("policy '{}'", policy.name), &policy.applied_sites)?;

        Ok(self.put_policy(policy))
    }

    pub fn delete_policy(&self, id: &EntityId) -> Result<Arc<Policy>, CoreError> {
        self.policies
            .remove(id)
            .ok_or_else(|| CoreError::not_found("policy", id))
    }

    // ── Timeline ─────────────────────────────────────────────────────

    pub fn create_event(
        &self,
        req: CreateTimelineEventRequest,
    ) -> Result<Arc<TimelineEvent>, CoreError> {
        let event = TimelineEvent {
            id: EntityId::generate(),
            title: req.title.trim().to_owned(),
            description: req.description,
            event_type: req.event_type,
            status: req.status,
            priority: req.priority,
            start: req.start,
            end: req.end,
            assignees: req.assignees,
            site_id: req.site_id,
            dependencies: dedup(req.dependencies),
            progress: 0,
        };
        validate_event(&event)?;
        self.ensure_event_references(&event)?;

        debug!(id = %event.id, title = %event.title, "timeline event created");
        Ok(self.put_event(event))
    }

    pub fn update_event(
        &self,
        id: &EntityId,
        update: UpdateTimelineEventRequest,
    ) -> Result<Arc<TimelineEvent>, CoreError> {
        let current = self
            .events
            .get(id)
            .ok_or_else(|| CoreError::not_found("timeline event", id))?;
        let mut event = TimelineEvent::clone(&current);

        if let Some(title) = update.title {
            event.title = title.trim().to_owned();
        }
        if let Some(status) = update.status {
            event.status = status;
        }
        if let Some(priority) = update.priority {
            event.priority = priority;
        }
        if let Some(start) = update.start {
            event.start = start;
        }
        if let Some(end) = update.end {
            event.end = end;
        }
        if let Some(progress) = update.progress {
            event.progress = progress;
        }
        if let Some(assignees) = update.assignees {
            event.assignees = assignees;
        }
        if let Some(site_id) = update.site_id {
            event.site_id = site_id;
        }
        if let Some(dependencies) = update.dependencies {
            event.dependencies = dedup(dependencies);
        }
        validate_event(&event)?;
        self.ensure_event_references(&event)?;

        Ok(self.put_event(event))
    }

    /// Remove an event and drop it from other events' dependency lists.
    pub fn delete_event(&self, id: &EntityId) -> Result<Arc<TimelineEvent>, CoreError> {
        let removed = self
            .events
            .remove(id)
            .ok_or_else(|| CoreError::not_found("timeline event", id))?;

        for event in self.events.snapshot().iter() {
            if event.dependencies.contains(id) {
                warn!(event = %event.id, dependency = %id, "dropping dependency on deleted event");
                self.events
                    .modify(&event.id, |e| e.dependencies.retain(|d| d != id));
            }
        }

        Ok(removed)
    }

    // ── Projects ─────────────────────────────────────────────────────

    pub fn create_project(&self, req: CreateProjectRequest) -> Result<Arc<Project>, CoreError> {
        let project = Project {
            id: EntityId::generate(),
            name: req.name.trim().to_owned(),
            description: req.description,
            status: req.status,
            progress: 0,
            site_ids: dedup(req.site_ids),
            start: req.start,
            target_end: req.target_end,
            budget: req.budget,
        };
        validate_project(&project)?;
        self.ensure_sites_exist(&format!("project '{}'", project.name), &project.site_ids)?;

        debug!(id = %project.id, name = %project.name, "project created");
        Ok(self.put_project(project))
    }

    pub fn update_project(
        &self,
        id: &EntityId,
        update: UpdateProjectRequest,
    ) -> Result<Arc<Project>, CoreError> {
        let current = self
            .projects
            .get(id)
            .ok_or_else(|| CoreError::not_found("project", id))?;
        let mut project = Project::clone(&current);

        if let Some(name) = update.name {
            project.name = name.trim().to_owned();
        }
        if let Some(status) = update.status {
            project.status = status;
        }
        if let Some(progress) = update.progress {
            project.progress = progress;
        }
        if let Some(site_ids) = update.site_ids {
            project.site_ids = dedup(site_ids);
        }
        if let Some(target_end) = update.target_end {
            project.target_end = target_end;
        }
        validate_project(&project)?;
        self.ensure_sites_exist(&format!("project '{}'", project.name), &project.site_ids)?;

        Ok(self.put_project(project))
    }

    pub fn delete_project(&self, id: &EntityId) -> Result<Arc<Project>, CoreError> {
        self.projects
            .remove(id)
            .ok_or_else(|| CoreError::not_found("project", id))
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn put_site(&self, site: Site) -> Arc<Site> {
        let site = Arc::new(site);
        self.sites.upsert(site.id.clone(), Arc::clone(&site));
        site
    }

    fn put_policy(&self, policy: Policy) -> Arc<Policy> {
        let policy = Arc::new(policy);
        self.policies.upsert(policy.id.clone(), Arc::clone(&policy));
        policy
    }

    fn put_event(&self, event: TimelineEvent) -> Arc<TimelineEvent> {
        let event = Arc::new(event);
        self.events.upsert(event.id.clone(), Arc::clone(&event));
        event
    }

    fn put_project(&self, project: Project) -> Arc<Project> {
        let project = Arc::new(project);
        self.projects.upsert(project.id.clone(), Arc::clone(&project));
        project
    }

    fn ensure_unique_site_code(
        &self,
        code: &str,
        except: Option<&EntityId>,
    ) -> Result<(), CoreError> {
        let taken = self
            .sites
            .snapshot()
            .iter()
            .any(|s| Some(&s.id) != except && s.site_code.eq_ignore_ascii_case(code));
        if taken {
            return Err(CoreError::AlreadyExists {
                entity_type: "site code",
                identifier: code.to_owned(),
            });
        }
        Ok(())
    }

    fn ensure_sites_exist(&self, from: &str, ids: &[EntityId]) -> Result<(), CoreError> {
        match ids.iter().find(|id| !self.sites.contains(id)) {
            Some(missing) => Err(CoreError::DanglingReference {
                from: from.to_owned(),
                target_type: "site",
                target: missing.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn ensure_event_references(&self, event: &TimelineEvent) -> Result<(), CoreError> {
        let from = format!("event '{}'", event.title);
        if let Some(site_id) = &event.site_id {
            self.ensure_sites_exist(&from, std::slice::from_ref(site_id))?;
        }
        for dep in &event.dependencies {
            if dep == &event.id {
                return Err(CoreError::DependencyCycle {
                    event: event.id.to_string(),
                    dependency: dep.to_string(),
                });
            }
            if !self.events.contains(dep) {
                return Err(CoreError::DanglingReference {
                    from: from.clone(),
                    target_type: "timeline event",
                    target: dep.to_string(),
                });
            }
        }
        if let Some(dependency) = self.find_cycle(&event.id, &event.dependencies) {
            return Err(CoreError::DependencyCycle {
                event: event.id.to_string(),
                dependency: dependency.to_string(),
            });
        }
        Ok(())
    }

    /// Walk the dependency graph from each proposed dependency; reaching
    /// `event_id` again means the new edge would close a cycle.
    fn find_cycle(&self, event_id: &EntityId, deps: &[EntityId]) -> Option<EntityId> {
        let events = self.events.snapshot();
        let graph: HashMap<&EntityId, &[EntityId]> = events
            .iter()
            .map(|e| (&e.id, e.dependencies.as_slice()))
            .collect();

        deps.iter()
            .find(|dep| depends_on(dep, event_id, |id| graph.get(id).copied()))
            .cloned()
    }
}

/// True if `target` is reachable from `from` along dependency edges
/// (including `from == target`).
pub(super) fn depends_on<'a>(
    from: &'a EntityId,
    target: &EntityId,
    edges: impl Fn(&EntityId) -> Option<&'a [EntityId]>,
) -> bool {
    let mut stack = vec![from];
    let mut seen = HashSet::new();
    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        if let Some(next) = edges(current) {
            stack.extend(next.iter());
        }
    }
    false
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Validation ───────────────────────────────────────────────────────

fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, "is required"));
    }
    Ok(())
}

fn require_percent(field: &str, value: u8) -> Result<(), CoreError> {
    if value > 100 {
        return Err(CoreError::validation(
            field,
            format!("must be between 0 and 100, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_site(site: &Site) -> Result<(), CoreError> {
    require_text("name", &site.name)?;
    require_text("site_code", &site.site_code)?;
    require_text("location.city", &site.location.city)?;
    require_text("location.country", &site.location.country)?;
    require_percent("progress", site.progress)
}

pub(crate) fn validate_policy(policy: &Policy) -> Result<(), CoreError> {
    require_text("name", &policy.name)?;
    require_percent("effectiveness", policy.effectiveness)
}

pub(crate) fn validate_event(event: &TimelineEvent) -> Result<(), CoreError> {
    require_text("title", &event.title)?;
    require_percent("progress", event.progress)?;
    if event.end < event.start {
        return Err(CoreError::validation("end", "must not be before start"));
    }
    Ok(())
}

pub(crate) fn validate_project(project: &Project) -> Result<(), CoreError> {
    require_text("name", &project.name)?;
    require_percent("progress", project.progress)?;
    if project.target_end < project.start {
        return Err(CoreError::validation("target_end", "must not be before start"));
    }
    Ok(())
}

/// Drop repeated ids, keeping first occurrences in order.
fn dedup(ids: Vec<EntityId>) -> Vec<EntityId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, NaiveDate, TimeZone};

    use super::*;
    use crate::model::{
        DeploymentStatus, EventType, Location, PolicyCategory, PolicyStatus, PolicyType, Priority,
    };

    fn location(city: &str) -> Location {
        Location {
            region: "North America".into(),
            country: "United States".into(),
            city: city.into(),
            address: String::new(),
            timezone: "America/New_York".into(),
            coordinates: None,
        }
    }

    fn site_request(name: &str, code: &str) -> CreateSiteRequest {
        CreateSiteRequest {
            name: name.into(),
            site_code: code.into(),
            location: location("New York"),
            status: DeploymentStatus::Planning,
            priority: Priority::High,
            risk_level: crate::model::RiskLevel::Low,
            network: crate::model::NetworkProfile::default(),
            budget: None,
            tags: vec![],
            stakeholders: vec![],
            compliance_frameworks: vec![],
            go_live: None,
        }
    }

    fn policy_request(sites: Vec<EntityId>) -> CreatePolicyRequest {
        CreatePolicyRequest {
            name: "Corporate 802.1X".into(),
            description: String::new(),
            policy_type: PolicyType::AccessControl,
            category: PolicyCategory::Security,
            status: PolicyStatus::Active,
            priority: Priority::High,
            conditions: vec![],
            actions: vec![],
            applied_sites: sites,
        }
    }

    fn event_request(title: &str, deps: Vec<EntityId>) -> CreateTimelineEventRequest {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        CreateTimelineEventRequest {
            title: title.into(),
            description: String::new(),
            event_type: EventType::Task,
            status: crate::model::EventStatus::Scheduled,
            priority: Priority::Medium,
            start,
            end: start + Duration::days(2),
            assignees: vec![],
            site_id: None,
            dependencies: deps,
        }
    }

    #[test]
    fn create_site_requires_name_and_location() {
        let store = DataStore::new();
        let err = store.create_site(site_request("  ", "NYC")).unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { ref field, .. } if field == "name"));

        let mut req = site_request("NYC HQ", "NYC");
        req.location.city = String::new();
        let err = store.create_site(req).unwrap_err();
        assert!(
            matches!(err, CoreError::ValidationFailed { ref field, .. } if field == "location.city")
        );
        assert_eq!(store.site_count(), 0);
    }

    #[test]
    fn site_codes_are_unique_case_insensitively() {
        let store = DataStore::new();
        store.create_site(site_request("NYC HQ", "NYC-HQ")).unwrap();
        let err = store.create_site(site_request("Other", "nyc-hq")).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists { .. }));
    }

    #[test]
    fn renaming_a_site_code_checks_other_sites_only() {
        let store = DataStore::new();
        let nyc = store.create_site(site_request("NYC HQ", "NYC-HQ")).unwrap();
        let lon = store.create_site(site_request("London", "LON-01")).unwrap();

        let recased = store
            .update_site(
                &nyc.id,
                UpdateSiteRequest {
                    site_code: Some("nyc-hq".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(recased.site_code, "nyc-hq");

        let err = store
            .update_site(
                &lon.id,
                UpdateSiteRequest {
                    site_code: Some("NYC-HQ".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists { .. }));
        assert_eq!(store.site(&lon.id).unwrap().site_code, "LON-01");
    }

    #[test]
    fn update_site_rejects_progress_over_100() {
        let store = DataStore::new();
        let site = store.create_site(site_request("NYC HQ", "NYC")).unwrap();
        let err = store
            .update_site(
                &site.id,
                UpdateSiteRequest {
                    progress: Some(101),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(store.site(&site.id).unwrap().progress, 0);
    }

    #[test]
    fn find_site_by_code() {
        let store = DataStore::new();
        let site = store.create_site(site_request("NYC HQ", "NYC-HQ")).unwrap();
        assert_eq!(store.find_site("nyc-hq").unwrap().id, site.id);
        assert_eq!(store.find_site(&site.id.to_string()).unwrap().id, site.id);
        assert!(store.find_site("nope").is_none());
    }

    #[test]
    fn policy_with_unknown_site_is_rejected() {
        let store = DataStore::new();
        let err = store
            .create_policy(policy_request(vec![EntityId::from("site-ghost")]))
            .unwrap_err();
        assert!(matches!(err, CoreError::DanglingReference { target_type: "site", .. }));
    }

    #[test]
    fn deleting_site_detaches_references() {
        let store = DataStore::new();
        let site = store.create_site(site_request("NYC HQ", "NYC")).unwrap();
        let policy = store.create_policy(policy_request(vec![site.id.clone()])).unwrap();
        let mut req = event_request("Cutover", vec![]);
        req.site_id = Some(site.id.clone());
        let event = store.create_event(req).unwrap();

        store.delete_site(&site.id).unwrap();

        assert!(store.policy(&policy.id).unwrap().applied_sites.is_empty());
        assert!(store.event(&event.id).unwrap().site_id.is_none());
    }

    #[test]
    fn event_cannot_depend_on_itself_or_form_cycles() {
        let store = DataStore::new();
        let a = store.create_event(event_request("A", vec![])).unwrap();
        let b = store
            .create_event(event_request("B", vec![a.id.clone()]))
            .unwrap();

        let err = store
            .update_event(
                &a.id,
                UpdateTimelineEventRequest {
                    dependencies: Some(vec![a.id.clone()]),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::DependencyCycle { .. }));

        let err = store
            .update_event(
                &a.id,
                UpdateTimelineEventRequest {
                    dependencies: Some(vec![b.id.clone()]),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::DependencyCycle { .. }));
    }

    #[test]
    fn event_end_before_start_is_rejected() {
        let store = DataStore::new();
        let mut req = event_request("Backwards", vec![]);
        req.end = req.start - Duration::hours(1);
        assert!(matches!(
            store.create_event(req).unwrap_err(),
            CoreError::ValidationFailed { .. }
        ));
    }

    #[test]
    fn deleting_event_prunes_dependents() {
        let store = DataStore::new();
        let a = store.create_event(event_request("A", vec![])).unwrap();
        let b = store
            .create_event(event_request("B", vec![a.id.clone(), a.id.clone()]))
            .unwrap();
        assert_eq!(b.dependencies.len(), 1);

        store.delete_event(&a.id).unwrap();
        assert!(store.event(&b.id).unwrap().dependencies.is_empty());
    }

    #[test]
    fn project_dates_and_sites_are_validated() {
        let store = DataStore::new();
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let req = CreateProjectRequest {
            name: "Phase 1".into(),
            description: String::new(),
            status: DeploymentStatus::Planning,
            site_ids: vec![],
            start,
            target_end: start - chrono::Days::new(1),
            budget: None,
        };
        assert!(store.create_project(req.clone()).is_err());

        let req = CreateProjectRequest {
            target_end: start,
            site_ids: vec![EntityId::from("site-ghost")],
            ..req
        };
        assert!(matches!(
            store.create_project(req).unwrap_err(),
            CoreError::DanglingReference { .. }
        ));
    }

    #[test]
    fn delete_unknown_entity_is_not_found() {
        let store = DataStore::new();
        assert!(matches!(
            store.delete_policy(&EntityId::from("nope")).unwrap_err(),
            CoreError::NotFound { entity_type: "policy", .. }
        ));
    }
}
