// ── Bulk load and snapshot application ──
//
// Applies whole-collection snapshots (fixture loads, key-value restores)
// into the DataStore, and captures the store back into a snapshot.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::DataStore;
use super::collection::EntityCollection;
use super::data_store::{
    depends_on, validate_event, validate_policy, validate_project, validate_site,
};
use crate::error::CoreError;
use crate::model::{EntityId, Policy, Project, Site, TimelineEvent};

/// Every collection the dashboard holds, as one serializable blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub sites: Vec<Site>,
    #[serde(default)]
    pub policies: Vec<Policy>,
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Upsert all incoming entities, then prune any existing ids not in the
/// incoming set. This avoids the brief empty state that `clear()` causes.
fn upsert_and_prune<T: Clone + Send + Sync + 'static>(
    collection: &EntityCollection<T>,
    items: Vec<(EntityId, T)>,
) {
    let incoming: HashSet<EntityId> = items.iter().map(|(id, _)| id.clone()).collect();
    for (id, entity) in items {
        collection.upsert(id, entity);
    }
    for existing in collection.ids() {
        if !incoming.contains(&existing) {
            collection.remove(&existing);
        }
    }
}

/// Keep records that pass validation, logging the ones that don't.
fn keep_valid<T>(
    kind: &'static str,
    items: Vec<T>,
    id: impl Fn(&T) -> &EntityId,
    validate: impl Fn(&T) -> Result<(), CoreError>,
) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| match validate(item) {
            Ok(()) => true,
            Err(e) => {
                warn!(kind, id = %id(item), error = %e, "skipping invalid record");
                false
            }
        })
        .collect()
}

impl DataStore {
    /// Replace every collection with the snapshot's contents.
    ///
    /// Invalid records and sites reusing an earlier site code are skipped.
    /// Dangling references and dependency edges that would close a cycle
    /// are dropped. Each is logged at `warn`; loading never fails.
    pub fn apply_snapshot(&self, snap: DashboardSnapshot) {
        let mut sites = keep_valid("site", snap.sites, |s| &s.id, validate_site);
        let mut codes = HashSet::new();
        sites.retain(|site| {
            let fresh = codes.insert(site.site_code.to_ascii_lowercase());
            if !fresh {
                warn!(id = %site.id, code = %site.site_code, "skipping site with duplicate site code");
            }
            fresh
        });
        let site_ids: HashSet<EntityId> = sites.iter().map(|s| s.id.clone()).collect();

        let mut policies = keep_valid("policy", snap.policies, |p| &p.id, validate_policy);
        for policy in &mut policies {
            retain_known(&policy.id, "site", &mut policy.applied_sites, &site_ids);
        }

        let mut events = keep_valid("timeline event", snap.events, |e| &e.id, validate_event);
        let event_ids: HashSet<EntityId> = events.iter().map(|e| e.id.clone()).collect();
        for event in &mut events {
            if let Some(site_id) = &event.site_id {
                if !site_ids.contains(site_id) {
                    warn!(from = %event.id, site = %site_id, "dropping dangling site reference");
                    event.site_id = None;
                }
            }
            retain_known(&event.id, "timeline event", &mut event.dependencies, &event_ids);
        }
        break_cycles(&mut events);

        let mut projects = keep_valid("project", snap.projects, |p| &p.id, validate_project);
        for project in &mut projects {
            retain_known(&project.id, "site", &mut project.site_ids, &site_ids);
        }

        let counts = (sites.len(), policies.len(), events.len(), projects.len());

        upsert_and_prune(&self.sites, sites.into_iter().map(|s| (s.id.clone(), s)).collect());
        upsert_and_prune(
            &self.policies,
            policies.into_iter().map(|p| (p.id.clone(), p)).collect(),
        );
        upsert_and_prune(&self.events, events.into_iter().map(|e| (e.id.clone(), e)).collect());
        upsert_and_prune(
            &self.projects,
            projects.into_iter().map(|p| (p.id.clone(), p)).collect(),
        );

        self.last_loaded.send_replace(Some(Utc::now()));
        debug!(
            sites = counts.0,
            policies = counts.1,
            events = counts.2,
            projects = counts.3,
            "snapshot applied"
        );
    }

    /// Capture every collection, in order, as an owned snapshot.
    pub fn to_snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            sites: self.sites.snapshot().iter().map(|s| Site::clone(s)).collect(),
            policies: self.policies.snapshot().iter().map(|p| Policy::clone(p)).collect(),
            events: self
                .events
                .snapshot()
                .iter()
                .map(|e| TimelineEvent::clone(e))
                .collect(),
            projects: self.projects.snapshot().iter().map(|p| Project::clone(p)).collect(),
        }
    }

    /// Empty every collection.
    pub fn clear(&self) {
        self.sites.clear();
        self.policies.clear();
        self.events.clear();
        self.projects.clear();
    }
}

/// Accept dependency edges in load order, dropping any edge whose target
/// already (transitively) depends on the event.
fn break_cycles(events: &mut [TimelineEvent]) {
    let mut accepted: HashMap<EntityId, Vec<EntityId>> = HashMap::new();
    for event in events.iter_mut() {
        let mut kept = Vec::with_capacity(event.dependencies.len());
        for dep in std::mem::take(&mut event.dependencies) {
            if depends_on(&dep, &event.id, |id| accepted.get(id).map(Vec::as_slice)) {
                warn!(event = %event.id, dependency = %dep, "dropping dependency that closes a cycle");
                continue;
            }
            kept.push(dep);
        }
        accepted.insert(event.id.clone(), kept.clone());
        event.dependencies = kept;
    }
}

fn retain_known(
    from: &EntityId,
    target_type: &'static str,
    ids: &mut Vec<EntityId>,
    known: &HashSet<EntityId>,
) {
    ids.retain(|id| {
        let ok = known.contains(id);
        if !ok {
            warn!(%from, target_type, target = %id, "dropping dangling reference");
        }
        ok
    });
}
