// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// dashboard routes each variant to the matching validated store
// operation; reads bypass commands and go straight to snapshots.

pub mod requests;

use std::sync::Arc;

use crate::model::{EntityId, Policy, Project, Site, TimelineEvent};

pub use requests::{
    CreatePolicyRequest, CreateProjectRequest, CreateSiteRequest, CreateTimelineEventRequest,
    UpdatePolicyRequest, UpdateProjectRequest, UpdateSiteRequest, UpdateTimelineEventRequest,
};

/// All possible write operations against the dashboard store.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Sites ────────────────────────────────────────────────────────
    CreateSite(CreateSiteRequest),
    UpdateSite {
        id: EntityId,
        update: UpdateSiteRequest,
    },
    DeleteSite {
        id: EntityId,
    },

    // ── Policies ─────────────────────────────────────────────────────
    CreatePolicy(CreatePolicyRequest),
    UpdatePolicy {
        id: EntityId,
        update: UpdatePolicyRequest,
    },
    DeletePolicy {
        id: EntityId,
    },

    // ── Timeline ─────────────────────────────────────────────────────
    CreateTimelineEvent(CreateTimelineEventRequest),
    UpdateTimelineEvent {
        id: EntityId,
        update: UpdateTimelineEventRequest,
    },
    DeleteTimelineEvent {
        id: EntityId,
    },

    // ── Projects ─────────────────────────────────────────────────────
    CreateProject(CreateProjectRequest),
    UpdateProject {
        id: EntityId,
        update: UpdateProjectRequest,
    },
    DeleteProject {
        id: EntityId,
    },
}

/// Result of a command execution.
#[derive(Debug)]
pub enum CommandResult {
    Ok,
    Site(Arc<Site>),
    Policy(Arc<Policy>),
    TimelineEvent(Arc<TimelineEvent>),
    Project(Arc<Project>),
}
