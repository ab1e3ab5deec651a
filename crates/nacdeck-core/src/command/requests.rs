// ── Typed request structs for Command payloads ──
//
// Create requests carry everything a new record needs except its id.
// Update requests are sparse: `None` leaves the field untouched.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    Budget, DeploymentStatus, EntityId, EventStatus, EventType, Location, NetworkProfile,
    PolicyCategory, PolicyStatus, PolicyType, Priority, RiskLevel,
};

// ── Site ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSiteRequest {
    pub name: String,
    pub site_code: String,
    pub location: Location,
    #[serde(default = "default_deployment_status")]
    pub status: DeploymentStatus,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default = "default_risk")]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub network: NetworkProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub stakeholders: Vec<String>,
    #[serde(default)]
    pub compliance_frameworks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_live: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSiteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeploymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_live: Option<NaiveDate>,
}

// ── Policy ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePolicyRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub policy_type: PolicyType,
    pub category: PolicyCategory,
    #[serde(default = "default_policy_status")]
    pub status: PolicyStatus,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub applied_sites: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePolicyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PolicyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effectiveness: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_sites: Option<Vec<EntityId>>,
}

// ── Timeline ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimelineEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub event_type: EventType,
    #[serde(default = "default_event_status")]
    pub status: EventStatus,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<EntityId>,
    #[serde(default)]
    pub dependencies: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTimelineEventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
    /// `Some(None)` detaches the event from its site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<Option<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<EntityId>>,
}

// ── Project ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_deployment_status")]
    pub status: DeploymentStatus,
    #[serde(default)]
    pub site_ids: Vec<EntityId>,
    pub start: NaiveDate,
    pub target_end: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeploymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_ids: Option<Vec<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_end: Option<NaiveDate>,
}

// ── Defaults ───────────────────────────────────────────────────────

fn default_deployment_status() -> DeploymentStatus {
    DeploymentStatus::Planning
}
fn default_policy_status() -> PolicyStatus {
    PolicyStatus::Draft
}
fn default_event_status() -> EventStatus {
    EventStatus::Scheduled
}
fn default_priority() -> Priority {
    Priority::Medium
}
fn default_risk() -> RiskLevel {
    RiskLevel::Low
}
