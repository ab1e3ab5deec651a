// ── Timeline domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::common::Priority;
use super::entity_id::EntityId;

/// A scheduled item on the rollout timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub event_type: EventType,
    pub status: EventStatus,
    pub priority: Priority,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub assignees: Vec<String>,
    pub site_id: Option<EntityId>,
    /// Events that must finish before this one can start.
    #[serde(default)]
    pub dependencies: Vec<EntityId>,
    /// Completion, 0–100.
    pub progress: u8,
}

impl TimelineEvent {
    /// Past its end date without having finished.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.end < now && !self.status.is_closed()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
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
pub enum EventType {
    Milestone,
    Task,
    Meeting,
    Deployment,
    Training,
}

#[derive(
    Debug,
    Clone,
    Copy,
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
pub enum EventStatus {
    Scheduled,
    InProgress,
    Completed,
    Delayed,
    Cancelled,
}

impl EventStatus {
    /// Completed or cancelled: no further work expected.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}
