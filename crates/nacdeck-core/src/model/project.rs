// ── Project domain type ──

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::{Budget, DeploymentStatus};
use super::entity_id::EntityId;

/// A rollout programme grouping several sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: DeploymentStatus,
    /// Completion, 0–100.
    pub progress: u8,
    #[serde(default)]
    pub site_ids: Vec<EntityId>,
    pub start: NaiveDate,
    pub target_end: NaiveDate,
    pub budget: Option<Budget>,
}
