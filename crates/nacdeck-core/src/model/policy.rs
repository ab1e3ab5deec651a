// ── NAC policy domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::common::Priority;
use super::entity_id::EntityId;

/// An access policy. Conditions and actions are free text; they are
/// shown to operators and searched but never evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub policy_type: PolicyType,
    pub category: PolicyCategory,
    pub status: PolicyStatus,
    pub priority: Priority,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    /// Display-only effectiveness score, 0–100.
    pub effectiveness: u8,
    pub violations: u32,
    #[serde(default)]
    pub applied_sites: Vec<EntityId>,
    pub last_modified: DateTime<Utc>,
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
pub enum PolicyType {
    AccessControl,
    DeviceCompliance,
    GuestAccess,
    Byod,
    Quarantine,
    Segmentation,
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
pub enum PolicyCategory {
    Security,
    Compliance,
    Access,
    Network,
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
pub enum PolicyStatus {
    Draft,
    Active,
    Inactive,
    Deprecated,
}

impl PolicyStatus {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Has this policy ever been enforced? Drafts have not.
    pub fn is_launched(self) -> bool {
        !matches!(self, Self::Draft)
    }
}
