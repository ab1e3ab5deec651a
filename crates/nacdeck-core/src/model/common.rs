// ── Common types shared across the domain model ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Scheduling priority. Shared by sites, policies and timeline events.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// Deployment risk assessment for a site.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// High and critical sites are surfaced on the dashboard's risk card.
    pub fn is_elevated(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

/// Deployment lifecycle shared by sites and projects.
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
pub enum DeploymentStatus {
    Planning,
    InProgress,
    Testing,
    Completed,
    OnHold,
    Cancelled,
}

impl DeploymentStatus {
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Work is underway (rolling out or under acceptance testing).
    pub fn is_active(self) -> bool {
        matches!(self, Self::InProgress | Self::Testing)
    }
}

/// Allocated budget. A missing amount counts as zero in totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub amount: Option<f64>,
    /// ISO 4217 code, e.g. "USD".
    pub currency: String,
}

impl Budget {
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount: Some(amount),
            currency: currency.into(),
        }
    }
}

/// WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}
