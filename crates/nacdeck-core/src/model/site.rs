// ── Site domain types ──

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::common::{Budget, Coordinates, DeploymentStatus, Priority, RiskLevel};
use super::entity_id::EntityId;

/// A physical location being onboarded onto network access control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: EntityId,
    pub name: String,
    /// Short operator-facing code (e.g. "NYC-HQ").
    pub site_code: String,
    pub location: Location,
    pub status: DeploymentStatus,
    pub priority: Priority,
    /// Rollout completion, 0–100.
    pub progress: u8,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub network: NetworkProfile,
    pub budget: Option<Budget>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub stakeholders: Vec<String>,
    #[serde(default)]
    pub compliance_frameworks: Vec<String>,
    pub go_live: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub region: String,
    pub country: String,
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub timezone: String,
    pub coordinates: Option<Coordinates>,
}

/// Network inventory and NAC feature flags for a site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct NetworkProfile {
    pub switches: u32,
    pub access_points: u32,
    pub firewalls: u32,
    pub vlans: u32,
    pub ad_integration: bool,
    pub certificate_auth: bool,
    pub guest_network: bool,
    pub byod: bool,
}

impl NetworkProfile {
    /// Total managed network devices (switches, APs, firewalls).
    pub fn device_count(&self) -> u32 {
        self.switches
            .saturating_add(self.access_points)
            .saturating_add(self.firewalls)
    }
}
