// ── Dashboard domain model ──
//
// Canonical record types shared by the store, the filter engine and
// the aggregation layer. Every type is serde-serializable so snapshots
// and CLI output can reuse them directly.

pub mod common;
pub mod entity_id;

pub mod policy;
pub mod project;
pub mod site;
pub mod timeline;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use nacdeck_core::model::*` gives you everything.

pub use entity_id::EntityId;

pub use common::{Budget, Coordinates, DeploymentStatus, Priority, RiskLevel};

pub use site::{Location, NetworkProfile, Site};

pub use policy::{Policy, PolicyCategory, PolicyStatus, PolicyType};

pub use timeline::{EventStatus, EventType, TimelineEvent};

pub use project::Project;
