// ── Core identity type ──
//
// Every dashboard entity is addressed by an EntityId. Records created at
// runtime get a UUID; hand-authored fixtures use readable slugs such as
// `site-nyc-hq`. Consumers never care which.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Canonical identifier for any dashboard entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Uuid(Uuid),
    Slug(String),
}

impl EntityId {
    /// Mint a fresh random identifier for a newly created record.
    pub fn generate() -> Self {
        Self::Uuid(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            Self::Slug(_) => None,
        }
    }

    pub fn as_slug(&self) -> Option<&str> {
        match self {
            Self::Slug(s) => Some(s),
            Self::Uuid(_) => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Slug(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<Uuid> for EntityId {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        match Uuid::parse_str(&s) {
            Ok(u) => Self::Uuid(u),
            Err(_) => Self::Slug(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_from_uuid_string() {
        let id = EntityId::from("550e8400-e29b-41d4-a716-446655440000".to_owned());
        assert!(id.as_uuid().is_some());
    }

    #[test]
    fn entity_id_from_slug() {
        let id = EntityId::from("site-nyc-hq");
        assert_eq!(id.as_slug(), Some("site-nyc-hq"));
    }

    #[test]
    fn generated_ids_are_unique_uuids() {
        let a = EntityId::generate();
        let b = EntityId::generate();
        assert!(a.as_uuid().is_some());
        assert_ne!(a, b);
    }

    #[test]
    fn entity_id_round_trips_through_display() {
        let id: EntityId = "pol-guest-isolation".parse().unwrap();
        assert_eq!(EntityId::from(id.to_string()), id);
    }

    #[test]
    fn serializes_untagged() {
        let id = EntityId::from("evt-kickoff");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"evt-kickoff\"");
    }
}
