// ── Core error types ──
//
// User-facing errors from nacdeck-core. Aggregation and metrics
// generation are infallible; only store writes, snapshot I/O and
// cancelled mock operations can fail.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    #[error("{entity_type} '{identifier}' already exists")]
    AlreadyExists {
        entity_type: &'static str,
        identifier: String,
    },

    #[error("Validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    // ── Referential integrity ────────────────────────────────────────
    #[error("{from} references unknown {target_type} '{target}'")]
    DanglingReference {
        from: String,
        target_type: &'static str,
        target: String,
    },

    #[error("Dependency on '{dependency}' would create a cycle through '{event}'")]
    DependencyCycle { event: String, dependency: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation cancelled: the owning view was torn down")]
    Cancelled,

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity_type: &'static str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            identifier: identifier.to_string(),
        }
    }
}
