//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use nacdeck_config::ConfigError;
use nacdeck_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const VALIDATION: i32 = 5;
    pub const CONFIG: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(nacdeck::not_found),
        help("Run: nacdeck {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Arguments ────────────────────────────────────────────────────
    #[error("Invalid value '{value}' for --{flag}")]
    #[diagnostic(code(nacdeck::invalid_value), help("Expected one of: {expected}"))]
    InvalidValue {
        flag: String,
        value: String,
        expected: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(nacdeck::validation))]
    Validation { field: String, reason: String },

    #[error("{message}")]
    #[diagnostic(
        code(nacdeck::integrity),
        help("Every referenced site, policy and event must already exist.")
    )]
    Integrity { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {source}")]
    #[diagnostic(
        code(nacdeck::config),
        help(
            "Check the config file at: {path}\n\
             and any NACDECK_* environment variables.\n\
             Regenerate defaults with: nacdeck config init --force"
        )
    )]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(nacdeck::config_exists),
        help("Pass --force to overwrite it.")
    )]
    ConfigExists { path: String },

    // ── Operation ────────────────────────────────────────────────────
    #[error("Operation cancelled")]
    #[diagnostic(code(nacdeck::cancelled))]
    Cancelled,

    #[error("Internal error: {0}")]
    #[diagnostic(code(nacdeck::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(nacdeck::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(nacdeck::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::InvalidValue { .. } => exit_code::USAGE,
            Self::Validation { .. } | Self::Integrity { .. } => exit_code::VALIDATION,
            Self::Config { .. } | Self::ConfigExists { .. } => exit_code::CONFIG,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError ───────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(source: ConfigError) -> Self {
        Self::Config {
            path: nacdeck_config::config_path().display().to_string(),
            source,
        }
    }
}

// ── CoreError → CliError ─────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command(entity_type).into(),
                resource_type: entity_type.into(),
                identifier,
            },

            CoreError::ValidationFailed { field, message } => CliError::Validation {
                field,
                reason: message,
            },

            err @ (CoreError::AlreadyExists { .. }
            | CoreError::DanglingReference { .. }
            | CoreError::DependencyCycle { .. }) => CliError::Integrity {
                message: err.to_string(),
            },

            CoreError::Cancelled => CliError::Cancelled,

            CoreError::Snapshot(e) => CliError::Json(e),

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

fn list_command(entity_type: &str) -> &'static str {
    match entity_type {
        "policy" => "policies list",
        "timeline event" => "timeline list",
        "project" => "projects list",
        _ => "sites list",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        let not_found = CliError::from(CoreError::NotFound {
            entity_type: "policy",
            identifier: "pol-x".into(),
        });
        assert_eq!(not_found.exit_code(), exit_code::NOT_FOUND);
        assert!(matches!(
            not_found,
            CliError::NotFound { ref list_command, .. } if list_command == "policies list"
        ));

        let invalid = CliError::from(CoreError::ValidationFailed {
            field: "progress".into(),
            message: "must be at most 100".into(),
        });
        assert_eq!(invalid.exit_code(), exit_code::VALIDATION);

        let cycle = CliError::from(CoreError::DependencyCycle {
            event: "evt-a".into(),
            dependency: "evt-b".into(),
        });
        assert_eq!(cycle.exit_code(), exit_code::VALIDATION);

        let config = CliError::from(ConfigError::Validation {
            field: "simulation.tick_interval_ms".into(),
            reason: "must be greater than zero".into(),
        });
        assert_eq!(config.exit_code(), exit_code::CONFIG);

        assert_eq!(CliError::from(CoreError::Cancelled).exit_code(), exit_code::GENERAL);
    }
}
