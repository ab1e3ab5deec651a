//! Configuration for the nacdeck CLI.
//!
//! A TOML file at the platform config dir, layered under `NACDECK_*`
//! environment variables, and translation to
//! `nacdeck_core::DashboardConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use nacdeck_core::{DashboardConfig, EffectivenessScope, MetricsBounds};

/// Overrides the config file location when set.
pub const CONFIG_PATH_ENV: &str = "NACDECK_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Output defaults for the CLI.
    #[serde(default)]
    pub defaults: Defaults,

    /// Mock latency and synthetic metrics.
    #[serde(default)]
    pub simulation: Simulation,

    /// How summaries are computed.
    #[serde(default)]
    pub aggregation: Aggregation,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Simulation {
    /// Metrics tick period in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Mock load/save delay in milliseconds. `0` disables it.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Fixed RNG seed for reproducible metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default)]
    pub bounds: MetricsBounds,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            latency_ms: default_latency_ms(),
            seed: None,
            bounds: MetricsBounds::default(),
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    3_000
}
fn default_latency_ms() -> u64 {
    400
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Aggregation {
    /// Which policies count towards average effectiveness.
    #[serde(default)]
    pub effectiveness_scope: EffectivenessScope,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `NACDECK_CONFIG`, else XDG / platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "nacdeck", "nacdeck").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("nacdeck");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, still layering `NACDECK_*` variables on top.
///
/// A missing file is not an error; defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("NACDECK_")
                .ignore(&["config"])
                .split("__"),
        );

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build the core `DashboardConfig`.
pub fn to_dashboard_config(cfg: &Config) -> Result<DashboardConfig, ConfigError> {
    let sim = &cfg.simulation;
    if sim.tick_interval_ms == 0 {
        return Err(ConfigError::Validation {
            field: "simulation.tick_interval_ms".into(),
            reason: "must be greater than zero".into(),
        });
    }

    Ok(DashboardConfig {
        metrics_interval: Duration::from_millis(sim.tick_interval_ms),
        simulated_latency: Duration::from_millis(sim.latency_ms),
        metrics_seed: sim.seed,
        metrics_bounds: sim.bounds.sanitized(),
        effectiveness_scope: cfg.aggregation.effectiveness_scope,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_without_a_file() {
        Jail::expect_with(|jail| {
            let cfg = load_config_from(&jail.directory().join("missing.toml")).unwrap();
            assert_eq!(cfg, Config::default());
            assert_eq!(cfg.simulation.tick_interval_ms, 3_000);
            assert_eq!(cfg.simulation.latency_ms, 400);
            assert_eq!(cfg.aggregation.effectiveness_scope, EffectivenessScope::Active);
            Ok(())
        });
    }

    #[test]
    fn file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [defaults]
                output = "json"

                [simulation]
                tick_interval_ms = 500
                seed = 42

                [simulation.bounds]
                max_sessions = 900

                [aggregation]
                effectiveness_scope = "launched"
                "#,
            )?;
            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.defaults.output, "json");
            assert_eq!(cfg.defaults.color, "auto");
            assert_eq!(cfg.simulation.tick_interval_ms, 500);
            assert_eq!(cfg.simulation.latency_ms, 400);
            assert_eq!(cfg.simulation.seed, Some(42));
            assert_eq!(cfg.simulation.bounds.max_sessions, 900);
            assert_eq!(
                cfg.aggregation.effectiveness_scope,
                EffectivenessScope::Launched
            );
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[simulation]\nlatency_ms = 50\n")?;
            jail.set_env("NACDECK_SIMULATION__LATENCY_MS", "0");
            jail.set_env("NACDECK_AGGREGATION__EFFECTIVENESS_SCOPE", "all");
            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.simulation.latency_ms, 0);
            assert_eq!(cfg.aggregation.effectiveness_scope, EffectivenessScope::All);
            Ok(())
        });
    }

    #[test]
    fn config_path_override_is_ignored_as_a_key() {
        Jail::expect_with(|jail| {
            jail.set_env(CONFIG_PATH_ENV, "custom.toml");
            jail.create_file("custom.toml", "[defaults]\ncolor = \"never\"\n")?;
            assert_eq!(config_path(), PathBuf::from("custom.toml"));
            let cfg = load_config().unwrap();
            assert_eq!(cfg.defaults.color, "never");
            Ok(())
        });
    }

    #[test]
    fn unknown_scope_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[aggregation]\neffectiveness_scope = \"weighted\"\n",
            )?;
            let err = load_config_from(Path::new("config.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::Figment(_)));
            Ok(())
        });
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.simulation.seed = Some(7);
        cfg.aggregation.effectiveness_scope = EffectivenessScope::All;

        save_config_to(&cfg, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[simulation]"));
        assert!(written.contains("effectiveness_scope = \"all\""));

        let parsed: Config = toml::from_str(&written).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn translation_to_dashboard_config() {
        let mut cfg = Config::default();
        cfg.simulation.tick_interval_ms = 250;
        cfg.simulation.latency_ms = 0;
        cfg.simulation.seed = Some(3);

        let dash = to_dashboard_config(&cfg).unwrap();
        assert_eq!(dash.metrics_interval, Duration::from_millis(250));
        assert_eq!(dash.simulated_latency, Duration::ZERO);
        assert_eq!(dash.metrics_seed, Some(3));
        assert_eq!(dash.effectiveness_scope, EffectivenessScope::Active);
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let mut cfg = Config::default();
        cfg.simulation.tick_interval_ms = 0;
        let err = to_dashboard_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "simulation.tick_interval_ms"));
    }
}
