//! CLI configuration: a thin wrapper around the shared `nacdeck_config` types.
//!
//! Adds the resolution steps that depend on `GlobalOpts` and on
//! per-command overrides.

use nacdeck_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use nacdeck_config::{Config, config_path, load_config, save_config};

/// Load the config file and fill unset global flags from its `[defaults]`.
pub fn load_for(global: &mut GlobalOpts) -> Result<Config, CliError> {
    let cfg = load_config()?;
    global.fill_defaults(&cfg.defaults.output, &cfg.defaults.color);
    Ok(cfg)
}

/// Translate to the core runtime config.
pub fn dashboard_config(cfg: &Config) -> Result<DashboardConfig, CliError> {
    Ok(nacdeck_config::to_dashboard_config(cfg)?)
}
