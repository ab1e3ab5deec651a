//! Command dispatch: bridges CLI args -> core views -> output formatting.

pub mod config_cmd;
pub mod metrics;
pub mod policies;
pub mod projects;
pub mod sites;
pub mod summary;
pub mod timeline;
pub mod util;

use nacdeck_core::{Dashboard, DashboardConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a dashboard-bound command to the appropriate handler.
///
/// Browsing commands load the fixtures first and unmount afterwards;
/// `metrics` drives its own dashboard and never loads.
pub async fn dispatch(
    cmd: Command,
    config: DashboardConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Command::Metrics(args) = cmd {
        return metrics::handle(args, config, global).await;
    }

    let dashboard = Dashboard::new(config);
    dashboard.load().await?;

    let result = match cmd {
        Command::Sites(args) => sites::handle(&dashboard, args, global),
        Command::Policies(args) => policies::handle(&dashboard, args, global),
        Command::Timeline(args) => timeline::handle(&dashboard, args, global),
        Command::Projects(args) => projects::handle(&dashboard, args, global),
        Command::Summary => summary::handle(&dashboard, global),
        // Handled before dispatch or above
        Command::Metrics(_) | Command::Config(_) | Command::Completions(_) => unreachable!(),
    };

    dashboard.unmount().await;
    result
}
