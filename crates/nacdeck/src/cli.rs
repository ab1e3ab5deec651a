//! Clap derive structures for the `nacdeck` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Filter values stay strings here and are parsed by the handlers, so
//! `build.rs` can compile this file with nothing but clap.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nacdeck -- NAC rollout dashboard in the terminal
#[derive(Debug, Parser)]
#[command(
    name = "nacdeck",
    version,
    about = "Track network access control rollouts from the command line",
    long_about = "Browse sites, policies, timeline events and projects of a NAC rollout,\n\
        view aggregated progress, and stream simulated enforcement metrics.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "NACDECK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, env = "NACDECK_COLOR", global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

impl GlobalOpts {
    /// Fill unset output/color flags from config-file values.
    /// Unrecognised config values are ignored.
    pub fn fill_defaults(&mut self, output: &str, color: &str) {
        if self.output.is_none() {
            self.output = OutputFormat::from_str(output, true).ok();
        }
        if self.color.is_none() {
            self.color = ColorMode::from_str(color, true).ok();
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse rollout sites
    #[command(alias = "s")]
    Sites(SitesArgs),

    /// Browse NAC policies
    #[command(alias = "pol", alias = "p")]
    Policies(PoliciesArgs),

    /// Browse the rollout timeline
    #[command(alias = "tl", alias = "t")]
    Timeline(TimelineArgs),

    /// Browse rollout projects
    #[command(alias = "prj")]
    Projects(ProjectsArgs),

    /// Whole-dashboard overview
    Summary,

    /// Simulated enforcement metrics
    #[command(alias = "m")]
    Metrics(MetricsArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Sites ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: SitesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List sites matching the filters
    #[command(alias = "ls")]
    List(SiteFilterArgs),

    /// Show one site by id or site code
    Get {
        /// Site id (e.g. site-nyc-hq) or code (e.g. NYC-HQ)
        site: String,
    },

    /// Progress, risk and budget totals over the matching sites
    Summary(SiteFilterArgs),
}

/// Site filters. Categorical values accept `all`.
#[derive(Debug, Args)]
pub struct SiteFilterArgs {
    /// Case-insensitive text search over name, code, city, region and tags
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Deployment status (planning, in-progress, testing, completed, on-hold, cancelled)
    #[arg(long)]
    pub status: Option<String>,

    /// Priority (low, medium, high, critical)
    #[arg(long)]
    pub priority: Option<String>,

    /// Risk level (low, medium, high, critical)
    #[arg(long)]
    pub risk: Option<String>,

    /// Region, exact match
    #[arg(long)]
    pub region: Option<String>,
}

// ── Policies ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PoliciesArgs {
    #[command(subcommand)]
    pub command: PoliciesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PoliciesCommand {
    /// List policies matching the filters
    #[command(alias = "ls")]
    List(PolicyFilterArgs),

    /// Show one policy
    Get {
        /// Policy id
        id: String,
    },

    /// Status, type and effectiveness totals over the matching policies
    Summary {
        #[command(flatten)]
        filter: PolicyFilterArgs,

        /// Policies averaged into effectiveness (active, launched, all)
        #[arg(long)]
        scope: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct PolicyFilterArgs {
    /// Case-insensitive text search over name, description, conditions and actions
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Policy status (draft, active, inactive, deprecated)
    #[arg(long)]
    pub status: Option<String>,

    /// Policy type (access-control, device-compliance, guest-access, byod, quarantine, segmentation)
    #[arg(long = "type")]
    pub policy_type: Option<String>,

    /// Category (security, compliance, access, network)
    #[arg(long)]
    pub category: Option<String>,

    /// Priority (low, medium, high, critical)
    #[arg(long)]
    pub priority: Option<String>,
}

// ── Timeline ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TimelineArgs {
    #[command(subcommand)]
    pub command: TimelineCommand,
}

#[derive(Debug, Subcommand)]
pub enum TimelineCommand {
    /// List timeline events matching the filters
    #[command(alias = "ls")]
    List(EventFilterArgs),

    /// Completion, overdue work and upcoming milestones
    Summary(EventFilterArgs),
}

#[derive(Debug, Args)]
pub struct EventFilterArgs {
    /// Case-insensitive text search over title, description and assignees
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Event type (milestone, task, meeting, deployment, training)
    #[arg(long = "type")]
    pub event_type: Option<String>,

    /// Event status (scheduled, in-progress, completed, delayed, cancelled)
    #[arg(long)]
    pub status: Option<String>,

    /// Priority (low, medium, high, critical)
    #[arg(long)]
    pub priority: Option<String>,

    /// Only events at this site (id or site code)
    #[arg(long)]
    pub site: Option<String>,
}

// ── Projects ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub command: ProjectsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProjectsCommand {
    /// List projects matching the filters
    #[command(alias = "ls")]
    List(ProjectFilterArgs),

    /// Progress and budget totals over the matching projects
    Summary(ProjectFilterArgs),
}

#[derive(Debug, Args)]
pub struct ProjectFilterArgs {
    /// Case-insensitive text search over name and description
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Deployment status (planning, in-progress, testing, completed, on-hold, cancelled)
    #[arg(long)]
    pub status: Option<String>,
}

// ── Metrics ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MetricsArgs {
    #[command(subcommand)]
    pub command: MetricsCommand,
}

#[derive(Debug, Subcommand)]
pub enum MetricsCommand {
    /// Print snapshots as the simulator ticks (Ctrl-C to stop)
    Watch {
        /// Stop after this many snapshots, the current one included
        #[arg(long, short = 'n')]
        ticks: Option<u64>,

        /// Tick period in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// RNG seed for reproducible output (overrides config)
        #[arg(long)]
        seed: Option<u64>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (file + environment)
    Show,

    /// Print the config file path
    Path,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
