//! Metrics command handlers.

use std::time::Duration;

use nacdeck_core::{Dashboard, DashboardConfig, MetricsSnapshot};

use crate::cli::{GlobalOpts, MetricsArgs, MetricsCommand, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Tone, paint};

use super::util;

/// One line per snapshot for interactive viewing.
fn line(s: &MetricsSnapshot, color: bool) -> String {
    let success_tone = if s.success_rate >= 97.0 {
        Tone::Good
    } else {
        Tone::Warn
    };
    format!(
        "#{:<4} {}  allowed {}  blocked {}  quarantined {}  evaluated {}  \
         resp {:.1}ms  success {}  sessions {}  compliance {}/{}/{}%  risk {}/{}/{}/{}",
        s.tick,
        s.timestamp.format("%H:%M:%S"),
        paint(&s.devices.allowed.to_string(), Tone::Good, color),
        paint(&s.devices.blocked.to_string(), Tone::Bad, color),
        paint(&s.devices.quarantined.to_string(), Tone::Warn, color),
        s.policies_evaluated,
        s.response_time_ms,
        paint(&format!("{:.1}%", s.success_rate), success_tone, color),
        s.active_sessions,
        s.compliance.compliant,
        s.compliance.non_compliant,
        s.compliance.unknown,
        s.risk.low,
        s.risk.medium,
        s.risk.high,
        s.risk.critical,
    )
}

/// Tab-separated values for scripting.
fn plain(s: &MetricsSnapshot) -> String {
    [
        s.tick.to_string(),
        s.timestamp.to_rfc3339(),
        s.devices.allowed.to_string(),
        s.devices.blocked.to_string(),
        s.devices.quarantined.to_string(),
        s.policies_evaluated.to_string(),
        format!("{:.1}", s.response_time_ms),
        format!("{:.1}", s.success_rate),
        s.active_sessions.to_string(),
    ]
    .join("\t")
}

fn render(format: &OutputFormat, s: &MetricsSnapshot, color: bool) -> Result<String, CliError> {
    match format {
        OutputFormat::Yaml => Ok(format!(
            "---\n{}",
            output::render_single(format, s, |_| String::new(), |_| String::new())?
        )),
        _ => output::render_single(format, s, |s| line(s, color), plain),
    }
}

pub async fn handle(
    args: MetricsArgs,
    mut config: DashboardConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        MetricsCommand::Watch {
            ticks,
            interval_ms,
            seed,
        } => {
            if let Some(ms) = interval_ms {
                if ms == 0 {
                    return Err(CliError::Validation {
                        field: "interval-ms".into(),
                        reason: "must be greater than zero".into(),
                    });
                }
                config.metrics_interval = Duration::from_millis(ms);
            }
            if seed.is_some() {
                config.metrics_seed = seed;
            }
            if ticks == Some(0) {
                return Ok(());
            }

            let format = global.output_format();
            let color = util::color_enabled(global);
            let dashboard = Dashboard::new(config);
            let mut stream = dashboard.metrics().subscribe();

            output::print_output(&render(&format, stream.current(), color)?, global.quiet);
            let mut emitted = 1_u64;

            if ticks.is_none_or(|limit| emitted < limit) {
                dashboard.metrics().start()?;

                let ctrl_c = tokio::signal::ctrl_c();
                tokio::pin!(ctrl_c);

                loop {
                    tokio::select! {
                        _ = &mut ctrl_c => break,
                        next = stream.changed() => {
                            let Some(snapshot) = next else { break };
                            output::print_output(&render(&format, &snapshot, color)?, global.quiet);
                            emitted += 1;
                            if ticks.is_some_and(|limit| emitted >= limit) {
                                break;
                            }
                        }
                    }
                }
            }

            dashboard.unmount().await;
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use nacdeck_core::{MetricsBounds, MetricsSource, SyntheticMetrics};

    fn snapshot() -> MetricsSnapshot {
        SyntheticMetrics::seeded(5, &MetricsBounds::default()).initial(chrono::Utc::now())
    }

    #[test]
    fn plain_is_tab_separated() {
        let s = snapshot();
        let out = plain(&s);
        assert_eq!(out.split('\t').count(), 9);
        assert!(out.starts_with("0\t"));
    }

    #[test]
    fn yaml_snapshots_are_separate_documents() {
        let out = render(&OutputFormat::Yaml, &snapshot(), false).unwrap();
        assert!(out.starts_with("---\n"));
        assert!(out.contains("tick: 0"));
    }

    #[test]
    fn compact_json_is_one_line() {
        let out = render(&OutputFormat::JsonCompact, &snapshot(), false).unwrap();
        assert!(!out.contains('\n'));
        assert!(out.contains("\"devices\""));
    }
}
