//! Whole-dashboard overview.

use nacdeck_core::Dashboard;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::{policies, projects, sites, timeline};

pub fn handle(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    let summary = dashboard.summary();
    let sections = [
        ("Sites", sites::summary_fields(&summary.sites)),
        ("Policies", policies::summary_fields(&summary.policies)),
        ("Timeline", timeline::summary_fields(&summary.timeline)),
        ("Projects", projects::summary_fields(&summary.projects)),
    ];
    let generated = summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC");

    let out = match global.output_format() {
        OutputFormat::Table => {
            let mut blocks = vec![format!("Generated {generated}")];
            for (title, fields) in &sections {
                blocks.push(format!("{title}\n{}", output::render_fields(fields.iter().cloned())));
            }
            blocks.join("\n\n")
        }
        OutputFormat::Plain => sections
            .iter()
            .flat_map(|(title, fields)| {
                fields
                    .iter()
                    .map(move |(k, v)| format!("{}.{k}: {v}", title.to_lowercase()))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        format => output::render_single(&format, &summary, |_| String::new(), |_| String::new())?,
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
