//! Project command handlers.

use std::sync::Arc;

use tabled::Tabled;

use nacdeck_core::{Dashboard, Project, ProjectFilter, ProjectSummary};

use crate::cli::{GlobalOpts, ProjectFilterArgs, ProjectsArgs, ProjectsCommand};
use crate::error::CliError;
use crate::output::{self, paint};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Sites")]
    sites: usize,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "Target")]
    target_end: String,
    #[tabled(rename = "Budget")]
    budget: String,
}

impl ProjectRow {
    fn new(p: &Project, color: bool) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            status: paint(p.status.as_ref(), util::deployment_tone(p.status), color),
            progress: util::percent(p.progress),
            sites: p.site_ids.len(),
            start: util::day(Some(p.start)),
            target_end: util::day(Some(p.target_end)),
            budget: util::budget(p.budget.as_ref()),
        }
    }
}

fn matching(
    dashboard: &Dashboard,
    args: &ProjectFilterArgs,
) -> Result<Arc<Vec<Arc<Project>>>, CliError> {
    let filter = ProjectFilter::new()
        .search(args.search.as_deref().unwrap_or_default())
        .status(util::criterion("status", args.status.as_deref())?);
    Ok(dashboard.project_view(filter).rows())
}

// ── Summary ─────────────────────────────────────────────────────────

pub(super) fn summary_fields(s: &ProjectSummary) -> Vec<(String, String)> {
    let budgets: Vec<String> = s
        .budget_by_currency
        .iter()
        .map(|(currency, amount)| format!("{} {currency}", util::thousands(*amount)))
        .collect();

    vec![
        ("Projects".into(), s.total.to_string()),
        ("Average progress".into(), util::percent(s.average_progress)),
        ("Sites covered".into(), s.sites_covered.to_string()),
        ("By status".into(), output::join_counts(&s.by_status)),
        ("Budget".into(), output::join_or_dash(&budgets)),
    ]
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    dashboard: &Dashboard,
    args: ProjectsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = util::color_enabled(global);

    match args.command {
        ProjectsCommand::List(list) => {
            let projects = matching(dashboard, &list)?;
            let out = output::render_list(
                &global.output_format(),
                projects.as_slice(),
                |p: &Arc<Project>| ProjectRow::new(p, color),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProjectsCommand::Summary(filter) => {
            let summary = ProjectSummary::from_projects(&matching(dashboard, &filter)?);
            let out = output::render_summary(
                &global.output_format(),
                &summary,
                &summary_fields(&summary),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
