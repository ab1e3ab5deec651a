//! Policy command handlers.

use std::sync::Arc;

use tabled::Tabled;

use nacdeck_core::stream::apply;
use nacdeck_core::{Dashboard, EffectivenessScope, Policy, PolicyFilter, PolicySummary};

use crate::cli::{GlobalOpts, PoliciesArgs, PoliciesCommand, PolicyFilterArgs};
use crate::error::CliError;
use crate::output::{self, paint};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PolicyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    policy_type: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Effectiveness")]
    effectiveness: String,
    #[tabled(rename = "Violations")]
    violations: u32,
    #[tabled(rename = "Sites")]
    sites: usize,
}

impl PolicyRow {
    fn new(p: &Policy, color: bool) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            policy_type: p.policy_type.to_string(),
            category: p.category.to_string(),
            status: paint(p.status.as_ref(), util::policy_tone(p.status), color),
            priority: paint(p.priority.as_ref(), util::priority_tone(p.priority), color),
            effectiveness: util::percent(p.effectiveness),
            violations: p.violations,
            sites: p.applied_sites.len(),
        }
    }
}

// ── Filter ──────────────────────────────────────────────────────────

fn policy_filter(args: &PolicyFilterArgs) -> Result<PolicyFilter, CliError> {
    Ok(PolicyFilter::new()
        .search(args.search.as_deref().unwrap_or_default())
        .status(util::criterion("status", args.status.as_deref())?)
        .policy_type(util::criterion("type", args.policy_type.as_deref())?)
        .category(util::criterion("category", args.category.as_deref())?)
        .priority(util::criterion("priority", args.priority.as_deref())?))
}

// ── Detail ──────────────────────────────────────────────────────────

fn detail(dashboard: &Dashboard, p: &Policy, color: bool) -> String {
    let sites: Vec<String> = p
        .applied_sites
        .iter()
        .map(|id| util::site_label(dashboard, id))
        .collect();

    output::render_fields([
        ("ID", p.id.to_string()),
        ("Name", p.name.clone()),
        ("Description", p.description.clone()),
        ("Type", p.policy_type.to_string()),
        ("Category", p.category.to_string()),
        (
            "Status",
            paint(p.status.as_ref(), util::policy_tone(p.status), color),
        ),
        (
            "Priority",
            paint(p.priority.as_ref(), util::priority_tone(p.priority), color),
        ),
        ("Effectiveness", util::percent(p.effectiveness)),
        ("Violations", p.violations.to_string()),
        ("Conditions", output::join_or_dash(&p.conditions)),
        ("Actions", output::join_or_dash(&p.actions)),
        ("Sites", output::join_or_dash(&sites)),
        (
            "Last modified",
            p.last_modified.format("%Y-%m-%d %H:%M UTC").to_string(),
        ),
    ])
}

// ── Summary ─────────────────────────────────────────────────────────

pub(super) fn summary_fields(s: &PolicySummary) -> Vec<(String, String)> {
    vec![
        ("Policies".into(), s.total.to_string()),
        ("Active".into(), s.active.to_string()),
        (
            format!("Average effectiveness ({})", s.effectiveness_scope),
            format!("{} over {} policies", util::percent(s.average_effectiveness), s.scored),
        ),
        ("Violations".into(), s.total_violations.to_string()),
        ("By status".into(), output::join_counts(&s.by_status)),
        ("By type".into(), output::join_counts(&s.by_type)),
    ]
}


// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    dashboard: &Dashboard,
    args: PoliciesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = util::color_enabled(global);

    match args.command {
        PoliciesCommand::List(list) => {
            let mut view = dashboard.policy_view(policy_filter(&list)?);
            let rows = view.rows();
            let out = output::render_list(
                &global.output_format(),
                rows.as_slice(),
                |p: &Arc<Policy>| PolicyRow::new(p, color),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PoliciesCommand::Get { id } => {
            let policy = dashboard
                .store()
                .policy(&id.as_str().into())
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "policy".into(),
                    identifier: id.clone(),
                    list_command: "policies list".into(),
                })?;
            let out = output::render_single(
                &global.output_format(),
                &*policy,
                |p| detail(dashboard, p, color),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PoliciesCommand::Summary { filter, scope } => {
            let filter = policy_filter(&filter)?;
            let summary = match scope {
                None => dashboard.policy_summary(&filter),
                Some(raw) => {
                    let scope: EffectivenessScope = util::variant("scope", &raw)?;
                    PolicySummary::from_policies(
                        &apply(&dashboard.store().policies_snapshot(), &filter),
                        scope,
                    )
                }
            };
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
