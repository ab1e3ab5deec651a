//! Site command handlers.

use std::sync::Arc;

use tabled::Tabled;

use nacdeck_core::{Dashboard, Site, SiteFilter, SiteSummary};

use crate::cli::{GlobalOpts, SiteFilterArgs, SitesArgs, SitesCommand};
use crate::error::CliError;
use crate::output::{self, paint};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Risk")]
    risk: String,
    #[tabled(rename = "Progress")]
    progress: String,
}

impl SiteRow {
    fn new(s: &Site, color: bool) -> Self {
        Self {
            id: s.id.to_string(),
            code: s.site_code.clone(),
            name: s.name.clone(),
            region: s.location.region.clone(),
            status: paint(s.status.as_ref(), util::deployment_tone(s.status), color),
            priority: paint(s.priority.as_ref(), util::priority_tone(s.priority), color),
            risk: paint(s.risk_level.as_ref(), util::risk_tone(s.risk_level), color),
            progress: util::percent(s.progress),
        }
    }
}

// ── Filter ──────────────────────────────────────────────────────────

fn site_filter(args: &SiteFilterArgs) -> Result<SiteFilter, CliError> {
    Ok(SiteFilter::new()
        .search(args.search.as_deref().unwrap_or_default())
        .status(util::criterion("status", args.status.as_deref())?)
        .priority(util::criterion("priority", args.priority.as_deref())?)
        .risk(util::criterion("risk", args.risk.as_deref())?)
        .region(util::text_criterion(args.region.as_deref())))
}

// ── Detail ──────────────────────────────────────────────────────────

fn detail(dashboard: &Dashboard, s: &Site, color: bool) -> String {
    let loc = &s.location;
    let net = &s.network;

    let mut features = Vec::new();
    if net.ad_integration {
        features.push("AD".to_owned());
    }
    if net.certificate_auth {
        features.push("certificates".to_owned());
    }
    if net.guest_network {
        features.push("guest".to_owned());
    }
    if net.byod {
        features.push("BYOD".to_owned());
    }

    let policies: Vec<String> = dashboard
        .store()
        .policies_snapshot()
        .iter()
        .filter(|p| p.applied_sites.contains(&s.id))
        .map(|p| p.name.clone())
        .collect();

    output::render_fields([
        ("ID", s.id.to_string()),
        ("Name", s.name.clone()),
        ("Code", s.site_code.clone()),
        (
            "Location",
            format!("{}, {} ({})", loc.city, loc.country, loc.region),
        ),
        ("Address", or_dash(&loc.address)),
        ("Timezone", or_dash(&loc.timezone)),
        (
            "Status",
            paint(s.status.as_ref(), util::deployment_tone(s.status), color),
        ),
        (
            "Priority",
            paint(s.priority.as_ref(), util::priority_tone(s.priority), color),
        ),
        (
            "Risk",
            paint(s.risk_level.as_ref(), util::risk_tone(s.risk_level), color),
        ),
        ("Progress", util::percent(s.progress)),
        ("Go-live", util::day(s.go_live)),
        (
            "Network",
            format!(
                "{} switches, {} APs, {} firewalls, {} VLANs",
                net.switches, net.access_points, net.firewalls, net.vlans
            ),
        ),
        ("NAC features", output::join_or_dash(&features)),
        ("Budget", util::budget(s.budget.as_ref())),
        ("Compliance", output::join_or_dash(&s.compliance_frameworks)),
        ("Stakeholders", output::join_or_dash(&s.stakeholders)),
        ("Tags", output::join_or_dash(&s.tags)),
        ("Policies", output::join_or_dash(&policies)),
    ])
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".into()
    } else {
        value.to_owned()
    }
}

// ── Summary ─────────────────────────────────────────────────────────

pub(super) fn summary_fields(s: &SiteSummary) -> Vec<(String, String)> {
    let budgets: Vec<String> = s
        .budget_by_currency
        .iter()
        .map(|(currency, amount)| format!("{} {currency}", util::thousands(*amount)))
        .collect();
    let net = &s.network;

    vec![
        ("Sites".into(), s.total.to_string()),
        (
            "Completed".into(),
            format!("{} ({})", s.completed, util::percent(s.completion_percent)),
        ),
        ("Average progress".into(), util::percent(s.average_progress)),
        ("At risk".into(), s.at_risk.to_string()),
        ("By status".into(), output::join_counts(&s.by_status)),
        ("By priority".into(), output::join_counts(&s.by_priority)),
        ("By risk".into(), output::join_counts(&s.by_risk)),
        ("By region".into(), output::join_counts(&s.by_region)),
        ("Budget".into(), output::join_or_dash(&budgets)),
        (
            "Devices".into(),
            format!(
                "{} switches, {} APs, {} firewalls",
                net.switches, net.access_points, net.firewalls
            ),
        ),
        (
            "Certificate auth".into(),
            format!("{} of {} sites", net.certificate_auth_sites, s.total),
        ),
    ]
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(dashboard: &Dashboard, args: SitesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = util::color_enabled(global);

    match args.command {
        SitesCommand::List(list) => {
            let mut view = dashboard.site_view(site_filter(&list)?);
            let rows = view.rows();
            let out = output::render_list(
                &global.output_format(),
                rows.as_slice(),
                |s: &Arc<Site>| SiteRow::new(s, color),
                |s| s.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Get { site } => {
            let site = util::resolve_site(dashboard, &site)?;
            let out = output::render_single(
                &global.output_format(),
                &site,
                |s| detail(dashboard, s, color),
                |s| s.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Summary(filter) => {
            let summary = dashboard.site_summary(&site_filter(&filter)?);
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
