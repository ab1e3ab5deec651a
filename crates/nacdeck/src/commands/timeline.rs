//! Timeline command handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tabled::Tabled;

use nacdeck_core::{Criterion, Dashboard, EventFilter, TimelineEvent, TimelineSummary};

use crate::cli::{EventFilterArgs, GlobalOpts, TimelineArgs, TimelineCommand};
use crate::error::CliError;
use crate::output::{self, paint};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    event_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Progress")]
    progress: String,
}

impl EventRow {
    fn new(dashboard: &Dashboard, e: &TimelineEvent, now: DateTime<Utc>, color: bool) -> Self {
        let overdue = e.is_overdue(now);
        let status = if overdue {
            format!("{} (overdue)", e.status)
        } else {
            e.status.to_string()
        };
        Self {
            id: e.id.to_string(),
            title: e.title.clone(),
            event_type: e.event_type.to_string(),
            status: paint(&status, util::event_tone(e.status, overdue), color),
            priority: paint(e.priority.as_ref(), util::priority_tone(e.priority), color),
            start: util::date(e.start),
            end: util::date(e.end),
            site: e
                .site_id
                .as_ref()
                .map_or_else(|| "-".into(), |id| util::site_label(dashboard, id)),
            progress: util::percent(e.progress),
        }
    }
}

// ── Filter ──────────────────────────────────────────────────────────

fn event_filter(dashboard: &Dashboard, args: &EventFilterArgs) -> Result<EventFilter, CliError> {
    let site = match util::text_criterion(args.site.as_deref()) {
        Criterion::All => Criterion::All,
        Criterion::Only(identifier) => {
            Criterion::Only(util::resolve_site(dashboard, &identifier)?.id)
        }
    };

    Ok(EventFilter::new()
        .search(args.search.as_deref().unwrap_or_default())
        .event_type(util::criterion("type", args.event_type.as_deref())?)
        .status(util::criterion("status", args.status.as_deref())?)
        .priority(util::criterion("priority", args.priority.as_deref())?)
        .site(site))
}

fn matching(
    dashboard: &Dashboard,
    args: &EventFilterArgs,
) -> Result<Arc<Vec<Arc<TimelineEvent>>>, CliError> {
    Ok(dashboard.event_view(event_filter(dashboard, args)?).rows())
}

// ── Summary ─────────────────────────────────────────────────────────

pub(super) fn summary_fields(s: &TimelineSummary) -> Vec<(String, String)> {
    let milestones: Vec<String> = s
        .upcoming_milestones
        .iter()
        .map(|m| format!("{} {}", util::date(m.start), m.title))
        .collect();

    vec![
        ("Events".into(), s.total.to_string()),
        ("Completed".into(), util::percent(s.completed_percent)),
        ("Average progress".into(), util::percent(s.average_progress)),
        ("Overdue".into(), s.overdue.to_string()),
        ("By status".into(), output::join_counts(&s.by_status)),
        ("By type".into(), output::join_counts(&s.by_type)),
        ("Upcoming milestones".into(), output::join_or_dash(&milestones)),
    ]
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    dashboard: &Dashboard,
    args: TimelineArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = util::color_enabled(global);
    let now = Utc::now();

    match args.command {
        TimelineCommand::List(list) => {
            let events = matching(dashboard, &list)?;
            let out = output::render_list(
                &global.output_format(),
                events.as_slice(),
                |e: &Arc<TimelineEvent>| EventRow::new(dashboard, e, now, color),
                |e| e.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TimelineCommand::Summary(filter) => {
            let summary = TimelineSummary::from_events(&matching(dashboard, &filter)?, now);
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
