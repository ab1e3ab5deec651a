//! Shared helpers for command handlers.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use strum::IntoEnumIterator;

use nacdeck_core::{
    Budget, Criterion, Dashboard, DeploymentStatus, EntityId, EventStatus, PolicyStatus, Priority,
    RiskLevel, Site,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, Tone};

/// Whether this invocation should emit ANSI colors.
pub fn color_enabled(global: &GlobalOpts) -> bool {
    output::should_color(&global.color_mode())
}

// ── Filter parsing ──────────────────────────────────────────────────

/// Parse a categorical flag. Absent, empty or `all` means no constraint.
pub fn criterion<T>(flag: &str, value: Option<&str>) -> Result<Criterion<T>, CliError>
where
    T: FromStr + IntoEnumIterator + AsRef<str>,
{
    let Some(raw) = value else {
        return Ok(Criterion::All);
    };
    raw.parse::<Criterion<T>>()
        .map_err(|_| CliError::InvalidValue {
            flag: flag.into(),
            value: raw.into(),
            expected: expected_values::<T>(),
        })
}

/// Parse a value that must name a single variant (no `all`).
pub fn variant<T>(flag: &str, raw: &str) -> Result<T, CliError>
where
    T: FromStr + IntoEnumIterator + AsRef<str>,
{
    raw.trim().parse::<T>().map_err(|_| CliError::InvalidValue {
        flag: flag.into(),
        value: raw.into(),
        expected: T::iter()
            .map(|v| v.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

fn expected_values<T: IntoEnumIterator + AsRef<str>>() -> String {
    std::iter::once("all".to_owned())
        .chain(T::iter().map(|v| v.as_ref().to_owned()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Free-form exact-match criterion (regions).
pub fn text_criterion(value: Option<&str>) -> Criterion<String> {
    match value.map(str::trim) {
        None | Some("") => Criterion::All,
        Some(v) if v.eq_ignore_ascii_case("all") => Criterion::All,
        Some(v) => Criterion::Only(v.to_owned()),
    }
}

/// Resolve a site id or site code, failing with a list hint.
pub fn resolve_site(dashboard: &Dashboard, identifier: &str) -> Result<Site, CliError> {
    dashboard
        .store()
        .find_site(identifier)
        .map(|s| (*s).clone())
        .ok_or_else(|| CliError::NotFound {
            resource_type: "site".into(),
            identifier: identifier.into(),
            list_command: "sites list".into(),
        })
}

/// Site code for display, falling back to the raw id.
pub fn site_label(dashboard: &Dashboard, id: &EntityId) -> String {
    dashboard
        .store()
        .site(id)
        .map_or_else(|| id.to_string(), |s| s.site_code.clone())
}

// ── Display helpers ─────────────────────────────────────────────────

pub fn percent(value: impl Into<u32>) -> String {
    format!("{}%", value.into())
}

pub fn budget(budget: Option<&Budget>) -> String {
    match budget {
        None => "-".into(),
        Some(Budget {
            amount: None,
            currency,
        }) => format!("TBD {currency}"),
        Some(Budget {
            amount: Some(amount),
            currency,
        }) => format!("{} {currency}", thousands(*amount)),
    }
}

/// Whole units with `,` separators.
pub fn thousands(amount: f64) -> String {
    let rounded = format!("{:.0}", amount.abs());
    let mut out = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if amount < 0.0 && rounded != "0" {
        out.insert(0, '-');
    }
    out
}

pub fn date(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub fn day(value: Option<NaiveDate>) -> String {
    value.map_or_else(|| "-".into(), |d| d.format("%Y-%m-%d").to_string())
}

// ── Tones ───────────────────────────────────────────────────────────

pub fn deployment_tone(status: DeploymentStatus) -> Tone {
    match status {
        DeploymentStatus::Completed => Tone::Good,
        DeploymentStatus::InProgress | DeploymentStatus::Testing => Tone::Busy,
        DeploymentStatus::OnHold => Tone::Warn,
        DeploymentStatus::Planning | DeploymentStatus::Cancelled => Tone::Muted,
    }
}

pub fn policy_tone(status: PolicyStatus) -> Tone {
    match status {
        PolicyStatus::Active => Tone::Good,
        PolicyStatus::Draft => Tone::Busy,
        PolicyStatus::Inactive => Tone::Warn,
        PolicyStatus::Deprecated => Tone::Muted,
    }
}

pub fn event_tone(status: EventStatus, overdue: bool) -> Tone {
    if overdue {
        return Tone::Bad;
    }
    match status {
        EventStatus::Completed => Tone::Good,
        EventStatus::InProgress => Tone::Busy,
        EventStatus::Delayed => Tone::Warn,
        EventStatus::Scheduled | EventStatus::Cancelled => Tone::Muted,
    }
}

pub fn risk_tone(risk: RiskLevel) -> Tone {
    match risk {
        RiskLevel::Low => Tone::Good,
        RiskLevel::Medium => Tone::Muted,
        RiskLevel::High => Tone::Warn,
        RiskLevel::Critical => Tone::Bad,
    }
}

pub fn priority_tone(priority: Priority) -> Tone {
    match priority {
        Priority::Critical => Tone::Bad,
        Priority::High => Tone::Warn,
        Priority::Medium | Priority::Low => Tone::Muted,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn criterion_accepts_all_and_variants() {
        assert!(
            criterion::<DeploymentStatus>("status", None)
                .unwrap()
                .is_all()
        );
        assert!(
            criterion::<DeploymentStatus>("status", Some("ALL"))
                .unwrap()
                .is_all()
        );
        assert_eq!(
            criterion::<DeploymentStatus>("status", Some("in-progress")).unwrap(),
            Criterion::Only(DeploymentStatus::InProgress)
        );
    }

    #[test]
    fn criterion_rejects_unknown_values_with_choices() {
        let err = criterion::<RiskLevel>("risk", Some("extreme")).unwrap_err();
        match err {
            CliError::InvalidValue { flag, expected, .. } => {
                assert_eq!(flag, "risk");
                assert_eq!(expected, "all, low, medium, high, critical");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn region_criterion() {
        assert!(text_criterion(Some(" all ")).is_all());
        assert_eq!(
            text_criterion(Some("Europe")),
            Criterion::Only("Europe".to_owned())
        );
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.4), "999");
        assert_eq!(thousands(1_250_000.0), "1,250,000");
        assert_eq!(thousands(-4_500.0), "-4,500");
    }

    #[test]
    fn budget_display() {
        assert_eq!(budget(None), "-");
        assert_eq!(budget(Some(&Budget::new(12_000.0, "EUR"))), "12,000 EUR");
        let tbd = Budget {
            amount: None,
            currency: "USD".into(),
        };
        assert_eq!(budget(Some(&tbd)), "TBD USD");
    }
}
