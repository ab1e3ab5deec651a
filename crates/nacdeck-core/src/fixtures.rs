// ── Hand-authored demo data ──
//
// A small, internally consistent rollout: every reference resolves and
// the event dependency graph is acyclic.

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{
    Budget, Coordinates, DeploymentStatus, EntityId, EventStatus, EventType, Location,
    NetworkProfile, Policy, PolicyCategory, PolicyStatus, PolicyType, Priority, Project,
    RiskLevel, Site, TimelineEvent,
};
use crate::store::DashboardSnapshot;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn at(y: i32, m: u32, d: u32, hour: u32) -> DateTime<Utc> {
    date(y, m, d)
        .and_hms_opt(hour, 0, 0)
        .map(|t| t.and_utc())
        .unwrap_or_default()
}

fn id(slug: &str) -> EntityId {
    EntityId::from(slug)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

fn location(region: &str, country: &str, city: &str, timezone: &str, lat: f64, lon: f64) -> Location {
    Location {
        region: region.into(),
        country: country.into(),
        city: city.into(),
        address: String::new(),
        timezone: timezone.into(),
        coordinates: Some(Coordinates {
            latitude: lat,
            longitude: lon,
        }),
    }
}

pub fn sites() -> Vec<Site> {
    vec![
        Site {
            id: id("site-nyc-hq"),
            name: "NYC HQ".into(),
            site_code: "NYC-HQ".into(),
            location: Location {
                address: "350 Fifth Avenue".into(),
                ..location("North America", "United States", "New York", "America/New_York", 40.748, -73.985)
            },
            status: DeploymentStatus::InProgress,
            priority: Priority::Critical,
            progress: 65,
            risk_level: RiskLevel::Medium,
            network: NetworkProfile {
                switches: 48,
                access_points: 220,
                firewalls: 4,
                vlans: 36,
                ad_integration: true,
                certificate_auth: true,
                guest_network: true,
                byod: true,
            },
            budget: Some(Budget::new(480_000.0, "USD")),
            tags: strings(&["headquarters", "pci", "flagship"]),
            stakeholders: strings(&["J. Alvarez (CISO)", "Network Engineering"]),
            compliance_frameworks: strings(&["PCI-DSS", "SOC 2"]),
            go_live: Some(date(2026, 4, 15)),
        },
        Site {
            id: id("site-lon-office"),
            name: "London Office".into(),
            site_code: "LON-01".into(),
            location: location("Europe", "United Kingdom", "London", "Europe/London", 51.515, -0.092),
            status: DeploymentStatus::Testing,
            priority: Priority::High,
            progress: 80,
            risk_level: RiskLevel::Low,
            network: NetworkProfile {
                switches: 18,
                access_points: 64,
                firewalls: 2,
                vlans: 12,
                ad_integration: true,
                certificate_auth: true,
                guest_network: true,
                byod: false,
            },
            budget: Some(Budget::new(150_000.0, "GBP")),
            tags: strings(&["regional-hub", "gdpr"]),
            stakeholders: strings(&["EMEA IT"]),
            compliance_frameworks: strings(&["GDPR", "ISO 27001"]),
            go_live: Some(date(2026, 3, 2)),
        },
        Site {
            id: id("site-fra-dc"),
            name: "Frankfurt Data Center".into(),
            site_code: "FRA-DC".into(),
            location: location("Europe", "Germany", "Frankfurt", "Europe/Berlin", 50.110, 8.682),
            status: DeploymentStatus::Completed,
            priority: Priority::High,
            progress: 100,
            risk_level: RiskLevel::Low,
            network: NetworkProfile {
                switches: 32,
                access_points: 6,
                firewalls: 6,
                vlans: 48,
                ad_integration: true,
                certificate_auth: true,
                guest_network: false,
                byod: false,
            },
            budget: Some(Budget::new(210_000.0, "EUR")),
            tags: strings(&["datacenter", "gdpr"]),
            stakeholders: strings(&["EMEA IT", "Infrastructure"]),
            compliance_frameworks: strings(&["GDPR", "ISO 27001"]),
            go_live: Some(date(2025, 11, 10)),
        },
        Site {
            id: id("site-sfo-office"),
            name: "San Francisco Office".into(),
            site_code: "SFO-02".into(),
            location: location("North America", "United States", "San Francisco", "America/Los_Angeles", 37.789, -122.401),
            status: DeploymentStatus::Planning,
            priority: Priority::Medium,
            progress: 10,
            risk_level: RiskLevel::High,
            network: NetworkProfile {
                switches: 12,
                access_points: 58,
                firewalls: 2,
                vlans: 10,
                ad_integration: true,
                certificate_auth: false,
                guest_network: true,
                byod: true,
            },
            budget: Some(Budget::new(95_000.0, "USD")),
            tags: strings(&["engineering"]),
            stakeholders: strings(&["West Coast IT"]),
            compliance_frameworks: strings(&["SOC 2"]),
            go_live: Some(date(2026, 7, 1)),
        },
        Site {
            id: id("site-sin-campus"),
            name: "Singapore Campus".into(),
            site_code: "SIN-01".into(),
            location: location("APAC", "Singapore", "Singapore", "Asia/Singapore", 1.283, 103.851),
            status: DeploymentStatus::InProgress,
            priority: Priority::High,
            progress: 35,
            risk_level: RiskLevel::Critical,
            network: NetworkProfile {
                switches: 24,
                access_points: 140,
                firewalls: 3,
                vlans: 20,
                ad_integration: false,
                certificate_auth: true,
                guest_network: true,
                byod: true,
            },
            budget: Some(Budget::new(260_000.0, "SGD")),
            tags: strings(&["regional-hub", "manufacturing"]),
            stakeholders: strings(&["APAC IT", "OT Security"]),
            compliance_frameworks: strings(&["ISO 27001"]),
            go_live: Some(date(2026, 5, 18)),
        },
        Site {
            id: id("site-aus-branch"),
            name: "Austin Branch".into(),
            site_code: "AUS-03".into(),
            location: location("North America", "United States", "Austin", "America/Chicago", 30.267, -97.743),
            status: DeploymentStatus::OnHold,
            priority: Priority::Low,
            progress: 20,
            risk_level: RiskLevel::Medium,
            network: NetworkProfile {
                switches: 4,
                access_points: 16,
                firewalls: 1,
                vlans: 4,
                ad_integration: true,
                certificate_auth: false,
                guest_network: true,
                byod: false,
            },
            budget: Some(Budget {
                amount: None,
                currency: "USD".into(),
            }),
            tags: strings(&["branch", "retail"]),
            stakeholders: strings(&["Facilities"]),
            compliance_frameworks: strings(&["PCI-DSS"]),
            go_live: None,
        },
        Site {
            id: id("site-tor-branch"),
            name: "Toronto Branch".into(),
            site_code: "TOR-04".into(),
            location: location("North America", "Canada", "Toronto", "America/Toronto", 43.648, -79.381),
            status: DeploymentStatus::Cancelled,
            priority: Priority::Low,
            progress: 0,
            risk_level: RiskLevel::Low,
            network: NetworkProfile::default(),
            budget: None,
            tags: strings(&["branch"]),
            stakeholders: vec![],
            compliance_frameworks: vec![],
            go_live: None,
        },
    ]
}

pub fn policies() -> Vec<Policy> {
    vec![
        Policy {
            id: id("pol-corp-dot1x"),
            name: "Corporate 802.1X Authentication".into(),
            description: "EAP-TLS for managed laptops on the corporate SSID and wired ports".into(),
            policy_type: PolicyType::AccessControl,
            category: PolicyCategory::Security,
            status: PolicyStatus::Active,
            priority: Priority::Critical,
            conditions: strings(&["device.certificate is valid", "user.group in employees"]),
            actions: strings(&["assign VLAN corp", "allow"]),
            effectiveness: 94,
            violations: 12,
            applied_sites: vec![id("site-nyc-hq"), id("site-lon-office"), id("site-fra-dc")],
            last_modified: at(2026, 1, 20, 14),
        },
        Policy {
            id: id("pol-endpoint-compliance"),
            name: "Endpoint Compliance Check".into(),
            description: "Posture assessment before network admission".into(),
            policy_type: PolicyType::DeviceCompliance,
            category: PolicyCategory::Compliance,
            status: PolicyStatus::Active,
            priority: Priority::High,
            conditions: strings(&["antivirus running", "os patch age < 30 days", "disk encrypted"]),
            actions: strings(&["allow when compliant", "redirect to remediation portal"]),
            effectiveness: 88,
            violations: 37,
            applied_sites: vec![id("site-nyc-hq"), id("site-sin-campus")],
            last_modified: at(2026, 2, 3, 9),
        },
        Policy {
            id: id("pol-guest-wifi"),
            name: "Guest Wi-Fi Access".into(),
            description: "Sponsored guest access with an eight hour lease".into(),
            policy_type: PolicyType::GuestAccess,
            category: PolicyCategory::Access,
            status: PolicyStatus::Active,
            priority: Priority::Medium,
            conditions: strings(&["ssid is Guest", "sponsor approved"]),
            actions: strings(&["assign VLAN guest", "internet only", "bandwidth 10 Mbps"]),
            effectiveness: 91,
            violations: 5,
            applied_sites: vec![id("site-nyc-hq"), id("site-lon-office"), id("site-sfo-office")],
            last_modified: at(2025, 12, 11, 16),
        },
        Policy {
            id: id("pol-byod-onboarding"),
            name: "BYOD Onboarding".into(),
            description: "Self-service registration for personal phones and tablets".into(),
            policy_type: PolicyType::Byod,
            category: PolicyCategory::Access,
            status: PolicyStatus::Inactive,
            priority: Priority::Medium,
            conditions: strings(&["device owner registered", "mdm enrolled"]),
            actions: strings(&["assign VLAN byod", "limit to internet and email"]),
            effectiveness: 72,
            violations: 9,
            applied_sites: vec![id("site-sfo-office")],
            last_modified: at(2025, 10, 28, 11),
        },
        Policy {
            id: id("pol-quarantine"),
            name: "Non-Compliant Quarantine".into(),
            description: "Isolate devices that fail posture checks".into(),
            policy_type: PolicyType::Quarantine,
            category: PolicyCategory::Security,
            status: PolicyStatus::Draft,
            priority: Priority::High,
            conditions: strings(&["posture failed"]),
            actions: strings(&["assign VLAN quarantine", "notify SOC"]),
            effectiveness: 0,
            violations: 0,
            applied_sites: vec![],
            last_modified: at(2026, 2, 10, 10),
        },
        Policy {
            id: id("pol-iot-segmentation"),
            name: "IoT Segmentation".into(),
            description: "Legacy profiling rules for printers and cameras".into(),
            policy_type: PolicyType::Segmentation,
            category: PolicyCategory::Network,
            status: PolicyStatus::Deprecated,
            priority: Priority::Low,
            conditions: strings(&["device.profile in printer, camera"]),
            actions: strings(&["assign VLAN iot", "deny east-west"]),
            effectiveness: 65,
            violations: 21,
            applied_sites: vec![id("site-fra-dc"), id("site-sin-campus")],
            last_modified: at(2025, 6, 2, 8),
        },
    ]
}

pub fn events() -> Vec<TimelineEvent> {
    vec![
        TimelineEvent {
            id: id("evt-kickoff"),
            title: "Rollout kickoff".into(),
            description: "Scope, owners and success criteria agreed".into(),
            event_type: EventType::Meeting,
            status: EventStatus::Completed,
            priority: Priority::High,
            start: at(2026, 1, 12, 9),
            end: at(2026, 1, 12, 11),
            assignees: strings(&["J. Alvarez", "M. Chen"]),
            site_id: Some(id("site-nyc-hq")),
            dependencies: vec![],
            progress: 100,
        },
        TimelineEvent {
            id: id("evt-fra-cutover"),
            title: "Frankfurt cutover".into(),
            description: "Switch enforcement from monitor to closed mode".into(),
            event_type: EventType::Deployment,
            status: EventStatus::Completed,
            priority: Priority::High,
            start: at(2025, 11, 3, 6),
            end: at(2025, 11, 7, 18),
            assignees: strings(&["K. Weber"]),
            site_id: Some(id("site-fra-dc")),
            dependencies: vec![],
            progress: 100,
        },
        TimelineEvent {
            id: id("evt-lon-survey"),
            title: "London wired survey".into(),
            description: "Inventory switch ports and unmanaged hubs".into(),
            event_type: EventType::Task,
            status: EventStatus::Delayed,
            priority: Priority::Medium,
            start: at(2026, 1, 19, 9),
            end: at(2026, 2, 6, 17),
            assignees: strings(&["P. Okafor"]),
            site_id: Some(id("site-lon-office")),
            dependencies: vec![id("evt-kickoff")],
            progress: 40,
        },
        TimelineEvent {
            id: id("evt-nyc-pilot"),
            title: "NYC pilot deployment".into(),
            description: "Monitor mode on floors 10 to 14".into(),
            event_type: EventType::Deployment,
            status: EventStatus::InProgress,
            priority: Priority::Critical,
            start: at(2026, 2, 2, 8),
            end: at(2026, 3, 13, 18),
            assignees: strings(&["M. Chen", "Network Engineering"]),
            site_id: Some(id("site-nyc-hq")),
            dependencies: vec![id("evt-kickoff")],
            progress: 60,
        },
        TimelineEvent {
            id: id("evt-policy-review"),
            title: "Policy review workshop".into(),
            description: "Walk through quarantine and BYOD rules with security".into(),
            event_type: EventType::Meeting,
            status: EventStatus::Scheduled,
            priority: Priority::Medium,
            start: at(2026, 3, 2, 14),
            end: at(2026, 3, 2, 16),
            assignees: strings(&["J. Alvarez", "SOC"]),
            site_id: None,
            dependencies: vec![id("evt-kickoff")],
            progress: 0,
        },
        TimelineEvent {
            id: id("evt-pilot-signoff"),
            title: "Pilot sign-off".into(),
            description: "Go / no-go for closed mode at headquarters".into(),
            event_type: EventType::Milestone,
            status: EventStatus::Scheduled,
            priority: Priority::Critical,
            start: at(2026, 3, 16, 10),
            end: at(2026, 3, 16, 11),
            assignees: strings(&["J. Alvarez"]),
            site_id: Some(id("site-nyc-hq")),
            dependencies: vec![id("evt-nyc-pilot")],
            progress: 0,
        },
        TimelineEvent {
            id: id("evt-admin-training"),
            title: "NAC admin training".into(),
            description: "Hands-on sessions for regional administrators".into(),
            event_type: EventType::Training,
            status: EventStatus::Scheduled,
            priority: Priority::Low,
            start: at(2026, 3, 23, 9),
            end: at(2026, 3, 25, 17),
            assignees: strings(&["Vendor PS", "P. Okafor"]),
            site_id: None,
            dependencies: vec![],
            progress: 0,
        },
        TimelineEvent {
            id: id("evt-apac-go-live"),
            title: "Singapore go-live".into(),
            description: "Closed mode across the campus".into(),
            event_type: EventType::Milestone,
            status: EventStatus::Scheduled,
            priority: Priority::High,
            start: at(2026, 5, 18, 8),
            end: at(2026, 5, 18, 12),
            assignees: strings(&["APAC IT"]),
            site_id: Some(id("site-sin-campus")),
            dependencies: vec![id("evt-pilot-signoff")],
            progress: 0,
        },
        TimelineEvent {
            id: id("evt-global-complete"),
            title: "Global rollout complete".into(),
            description: String::new(),
            event_type: EventType::Milestone,
            status: EventStatus::Scheduled,
            priority: Priority::High,
            start: at(2026, 9, 30, 9),
            end: at(2026, 9, 30, 17),
            assignees: strings(&["J. Alvarez"]),
            site_id: None,
            dependencies: vec![id("evt-apac-go-live"), id("evt-lon-survey")],
            progress: 0,
        },
    ]
}

pub fn projects() -> Vec<Project> {
    vec![
        Project {
            id: id("prj-global-nac"),
            name: "Global NAC Rollout".into(),
            description: "802.1X and posture enforcement at every corporate site".into(),
            status: DeploymentStatus::InProgress,
            progress: 45,
            site_ids: vec![
                id("site-nyc-hq"),
                id("site-lon-office"),
                id("site-fra-dc"),
                id("site-sfo-office"),
                id("site-sin-campus"),
            ],
            start: date(2025, 10, 1),
            target_end: date(2026, 9, 30),
            budget: Some(Budget::new(1_250_000.0, "USD")),
        },
        Project {
            id: id("prj-emea-compliance"),
            name: "EMEA Compliance Hardening".into(),
            description: "GDPR evidence collection for access decisions".into(),
            status: DeploymentStatus::Planning,
            progress: 10,
            site_ids: vec![id("site-lon-office"), id("site-fra-dc")],
            start: date(2026, 2, 1),
            target_end: date(2026, 8, 31),
            budget: Some(Budget::new(320_000.0, "EUR")),
        },
        Project {
            id: id("prj-branch-refresh"),
            name: "Branch Refresh".into(),
            description: "Replace unmanaged branch switches before enforcement".into(),
            status: DeploymentStatus::OnHold,
            progress: 15,
            site_ids: vec![id("site-aus-branch"), id("site-tor-branch")],
            start: date(2026, 1, 5),
            target_end: date(2026, 12, 18),
            budget: Some(Budget {
                amount: None,
                currency: "USD".into(),
            }),
        },
    ]
}

/// Every fixture collection in one snapshot.
pub fn snapshot() -> DashboardSnapshot {
    DashboardSnapshot {
        sites: sites(),
        policies: policies(),
        events: events(),
        projects: projects(),
    }
}
