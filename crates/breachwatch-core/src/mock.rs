// ── Bundled fallback dataset ──
//
// Shown (after local filtering) whenever the backend cannot answer. Built
// as wire records and pushed through the same conversion as live data, so
// the tag normalizer sees every shape the backend has ever produced.

use std::sync::LazyLock;

use serde_json::{Value, json};

use breachwatch_api::BreachRecord;

use crate::model::ResultRecord;

static FALLBACK: LazyLock<Vec<ResultRecord>> = LazyLock::new(|| {
    raw_records().into_iter().map(ResultRecord::from).collect()
});

/// The fallback records, normalized.
pub fn fallback_records() -> Vec<ResultRecord> {
    FALLBACK.clone()
}

#[allow(clippy::too_many_lines)]
fn raw_records() -> Vec<BreachRecord> {
    vec![
        BreachRecord {
            id: 1,
            uri: "https://example.com/login".into(),
            username: Some("admin".into()),
            password: Some("redacted".into()),
            domain: "example.com".into(),
            ip_address: Some("192.168.1.1".into()),
            port: Some(443),
            path: Some("/login".into()),
            // Object tags, JSON-encoded in a string.
            tags: Value::String(
                json!({ "type": "ecommerce", "priority": "high", "environment": "production" })
                    .to_string(),
            ),
            title: Some("Admin Login".into()),
            is_resolved: false,
            is_accessible: true,
            has_login_form: true,
            login_form_type: Some("basic".into()),
            web_application: Some("WordPress".into()),
            is_parked: false,
            is_breached: true,
            created_at: "2024-01-18T10:00:00Z".into(),
        },
        BreachRecord {
            id: 2,
            uri: "https://test.example.org:8080/admin".into(),
            username: Some("operator".into()),
            password: Some("redacted".into()),
            domain: "test.example.org".into(),
            ip_address: Some("10.0.0.1".into()),
            port: Some(8080),
            path: Some("/admin".into()),
            tags: json!(["medium", "resolved", "internal"]),
            title: Some("Admin Panel".into()),
            is_resolved: true,
            is_accessible: true,
            has_login_form: true,
            login_form_type: Some("captcha".into()),
            web_application: Some("Custom".into()),
            is_parked: false,
            is_breached: false,
            created_at: "2024-01-17T15:30:00Z".into(),
        },
        BreachRecord {
            id: 3,
            uri: "https://portal.acme-health.com/owa/auth/logon.aspx".into(),
            username: Some("j.doe".into()),
            password: Some("redacted".into()),
            domain: "portal.acme-health.com".into(),
            ip_address: Some("203.0.113.24".into()),
            port: Some(443),
            path: Some("/owa/auth/logon.aspx".into()),
            tags: json!({ "priority": "critical", "sector": "healthcare" }),
            title: Some("Outlook Web App".into()),
            is_resolved: false,
            is_accessible: true,
            has_login_form: true,
            login_form_type: Some("otp".into()),
            web_application: Some("Exchange".into()),
            is_parked: false,
            is_breached: true,
            created_at: "2024-01-16T08:12:00Z".into(),
        },
        BreachRecord {
            id: 4,
            uri: "http://parked-domain.net/".into(),
            domain: "parked-domain.net".into(),
            ip_address: Some("198.51.100.7".into()),
            port: Some(80),
            path: Some("/".into()),
            tags: Value::Null,
            title: Some("This domain is for sale".into()),
            is_resolved: false,
            is_accessible: false,
            has_login_form: false,
            is_parked: true,
            is_breached: false,
            created_at: "2024-01-15T22:45:00Z".into(),
            ..BreachRecord::default()
        },
        BreachRecord {
            id: 5,
            uri: "https://vpn.globex.io/vpn/index.html".into(),
            username: Some("svc-backup".into()),
            password: Some("redacted".into()),
            domain: "vpn.globex.io".into(),
            ip_address: Some("198.51.100.42".into()),
            port: Some(443),
            path: Some("/vpn/index.html".into()),
            // Truncated upstream; normalizes to no tags.
            tags: json!("{"),
            title: Some("Citrix Gateway".into()),
            is_resolved: false,
            is_accessible: true,
            has_login_form: true,
            login_form_type: Some("other".into()),
            web_application: Some("Citrix".into()),
            is_parked: false,
            is_breached: true,
            created_at: "2024-01-14T11:05:00Z".into(),
        },
        BreachRecord {
            id: 6,
            uri: "http://intranet.local/".into(),
            domain: "intranet.local".into(),
            ip_address: None,
            tags: json!(["internal"]),
            title: Some("Staff Intranet".into()),
            is_resolved: true,
            is_accessible: false,
            created_at: "2024-01-13T09:00:00Z".into(),
            ..BreachRecord::default()
        },
    ]
}
