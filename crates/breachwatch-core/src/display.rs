// ── Result presentation helpers ──
//
// Shared by the CLI table and the TUI result list so both surfaces show
// the same badges in the same order.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{FilterKind, LoginFormType, ResultRecord, Tag};

/// Severity hint for colouring a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Good,
    Bad,
    Warn,
    Info,
    Muted,
}

/// One status badge for a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StatusIndicator {
    Accessible,
    Inaccessible,
    LoginForm(Option<LoginFormType>),
    Application(String),
    Parked,
    PreviouslyBreached,
    Title(String),
}

impl StatusIndicator {
    /// Badges for `record`, in display order.
    pub fn for_record(record: &ResultRecord) -> Vec<Self> {
        let mut out = Vec::with_capacity(6);
        out.push(if record.is_accessible {
            Self::Accessible
        } else {
            Self::Inaccessible
        });
        if record.has_login_form && record.login_form_type.is_some() {
            out.push(Self::LoginForm(record.login_form_kind()));
        }
        if let Some(app) = non_blank(record.web_application.as_deref()) {
            out.push(Self::Application(app.to_owned()));
        }
        if record.is_parked {
            out.push(Self::Parked);
        }
        if record.is_breached {
            out.push(Self::PreviouslyBreached);
        }
        if let Some(title) = non_blank(record.title.as_deref()) {
            out.push(Self::Title(title.to_owned()));
        }
        out
    }

    pub fn label(&self) -> String {
        match self {
            Self::Accessible => "Accessible".into(),
            Self::Inaccessible => "Inaccessible".into(),
            Self::LoginForm(kind) => kind.map_or("Other Auth", LoginFormType::label).into(),
            Self::Application(name) | Self::Title(name) => name.clone(),
            Self::Parked => "Parked".into(),
            Self::PreviouslyBreached => "Previously Breached".into(),
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Self::Accessible => Tone::Good,
            Self::Inaccessible | Self::PreviouslyBreached => Tone::Bad,
            Self::LoginForm(_) | Self::Parked => Tone::Warn,
            Self::Application(_) => Tone::Info,
            Self::Title(_) => Tone::Muted,
        }
    }
}

impl fmt::Display for StatusIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Value for the `tag` token a selected chip should add.
pub fn tag_token_value(tag: &Tag) -> (FilterKind, String) {
    (FilterKind::Tag, tag.to_string())
}

/// Compact `host:port/path` locator for list rows.
pub fn locator(record: &ResultRecord) -> String {
    let mut out = record.domain.clone();
    if let Some(port) = record.port {
        out.push(':');
        out.push_str(&port.to_string());
    }
    if let Some(path) = record.path.as_deref() {
        if path != "/" {
            out.push_str(path);
        }
    }
    out
}

/// `created_at` as `2024-01-18 10:00 UTC`, or the raw text when it is
/// not RFC 3339.
pub fn first_seen(record: &ResultRecord) -> String {
    DateTime::parse_from_rfc3339(record.created_at.trim()).map_or_else(
        |_| record.created_at.clone(),
        |t| t.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string(),
    )
}
