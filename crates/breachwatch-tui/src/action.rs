//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use breachwatch_core::{FilterKind, MetricsReport, SearchSnapshot, TokenId};

use crate::screen::ScreenId;

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ─────────────────────────────────────────────────
    Quit,
    Tick,
    Render,

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    ToggleHelp,

    // ── Search session mutations ──────────────────────────────────
    SetQuery(String),
    AddToken(FilterKind, String),
    RemoveToken(TokenId),
    ClearTokens,
    AddExclusion(String),
    RemoveExclusion(String),
    SetPage(u32),
    Refresh,

    // ── Data updates ──────────────────────────────────────────────
    SnapshotUpdated(Arc<SearchSnapshot>),
    MetricsUpdated(Arc<MetricsReport>),
    /// Ask the bridge to reload statistics now.
    RefreshMetrics,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}
