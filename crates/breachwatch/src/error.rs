//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use breachwatch_config::ConfigError;
use breachwatch_core::{CoreError, RangeError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CONFIG: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend at {url}")]
    #[diagnostic(
        code(breachwatch::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Reason: {reason}\n\
             Drop --strict to fall back to sample data, or use --offline."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(breachwatch::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── Backend ──────────────────────────────────────────────────────
    #[error("Backend error: {message}")]
    #[diagnostic(code(breachwatch::api_error))]
    Api {
        message: String,
        status: Option<u16>,
    },

    #[error("Backend returned an unreadable response: {message}")]
    #[diagnostic(
        code(breachwatch::malformed),
        help("Is --api-url pointing at a breachwatch backend?")
    )]
    Malformed { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(breachwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(breachwatch::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: breachwatch config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Invalid configuration value for {field}: {reason}")]
    #[diagnostic(
        code(breachwatch::invalid_config),
        help("Fix the value in your config file (see: breachwatch config path).")
    )]
    InvalidConfig { field: String, reason: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(breachwatch::config))]
    Config { message: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. } | Self::InvalidConfig { .. } | Self::Config { .. } => {
                exit_code::CONFIG
            }
            Self::Api { .. } | Self::Malformed { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout => Self::Timeout,
            CoreError::Api { message, status } => Self::Api { message, status },
            CoreError::Malformed { message } => Self::Malformed { message },
            CoreError::InvalidRange(e) => e.into(),
            CoreError::Config { message } => Self::Config { message },
        }
    }
}

impl From<RangeError> for CliError {
    fn from(err: RangeError) -> Self {
        Self::Validation {
            field: "exclude".into(),
            reason: err.to_string(),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::InvalidConfig { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
