// ── Runtime search configuration ──
//
// These types describe *how* to reach the backend and how the search
// session behaves. They never touch disk: the CLI/TUI builds a
// `SearchConfig` (usually through breachwatch-config) and hands it in.

use std::time::Duration;

use url::Url;

use crate::error::CoreError;
use crate::model::exclusion::DEFAULT_EXCLUDED_RANGES;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed lab backends).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for breachwatch_api::TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => Self::System,
            TlsVerification::CustomCa(path) => Self::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => Self::DangerAcceptInvalid,
        }
    }
}

/// Configuration for one search session against one backend.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Backend root (e.g., `http://localhost:5000`).
    pub api_url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Quiet period between the last mutation and the fetch it triggers.
    pub debounce: Duration,
    /// Page size sent with every search.
    pub per_page: u32,
    /// Exclusion ranges a fresh session starts with.
    pub excluded_ranges: Vec<String>,
}

impl SearchConfig {
    pub const DEFAULT_API_URL: &'static str = "http://localhost:5000";
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
    pub const DEFAULT_PER_PAGE: u32 = 50;

    /// Defaults pointed at `api_url`.
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            debounce: Self::DEFAULT_DEBOUNCE,
            per_page: Self::DEFAULT_PER_PAGE,
            excluded_ranges: DEFAULT_EXCLUDED_RANGES
                .iter()
                .map(|r| (*r).to_owned())
                .collect(),
        }
    }

    /// Transport settings for the HTTP client.
    pub fn transport(&self) -> breachwatch_api::TransportConfig {
        breachwatch_api::TransportConfig {
            tls: (&self.tls).into(),
            timeout: self.timeout,
        }
    }

    /// Build the HTTP client for this backend.
    pub fn build_client(&self) -> Result<breachwatch_api::BreachClient, CoreError> {
        Ok(breachwatch_api::BreachClient::new(
            self.api_url.clone(),
            &self.transport(),
        )?)
    }
}
