//! Shared configuration for the breachwatch CLI and TUI.
//!
//! TOML profiles layered with `BREACHWATCH_` environment overrides, and
//! translation to `breachwatch_core::SearchConfig`. Both binaries depend
//! on this crate; the CLI adds flag-aware wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use breachwatch_core::{
    DEFAULT_EXCLUDED_RANGES, ExclusionRangeSet, SearchConfig, TlsVerification,
};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Quiet period before a search fires, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_per_page")]
    pub per_page: u32,

    #[serde(default = "default_excluded_ranges")]
    pub excluded_ip_ranges: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            debounce_ms: default_debounce_ms(),
            per_page: default_per_page(),
            excluded_ip_ranges: default_excluded_ranges(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_debounce_ms() -> u64 {
    300
}
fn default_per_page() -> u32 {
    SearchConfig::DEFAULT_PER_PAGE
}
fn default_excluded_ranges() -> Vec<String> {
    DEFAULT_EXCLUDED_RANGES
        .iter()
        .map(|r| (*r).to_owned())
        .collect()
}

/// A named backend profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "http://localhost:5000").
    pub api_url: String,

    /// Accept invalid TLS certificates.
    pub insecure: Option<bool>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override page size.
    pub per_page: Option<u32>,

    /// Override the exclusion list a session starts with.
    pub excluded_ip_ranges: Option<Vec<String>>,
}

impl Profile {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            insecure: None,
            ca_cert: None,
            timeout: None,
            per_page: None,
            excluded_ip_ranges: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "breachwatch", "breachwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("breachwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path, still layering environment overrides.
///
/// A missing file is not an error: defaults and environment apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("BREACHWATCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to runtime config ───────────────────────────────────

/// Pick the profile to use: `requested`, else `default_profile`.
///
/// Returns `None` when no profile was asked for and the default is not
/// defined, meaning "use built-in defaults".
pub fn select_profile<'a>(
    cfg: &'a Config,
    requested: Option<&str>,
) -> Result<Option<(&'a str, &'a Profile)>, ConfigError> {
    if let Some(name) = requested {
        return cfg
            .profiles
            .get_key_value(name)
            .map(|(k, p)| Some((k.as_str(), p)))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() });
    }
    Ok(cfg
        .default_profile
        .as_deref()
        .and_then(|name| cfg.profiles.get_key_value(name))
        .map(|(k, p)| (k.as_str(), p)))
}

/// Build a `SearchConfig` from defaults plus an optional profile.
pub fn to_search_config(
    defaults: &Defaults,
    profile: Option<&Profile>,
) -> Result<SearchConfig, ConfigError> {
    let raw_url = profile.map_or(SearchConfig::DEFAULT_API_URL, |p| p.api_url.as_str());
    let api_url: url::Url = raw_url.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw_url}"),
    })?;

    let mut config = SearchConfig::new(api_url);

    config.tls = match profile {
        Some(p) if p.insecure.unwrap_or(false) => TlsVerification::DangerAcceptInvalid,
        Some(Profile {
            ca_cert: Some(path),
            ..
        }) => TlsVerification::CustomCa(path.clone()),
        _ => TlsVerification::SystemDefaults,
    };

    config.timeout = Duration::from_secs(
        profile
            .and_then(|p| p.timeout)
            .unwrap_or(defaults.timeout),
    );
    config.debounce = Duration::from_millis(defaults.debounce_ms);

    let per_page = profile
        .and_then(|p| p.per_page)
        .unwrap_or(defaults.per_page);
    if per_page == 0 {
        return Err(ConfigError::Validation {
            field: "per_page".into(),
            reason: "must be at least 1".into(),
        });
    }
    config.per_page = per_page;

    let ranges = profile
        .and_then(|p| p.excluded_ip_ranges.clone())
        .unwrap_or_else(|| defaults.excluded_ip_ranges.clone());
    ExclusionRangeSet::parse_all(&ranges).map_err(|e| ConfigError::Validation {
        field: "excluded_ip_ranges".into(),
        reason: e.to_string(),
    })?;
    config.excluded_ranges = ranges;

    Ok(config)
}

/// Build a `SearchConfig` from a named profile. No CLI flag overrides;
/// suitable for the TUI.
pub fn profile_to_search_config(
    cfg: &Config,
    requested: Option<&str>,
) -> Result<SearchConfig, ConfigError> {
    let profile = select_profile(cfg, requested)?.map(|(_, p)| p);
    to_search_config(&cfg.defaults, profile)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
output = "json"
debounce_ms = 150

[profiles.lab]
api_url = "https://breach.lab.internal:8443"
insecure = true
per_page = 25
excluded_ip_ranges = ["10.0.0.0/8"]

[profiles.prod]
api_url = "https://breach.example.com"
ca_cert = "/etc/breachwatch/ca.pem"
timeout = 5
"#;

    fn load_sample() -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        load_config_from(&path).unwrap()
    }

    #[test]
    fn file_overrides_defaults() {
        let cfg = load_sample();
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.debounce_ms, 150);
        assert_eq!(cfg.defaults.per_page, 50);
        assert_eq!(cfg.defaults.excluded_ip_ranges.len(), 4);
        assert_eq!(cfg.profiles.len(), 2);
    }

    #[test]
    fn default_profile_translation() {
        let cfg = load_sample();
        let search = profile_to_search_config(&cfg, None).unwrap();

        assert_eq!(search.api_url.as_str(), "https://breach.lab.internal:8443/");
        assert_eq!(search.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(search.per_page, 25);
        assert_eq!(search.debounce, Duration::from_millis(150));
        assert_eq!(search.excluded_ranges, vec!["10.0.0.0/8".to_owned()]);
    }

    #[test]
    fn named_profile_translation() {
        let cfg = load_sample();
        let search = profile_to_search_config(&cfg, Some("prod")).unwrap();

        assert_eq!(
            search.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/breachwatch/ca.pem"))
        );
        assert_eq!(search.timeout, Duration::from_secs(5));
        assert_eq!(search.excluded_ranges.len(), 4);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = load_sample();
        let err = profile_to_search_config(&cfg, Some("staging")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { name } if name == "staging"));
    }

    #[test]
    fn no_profiles_uses_builtin_backend() {
        let search = profile_to_search_config(&Config::default(), None).unwrap();
        assert_eq!(search.api_url.as_str(), "http://localhost:5000/");
        assert_eq!(search.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        let mut profile = Profile::new("http://localhost:5000");
        profile.excluded_ip_ranges = Some(vec!["10.0.0.0/40".into()]);
        let err = to_search_config(&Defaults::default(), Some(&profile)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { field, .. } if field == "excluded_ip_ranges"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles
            .insert("default".into(), Profile::new("http://10.1.2.3:5000"));
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["default"].api_url, "http://10.1.2.3:5000");
        assert_eq!(loaded.default_profile.as_deref(), Some("default"));
    }
}
