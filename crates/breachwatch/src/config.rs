//! CLI configuration: thin wrapper around `breachwatch_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--api-url, --timeout, --insecure).

use std::time::Duration;

use clap::ValueEnum;

use breachwatch_config::{ConfigError, select_profile, to_search_config};
use breachwatch_core::{SearchConfig, TlsVerification};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use breachwatch_config::{Config, Profile, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Fill unset output/color flags from `[defaults]`.
///
/// Unknown values in the file are ignored rather than fatal; the flag
/// default applies.
pub fn apply_output_defaults(global: &mut GlobalOpts, cfg: &Config) {
    if global.output.is_none() {
        global.output = OutputFormat::from_str(&cfg.defaults.output, true).ok();
    }
    if global.color.is_none() {
        global.color = ColorMode::from_str(&cfg.defaults.color, true).ok();
    }
}

/// Comma-separated profile names, sorted, for help text.
pub fn profile_names(cfg: &Config) -> String {
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}

/// Resolve the runtime search config.
///
/// Precedence: flag > env > profile > `[defaults]`. clap already folds
/// env into the flag values.
pub fn resolve_search_config(global: &GlobalOpts, cfg: &Config) -> Result<SearchConfig, CliError> {
    let profile = select_profile(cfg, global.profile.as_deref())
        .map_err(|e| match e {
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: profile_names(cfg),
            },
            other => other.into(),
        })?
        .map(|(_, p)| p);

    let mut config = to_search_config(&cfg.defaults, profile)?;

    if let Some(ref raw) = global.api_url {
        config.api_url = raw.parse().map_err(|_| CliError::Validation {
            field: "api-url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["breachwatch"];
        argv.extend_from_slice(args);
        argv.push("facets");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn sample() -> Config {
        let mut cfg = Config::default();
        let mut lab = Profile::new("https://breach.lab.internal");
        lab.timeout = Some(5);
        cfg.profiles.insert("lab".into(), lab);
        cfg.default_profile = Some("lab".into());
        cfg.defaults.output = "yaml".into();
        cfg
    }

    #[test]
    fn flags_override_profile() {
        let cfg = sample();
        let resolved = resolve_search_config(
            &global(&["--api-url", "http://127.0.0.1:9000", "--timeout", "2", "-k"]),
            &cfg,
        )
        .unwrap();
        assert_eq!(resolved.api_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(resolved.timeout, Duration::from_secs(2));
        assert!(matches!(resolved.tls, TlsVerification::DangerAcceptInvalid));
    }

    #[test]
    fn default_profile_applies_without_flags() {
        let resolved = resolve_search_config(&global(&[]), &sample()).unwrap();
        assert_eq!(resolved.api_url.host_str(), Some("breach.lab.internal"));
        assert_eq!(resolved.timeout, Duration::from_secs(5));
    }

    #[test]
    fn unknown_profile_lists_available() {
        let err = resolve_search_config(&global(&["-p", "prod"]), &sample()).unwrap_err();
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "prod");
                assert_eq!(available, "lab");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bad_api_url_flag_is_usage_error() {
        let err = resolve_search_config(&global(&["-u", "not a url"]), &sample()).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }

    #[test]
    fn output_default_comes_from_config_unless_flagged() {
        let cfg = sample();
        let mut opts = global(&[]);
        apply_output_defaults(&mut opts, &cfg);
        assert_eq!(opts.output(), OutputFormat::Yaml);

        let mut opts = global(&["-o", "json"]);
        apply_output_defaults(&mut opts, &cfg);
        assert_eq!(opts.output(), OutputFormat::Json);
    }
}
