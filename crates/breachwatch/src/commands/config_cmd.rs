//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::Input;
use serde::Serialize;
use tabled::Tabled;

use breachwatch_core::SearchConfig;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util::{self, prompt_err};

// ── Profile listing ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ProfileEntry {
    name: String,
    api_url: String,
    default: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "API URL")]
    api_url: String,
}

impl From<&ProfileEntry> for ProfileRow {
    fn from(p: &ProfileEntry) -> Self {
        Self {
            marker: if p.default { "*" } else { "" },
            name: p.name.clone(),
            api_url: p.api_url.clone(),
        }
    }
}

fn profile_entries(cfg: &Config) -> Vec<ProfileEntry> {
    let mut entries: Vec<ProfileEntry> = cfg
        .profiles
        .iter()
        .map(|(name, p)| ProfileEntry {
            name: name.clone(),
            api_url: p.api_url.clone(),
            default: cfg.default_profile.as_deref() == Some(name.as_str()),
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

// ── Init wizard ─────────────────────────────────────────────────────

fn init(mut cfg: Config) -> Result<(), CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "interactive".into(),
            reason: "config init needs an interactive terminal".into(),
        });
    }

    let path = config::config_path();
    eprintln!("breachwatch configuration");
    eprintln!("   Config path: {}\n", path.display());

    let name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    if cfg.profiles.contains_key(&name)
        && !util::confirm(&format!("Profile '{name}' exists. Overwrite?"), false)?
    {
        return Ok(());
    }

    let api_url: String = Input::new()
        .with_prompt("Backend URL")
        .default(SearchConfig::DEFAULT_API_URL.into())
        .validate_with(|input: &String| {
            input
                .parse::<url::Url>()
                .map(|_| ())
                .map_err(|e| format!("invalid URL: {e}"))
        })
        .interact_text()
        .map_err(prompt_err)?;

    let mut profile = Profile::new(api_url.clone());
    if api_url.starts_with("https://")
        && util::confirm("Accept invalid TLS certificates for this backend?", false)?
    {
        profile.insecure = Some(true);
    }

    cfg.profiles.insert(name.clone(), profile);
    let has_default = cfg
        .default_profile
        .as_deref()
        .is_some_and(|d| d != name && cfg.profiles.contains_key(d));
    if !has_default || util::confirm(&format!("Make '{name}' the default profile?"), true)? {
        cfg.default_profile = Some(name.clone());
    }

    config::save_config(&cfg)?;
    eprintln!("\n   Saved profile '{name}' to {}", path.display());
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, cfg: Config, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(cfg),

        ConfigCommand::Show => {
            let text = toml::to_string_pretty(&cfg).map_err(|e| CliError::Config {
                message: e.to_string(),
            })?;
            let out = output::render_single(
                global.output(),
                &cfg,
                |_| text.trim_end().to_owned(),
                |c| c.default_profile.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let entries = profile_entries(&cfg);
            let out = output::render_list(
                global.output(),
                &entries,
                |p| ProfileRow::from(p),
                |p| p.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::profile_names(&cfg),
                    name,
                });
            }
            let mut cfg = cfg;
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::print_note(&format!("Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_sorted_with_default_marked() {
        let mut cfg = Config::default();
        cfg.profiles
            .insert("prod".into(), Profile::new("https://breach.example.com"));
        cfg.profiles
            .insert("lab".into(), Profile::new("http://lab.internal:5000"));
        cfg.default_profile = Some("prod".into());

        let entries = profile_entries(&cfg);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["lab", "prod"]);
        assert!(!entries[0].default);
        assert!(entries[1].default);
        assert_eq!(ProfileRow::from(&entries[1]).marker, "*");
    }
}
