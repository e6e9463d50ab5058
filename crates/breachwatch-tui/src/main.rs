//! `breachwatch-tui`: interactive search-as-you-type breach dashboard.
//!
//! Two screens, switched with `1`/`2` or Tab: **Search** (query box, facet
//! and exclusion chips, live results with status badges) and **Dashboard**
//! (headline counters and login-form distribution, refreshed every 30 s).
//! When the backend is unreachable both screens fall back to the bundled
//! sample data and say so.
//!
//! Logs go to a file (default `/tmp/breachwatch-tui.log`) so they never
//! corrupt the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use breachwatch_core::{SearchConfig, SearchSession};

use crate::app::App;

/// Terminal dashboard for searching breach-monitoring data.
#[derive(Parser, Debug)]
#[command(name = "breachwatch-tui", version, about)]
struct Cli {
    /// Configuration profile to use
    #[arg(short = 'p', long, env = "BREACHWATCH_PROFILE")]
    profile: Option<String>,

    /// Backend URL (overrides the profile)
    #[arg(short = 'u', long, env = "BREACHWATCH_API_URL")]
    api_url: Option<String>,

    /// Log file path
    #[arg(long, default_value = "/tmp/breachwatch-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing. The returned guard flushes on drop, so hold it for
/// the life of the process.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "breachwatch_tui={log_level},breachwatch_core={log_level},breachwatch_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("."));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("breachwatch-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Resolve the runtime config: profile from the config file, then the
/// `--api-url` override. Returns the config and a status-bar label.
fn resolve_config(cli: &Cli) -> Result<(SearchConfig, String)> {
    let cfg = breachwatch_config::load_config().wrap_err("failed to load configuration")?;
    let mut config = breachwatch_config::profile_to_search_config(&cfg, cli.profile.as_deref())
        .wrap_err("invalid profile")?;

    if let Some(ref raw) = cli.api_url {
        config.api_url = raw
            .parse::<url::Url>()
            .wrap_err_with(|| format!("invalid --api-url '{raw}'"))?;
    }

    let profile = cli
        .profile
        .as_deref()
        .or(cfg.default_profile.as_deref())
        .unwrap_or("default");
    let origin = format!("{profile} @ {}", config.api_url);
    Ok((config, origin))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks first so a panic during setup still restores the terminal
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let (config, origin) = resolve_config(&cli)?;
    info!(%origin, per_page = config.per_page, "starting breachwatch-tui");

    let client = config.build_client()?;
    let session = SearchSession::new(client, &config)?;

    let mut app = App::new(session, origin);
    app.run().await?;

    Ok(())
}
