mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ConfigCommand};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stderr keeps stdout clean for --output json / yaml.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        mut global,
        command,
    } = cli;

    match command {
        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "breachwatch", &mut std::io::stdout());
            Ok(())
        }

        // Printing the path must work even when the file is broken
        Command::Config(args) if matches!(args.command, ConfigCommand::Path) => {
            commands::config_cmd::handle(args, config::Config::default(), &global)
        }

        Command::Config(args) => {
            let cfg = config::load_config()?;
            config::apply_output_defaults(&mut global, &cfg);
            commands::config_cmd::handle(args, cfg, &global)
        }

        // Everything else resolves a search config first
        cmd => {
            let cfg = config::load_config()?;
            config::apply_output_defaults(&mut global, &cfg);
            let search_config = config::resolve_search_config(&global, &cfg)?;

            tracing::debug!(command = ?cmd, api_url = %search_config.api_url, "dispatching command");
            commands::dispatch(cmd, search_config, &global).await
        }
    }
}
