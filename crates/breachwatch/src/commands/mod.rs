//! Command dispatch: bridges CLI args -> core search services -> output.

pub mod config_cmd;
pub mod facets;
pub mod search;
pub mod stats;
pub mod util;

use breachwatch_core::SearchConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: SearchConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Search(args) => search::handle(args, config, global).await,
        Command::Stats(args) => stats::handle(&args, &config, global).await,
        Command::Facets(args) => {
            facets::handle(&args, global);
            Ok(())
        }
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled before dispatch".into(),
        }),
    }
}
