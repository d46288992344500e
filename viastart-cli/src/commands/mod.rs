//! Command handler modules for the CLI.

mod attach;
mod completions;
mod connect;
mod remove;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(
    config_path: Option<&Path>,
    command: Commands,
    quiet: bool,
) -> Result<(), CliError> {
    match command {
        Commands::Connect(args) => connect::cmd_connect(config_path, args, quiet),
        Commands::Attach(args) => attach::cmd_attach(config_path, args, quiet),
        Commands::Remove(args) => remove::cmd_remove(config_path, args, quiet),
        Commands::Completions { shell } => completions::cmd_completions(shell),
    }
}
