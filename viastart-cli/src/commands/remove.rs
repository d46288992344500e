//! Remove command: tear a running session down.

use std::path::Path;

use viastart_core::transport::OpenSshTransport;

use crate::cli::SessionArgs;
use crate::error::CliError;
use crate::util::{load_config, resolve_session_name};

/// Remove command handler
pub fn cmd_remove(
    config_path: Option<&Path>,
    args: SessionArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let name = resolve_session_name(&config, args.name, args.stdin)?;

    OpenSshTransport::new(config.ssh, std::env::current_exe()?).remove(&name)?;
    if !quiet {
        eprintln!("Session '{name}' removed.");
    }
    Ok(())
}
