//! Attach command: bind the terminal to a running session.

use std::path::Path;

use viastart_core::trace_operation;
use viastart_core::tracing::span_names;
use viastart_core::transport::{OpenSshTransport, Transport};

use crate::cli::SessionArgs;
use crate::error::CliError;
use crate::util::{load_config, resolve_session_name};

/// Attach command handler
pub fn cmd_attach(
    config_path: Option<&Path>,
    args: SessionArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let name = resolve_session_name(&config, args.name, args.stdin)?;

    let mut transport = OpenSshTransport::new(config.ssh, std::env::current_exe()?);
    if !quiet {
        eprintln!("Entering session '{name}'. Exit the remote shell to detach.");
    }

    let _span = trace_operation!(span_names::ATTACH, session = %name).entered();
    transport.attach(&name)?;
    Ok(())
}
