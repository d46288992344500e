//! Connect command: resolve parameters, authenticate, open the session.

use std::path::Path;

use viastart_core::launcher::{Launched, SessionLauncher};
use viastart_core::models::{PipedParameters, SessionRequest};
use viastart_core::probe::probe_from_config;
use viastart_core::transport::OpenSshTransport;

use crate::cli::ConnectArgs;
use crate::console::TerminalConsole;
use crate::error::CliError;
use crate::util::{load_config, read_stdin};

/// Connect command handler
///
/// Prints the session record as one JSON line unless the terminal was
/// attached.
pub fn cmd_connect(
    config_path: Option<&Path>,
    args: ConnectArgs,
    quiet: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let request = build_request(args)?;

    let askpass_program = std::env::current_exe()?;
    let probe = probe_from_config(&config);
    let transport = OpenSshTransport::new(config.ssh.clone(), askpass_program);
    let mut launcher =
        SessionLauncher::new(config, probe, TerminalConsole::new(quiet), transport);

    match launcher.launch(&request)? {
        Launched::Detached(handle) => {
            let record = serde_json::to_string(&handle.record())
                .map_err(|e| CliError::Input(format!("Failed to encode session record: {e}")))?;
            println!("{record}");
        }
        Launched::Attached { name } => {
            tracing::debug!(session = %name, "Attach finished");
        }
    }
    Ok(())
}

fn build_request(args: ConnectArgs) -> Result<SessionRequest, CliError> {
    let mut request = SessionRequest::new().with_attach(args.attach);
    if let Some(username) = args.username {
        request = request.with_username(username);
    }
    if let Some(host) = args.host {
        request = request.with_host(host);
    }
    if args.stdin {
        let piped = PipedParameters::from_json(read_stdin()?.trim())
            .map_err(|e| CliError::Input(format!("Expected a JSON object: {e}")))?;
        request = request.merge_piped(piped);
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_become_request() {
        let request = build_request(ConnectArgs {
            username: Some("corp\\alice".to_string()),
            host: None,
            attach: true,
            stdin: false,
        })
        .unwrap();

        assert_eq!(request.username(), Some("corp\\alice"));
        assert_eq!(request.host(), None);
        assert!(request.attach);
    }
}
