//! Shared utility functions used across command modules.

use std::io::Read;
use std::path::Path;

use viastart_core::config::LauncherConfig;
use viastart_core::models::SessionRecord;
use viastart_core::validation::validate_session_name;

use crate::error::CliError;

/// Loads configuration from the optional custom config directory
pub fn load_config(config_path: Option<&Path>) -> Result<LauncherConfig, CliError> {
    LauncherConfig::load(config_path).map_err(CliError::from)
}

/// Reads everything piped on stdin
pub fn read_stdin() -> Result<String, CliError> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    Ok(input)
}

/// Parses a session record as printed by `connect`
pub fn parse_session_record(input: &str) -> Result<SessionRecord, CliError> {
    serde_json::from_str(input.trim())
        .map_err(|e| CliError::Input(format!("Expected a session record: {e}")))
}

/// Session name from `--name`, piped input, or configuration
///
/// The name is validated before it is used as a control socket path.
pub fn resolve_session_name(
    config: &LauncherConfig,
    name: Option<String>,
    stdin: bool,
) -> Result<String, CliError> {
    let name = if stdin {
        parse_session_record(&read_stdin()?)?.name
    } else {
        name.unwrap_or_else(|| config.session.name.clone())
    };
    validate_session_name(&name)?;
    Ok(name)
}
