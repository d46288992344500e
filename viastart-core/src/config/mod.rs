//! Configuration for `viaStart`
//!
//! The launcher never writes configuration. Values come from an optional
//! `config.toml` in the configuration directory and from environment
//! variables, which take precedence for the process-wide defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::models::DEFAULT_SESSION_NAME;
use crate::validation::validate_session_name;

/// Name of the configuration file inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overriding the configuration directory
pub const ENV_CONFIG_DIR: &str = "VIASTART_CONFIG_DIR";

/// Environment variable holding the default down-level username
pub const ENV_DEFAULT_USERNAME: &str = "VIASTART_DEFAULT_USERNAME";

/// Environment variable holding the default host
pub const ENV_DEFAULT_HOST: &str = "VIASTART_DEFAULT_HOST";

/// Default SSH port
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Complete launcher configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LauncherConfig {
    /// Process-wide parameter defaults
    pub defaults: DefaultsConfig,
    /// Session naming
    pub session: SessionConfig,
    /// Reachability probe
    pub probe: ProbeConfig,
    /// OpenSSH transport
    pub ssh: SshConfig,
}

/// Fallback values for parameters the caller did not supply
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Default down-level username
    pub username: Option<String>,
    /// Default host FQDN
    pub host: Option<String>,
}

/// Session naming
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Logical name given to the established session
    pub name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SESSION_NAME.to_string(),
        }
    }
}

/// How host reachability is checked before prompting for credentials
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    /// One ICMP echo request through the system `ping`
    #[default]
    Icmp,
    /// TCP connect to the SSH port
    Tcp,
}

/// Reachability probe settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Probe method
    pub method: ProbeMethod,
    /// Optional probe timeout in seconds; unset means wait for the OS
    pub timeout_secs: Option<u32>,
}

/// `StrictHostKeyChecking` policy passed to `ssh`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Reject unknown and changed keys
    Yes,
    /// Accept unknown keys, reject changed keys
    #[default]
    AcceptNew,
    /// Accept everything
    No,
}

impl HostKeyPolicy {
    /// Value for `-o StrictHostKeyChecking=`
    #[must_use]
    pub const fn as_ssh_value(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::AcceptNew => "accept-new",
            Self::No => "no",
        }
    }
}

/// OpenSSH transport settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SshConfig {
    /// `ssh` executable
    pub program: String,
    /// Remote port
    pub port: u16,
    /// Host key checking policy
    pub strict_host_key_checking: HostKeyPolicy,
    /// Extra `-o Key=Value` options
    pub options: BTreeMap<String, String>,
    /// Directory holding the control sockets (supports `~`)
    pub control_dir: Option<String>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            program: "ssh".to_string(),
            port: DEFAULT_SSH_PORT,
            strict_host_key_checking: HostKeyPolicy::default(),
            options: BTreeMap::new(),
            control_dir: None,
        }
    }
}

impl SshConfig {
    /// Resolves the control socket directory
    ///
    /// Uses the configured directory if set, otherwise the user runtime
    /// directory, then the cache directory, then the system temp directory.
    #[must_use]
    pub fn resolve_control_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.control_dir {
            return PathBuf::from(shellexpand::tilde(dir).into_owned());
        }
        dirs::runtime_dir()
            .or_else(dirs::cache_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join("viastart")
    }
}

impl LauncherConfig {
    /// Loads configuration from `config_dir`, or the default directory
    ///
    /// A missing configuration file yields the built-in defaults.
    /// Environment overrides are applied afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(config_dir: Option<&Path>) -> ConfigResult<Self> {
        let _span = crate::trace_operation!(crate::tracing::span_names::CONFIG_LOAD).entered();
        let dir = match config_dir {
            Some(dir) => dir.to_path_buf(),
            None => default_config_dir()?,
        };
        let mut config = Self::from_file(&dir.join(CONFIG_FILE_NAME))?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file, returning defaults if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parses configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` on malformed input or unknown keys.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            reason: e.to_string(),
        })
    }

    /// Applies environment overrides using the given lookup function
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(username) = lookup(ENV_DEFAULT_USERNAME).filter(|v| !v.is_empty()) {
            self.defaults.username = Some(username);
        }
        if let Some(host) = lookup(ENV_DEFAULT_HOST).filter(|v| !v.is_empty()) {
            self.defaults.host = Some(host);
        }
    }

    /// Checks value ranges serde cannot express
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for an empty session name or
    /// program, a zero port, or a zero probe timeout.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Err(e) = validate_session_name(&self.session.name) {
            return Err(ConfigError::Validation {
                field: "session.name".to_string(),
                reason: e.to_string(),
            });
        }
        if self.ssh.program.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "ssh.program".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.ssh.port == 0 {
            return Err(ConfigError::Validation {
                field: "ssh.port".to_string(),
                reason: "must be between 1 and 65535".to_string(),
            });
        }
        if self.probe.timeout_secs == Some(0) {
            return Err(ConfigError::Validation {
                field: "probe.timeout_secs".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Default username, if configured and non-empty
    #[must_use]
    pub fn default_username(&self) -> Option<&str> {
        self.defaults
            .username
            .as_deref()
            .filter(|u| !u.trim().is_empty())
    }

    /// Default host, if configured and non-empty
    #[must_use]
    pub fn default_host(&self) -> Option<&str> {
        self.defaults.host.as_deref().filter(|h| !h.trim().is_empty())
    }
}

/// Returns the configuration directory from the environment or platform
///
/// # Errors
///
/// Returns `ConfigError::NoConfigDir` if no directory can be determined.
pub fn default_config_dir() -> ConfigResult<PathBuf> {
    if let Some(dir) = std::env::var_os(ENV_CONFIG_DIR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|dir| dir.join("viastart"))
        .ok_or(ConfigError::NoConfigDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LauncherConfig::default();
        assert_eq!(config.session.name, DEFAULT_SESSION_NAME);
        assert_eq!(config.probe.method, ProbeMethod::Icmp);
        assert_eq!(config.probe.timeout_secs, None);
        assert_eq!(config.ssh.port, 22);
        assert_eq!(config.ssh.strict_host_key_checking, HostKeyPolicy::AcceptNew);
        assert!(config.default_username().is_none());
        assert!(config.default_host().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_file() {
        let config = LauncherConfig::from_toml(
            r#"
            [defaults]
            username = 'corp\alice'
            host = "host.corp.example"

            [session]
            name = "ops-session"

            [probe]
            method = "tcp"
            timeout_secs = 3

            [ssh]
            program = "/usr/bin/ssh"
            port = 2222
            strict_host_key_checking = "yes"
            options = { ServerAliveInterval = "30" }
            "#,
        )
        .unwrap();

        assert_eq!(config.default_username(), Some("corp\\alice"));
        assert_eq!(config.default_host(), Some("host.corp.example"));
        assert_eq!(config.session.name, "ops-session");
        assert_eq!(config.probe.method, ProbeMethod::Tcp);
        assert_eq!(config.probe.timeout_secs, Some(3));
        assert_eq!(config.ssh.port, 2222);
        assert_eq!(config.ssh.strict_host_key_checking.as_ssh_value(), "yes");
        assert_eq!(
            config.ssh.options.get("ServerAliveInterval").map(String::as_str),
            Some("30")
        );
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = LauncherConfig::from_toml("[defaults]\nuser = 'x'\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides_file_defaults() {
        let mut config = LauncherConfig::from_toml("[defaults]\nhost = 'a.example'\n").unwrap();
        config.apply_env(|key| match key {
            ENV_DEFAULT_HOST => Some("b.example".to_string()),
            ENV_DEFAULT_USERNAME => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.default_host(), Some("b.example"));
        assert_eq!(config.default_username(), None);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = LauncherConfig::default();
        config.ssh.port = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "ssh.port"
        ));

        let mut config = LauncherConfig::default();
        config.session.name = "a/b".to_string();
        assert!(config.validate().is_err());

        let mut config = LauncherConfig::default();
        config.probe.timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LauncherConfig::from_file(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, LauncherConfig::default());
    }

    #[test]
    fn test_explicit_control_dir_is_expanded() {
        let config = SshConfig {
            control_dir: Some("/var/run/viastart".to_string()),
            ..SshConfig::default()
        };
        assert_eq!(
            config.resolve_control_dir(),
            PathBuf::from("/var/run/viastart")
        );
    }
}
