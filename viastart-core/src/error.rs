//! Error types for `viaStart`
//!
//! Launch failures are split into a small taxonomy so scripted callers can
//! match on the kind while interactive users get readable text. Only
//! [`ConnectError::Authentication`] is ever retried by the launcher.

use std::path::PathBuf;

use thiserror::Error;

/// Discriminator shared by every launch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed username, malformed host or unreachable host
    Validation,
    /// The user dismissed a prompt
    UserCancelled,
    /// The transport rejected the credentials
    Authentication,
    /// Malformed parameters detected at connect time
    Parameter,
    /// Any other connection failure
    Transport,
    /// Configuration could not be read
    Config,
    /// Console or process I/O failed
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::UserCancelled => "user-cancelled",
            Self::Authentication => "authentication",
            Self::Parameter => "parameter",
            Self::Transport => "transport",
            Self::Config => "config",
            Self::Io => "io",
        };
        f.write_str(name)
    }
}

/// Parameter validation failures, raised before any credential activity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Username is non-empty but lacks the `DOMAIN\user` separator
    #[error("Invalid username '{0}': expected down-level form DOMAIN\\user")]
    InvalidUsername(String),

    /// Host does not have fully-qualified domain name syntax
    #[error("Invalid host '{0}': not a valid fully-qualified domain name")]
    InvalidHost(String),

    /// Session name is empty or would escape the control directory
    #[error("Invalid session name '{0}': must be a single path component")]
    InvalidSessionName(String),

    /// Host is well-formed but did not answer the reachability probe
    #[error("Host '{0}' is not reachable")]
    Unreachable(String),
}

/// Tagged result of a single connect attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// Credentials were rejected; the user can correct them and retry
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The invocation parameters were rejected by the transport
    #[error("Invalid session parameters: {0}")]
    Parameter(String),

    /// The connection could not be established or was lost
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ConnectError {
    /// Returns the error kind
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Parameter(_) => ErrorKind::Parameter,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }

    /// Returns true if another credential attempt may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No platform configuration directory could be determined
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// Failed to read the configuration file
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        /// The file that could not be read
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// Failed to parse the configuration file
    #[error("Failed to parse configuration file {path}: {reason}")]
    Parse {
        /// The file that could not be parsed
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A configuration value is out of range
    #[error("Invalid configuration value for {field}: {reason}")]
    Validation {
        /// The offending field
        field: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Failure of a launcher invocation
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Parameter validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The user dismissed a prompt
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Connect-time failure that is not retried
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Console I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LaunchError {
    /// Returns the error kind
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Cancelled => ErrorKind::UserCancelled,
            Self::Connect(e) => e.kind(),
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type for launcher operations
pub type LaunchResult<T> = Result<T, LaunchError>;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
