//! CLI error types and exit codes.

use viastart_core::error::{ConfigError, ConnectError, ErrorKind, LaunchError, ValidationError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, parameter or I/O errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Connection failure - the session could not be established or reached
    pub const CONNECTION_FAILURE: i32 = 2;
    /// The user dismissed a prompt
    pub const USER_CANCELLED: i32 = 3;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed piped input
    #[error("Invalid input: {0}")]
    Input(String),

    /// Invalid argument or piped value
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Launch failure, already shown on the console
    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// Session-level failure outside a launch
    #[error(transparent)]
    Session(#[from] ConnectError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, validation, parameter, IO)
    /// - 2: Connection failure (transport error)
    /// - 3: User cancelled
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Launch(e) => exit_code_for(e.kind()),
            Self::Session(e) => exit_code_for(e.kind()),
            Self::Config(_) | Self::Input(_) | Self::Validation(_) | Self::Io(_) => {
                exit_codes::GENERAL_ERROR
            }
        }
    }

    /// Returns true if the console has already shown this error
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        matches!(self, Self::Launch(_))
    }
}

const fn exit_code_for(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::UserCancelled => exit_codes::USER_CANCELLED,
        ErrorKind::Transport | ErrorKind::Authentication => exit_codes::CONNECTION_FAILURE,
        ErrorKind::Validation | ErrorKind::Parameter | ErrorKind::Config | ErrorKind::Io => {
            exit_codes::GENERAL_ERROR
        }
    }
}
