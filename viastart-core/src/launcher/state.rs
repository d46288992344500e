//! Launcher state machine
//!
//! ```text
//! ResolvingParams -> PromptingCredential -> Connecting -> Succeeded
//!        |                  |    ^             |
//!        v                  v    +-- auth -----+
//!      Failed           Cancelled              v
//!                                            Failed
//! ```

use crate::error::LaunchError;
use crate::models::{Credentials, SessionHandle};

/// Username and host after defaulting, prompting and validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Down-level username, never empty
    pub username: String,
    /// Validated, reachable host, never empty
    pub host: String,
}

/// State of one launcher invocation
#[derive(Debug)]
pub enum LaunchState<C> {
    /// Applying defaults, prompting for and validating parameters
    ResolvingParams,
    /// Waiting for the user to enter credentials
    PromptingCredential {
        /// Resolved connection target
        target: ResolvedTarget,
        /// 1-based attempt number
        attempt: u32,
    },
    /// Waiting for the transport
    Connecting {
        /// Resolved connection target
        target: ResolvedTarget,
        /// 1-based attempt number
        attempt: u32,
        /// Credentials for this attempt only
        credentials: Credentials,
    },
    /// A session was established
    Succeeded(SessionHandle<C>),
    /// The user dismissed a prompt
    Cancelled,
    /// A terminal error occurred
    Failed(LaunchError),
}

impl<C> LaunchState<C> {
    /// Returns the fieldless phase of this state
    #[must_use]
    pub const fn phase(&self) -> LaunchPhase {
        match self {
            Self::ResolvingParams => LaunchPhase::ResolvingParams,
            Self::PromptingCredential { .. } => LaunchPhase::PromptingCredential,
            Self::Connecting { .. } => LaunchPhase::Connecting,
            Self::Succeeded(_) => LaunchPhase::Succeeded,
            Self::Cancelled => LaunchPhase::Cancelled,
            Self::Failed(_) => LaunchPhase::Failed,
        }
    }

    /// Returns true for states the machine never leaves
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.phase().is_terminal()
    }
}

/// Phases the launcher moves through, recorded for inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchPhase {
    /// See [`LaunchState::ResolvingParams`]
    ResolvingParams,
    /// See [`LaunchState::PromptingCredential`]
    PromptingCredential,
    /// See [`LaunchState::Connecting`]
    Connecting,
    /// See [`LaunchState::Succeeded`]
    Succeeded,
    /// See [`LaunchState::Cancelled`]
    Cancelled,
    /// See [`LaunchState::Failed`]
    Failed,
}

impl LaunchPhase {
    /// Returns true for phases the machine never leaves
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Cancelled | Self::Failed)
    }
}

impl std::fmt::Display for LaunchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ResolvingParams => "resolving-params",
            Self::PromptingCredential => "prompting-credential",
            Self::Connecting => "connecting",
            Self::Succeeded => "succeeded",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        assert!(!LaunchPhase::ResolvingParams.is_terminal());
        assert!(!LaunchPhase::PromptingCredential.is_terminal());
        assert!(!LaunchPhase::Connecting.is_terminal());
        assert!(LaunchPhase::Succeeded.is_terminal());
        assert!(LaunchPhase::Cancelled.is_terminal());
        assert!(LaunchPhase::Failed.is_terminal());
    }

    #[test]
    fn test_state_phase() {
        let state: LaunchState<()> = LaunchState::Cancelled;
        assert_eq!(state.phase(), LaunchPhase::Cancelled);
        assert!(state.is_terminal());

        let state: LaunchState<()> = LaunchState::PromptingCredential {
            target: ResolvedTarget {
                username: "corp\\alice".into(),
                host: "host.corp.example".into(),
            },
            attempt: 1,
        };
        assert_eq!(state.phase(), LaunchPhase::PromptingCredential);
        assert!(!state.is_terminal());
    }
}
