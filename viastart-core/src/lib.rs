//! `viaStart` Core Library
//!
//! Interactive launcher for named remote shell sessions: resolves the
//! username and host, validates them, retries credentials until the remote
//! side accepts them, and leaves a named session running that can be
//! attached to later.
//!
//! # Crate Structure
//!
//! - [`launcher`] - Parameter resolution and the credential retry loop
//! - [`validation`] - Username and host syntax checks
//! - [`probe`] - Reachability probes (ICMP echo, TCP connect)
//! - [`transport`] - Session transports (`OpenSSH` control master)
//! - [`models`] - Requests, credentials and session handles
//! - [`config`] - Defaults and transport settings
//! - [`testing`] - Scripted collaborators for tests

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod launcher;
pub mod models;
pub mod probe;
pub mod testing;
pub mod tracing;
pub mod transport;
pub mod validation;

// =============================================================================
// Convenience re-exports
// =============================================================================

pub use config::{LauncherConfig, SshConfig, default_config_dir};
pub use error::{
    ConfigError, ConfigResult, ConnectError, ErrorKind, LaunchError, LaunchResult,
    ValidationError,
};
pub use launcher::{
    Console, CredentialPrompt, LaunchPhase, LaunchState, Launched, Notice, SessionLauncher,
};
pub use models::{
    Credentials, DEFAULT_SESSION_NAME, PipedParameters, SessionHandle, SessionRecord,
    SessionRequest,
};
pub use probe::{IcmpProbe, ReachabilityProbe, TcpProbe, probe_from_config};
pub use transport::{OpenSshTransport, Transport};
pub use validation::{
    is_down_level_username, is_fqdn, validate_host, validate_session_name, validate_username,
};
