//! TCP port probe
//!
//! Checks that the SSH port accepts connections, for networks where ICMP
//! is filtered.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use thiserror::Error;

use super::ReachabilityProbe;

/// Error type for port check operations
#[derive(Debug, Error)]
pub enum PortCheckError {
    /// Host resolution failed
    #[error("Failed to resolve host '{host}': {reason}")]
    ResolutionFailed {
        /// The hostname that failed to resolve
        host: String,
        /// The reason for the failure
        reason: String,
    },
    /// Connection refused or timed out
    #[error("Port {port} on '{host}' is not reachable: {reason}")]
    Unreachable {
        /// The hostname that was unreachable
        host: String,
        /// The port that was unreachable
        port: u16,
        /// The reason for the failure
        reason: String,
    },
}

/// Checks if a TCP port is reachable on the given host
///
/// Every resolved address is tried in turn. Without a timeout the connect
/// blocks until the operating system gives up.
///
/// # Errors
/// * `PortCheckError::ResolutionFailed` if the hostname cannot be resolved
/// * `PortCheckError::Unreachable` if no resolved address accepted the connection
pub fn check_port(host: &str, port: u16, timeout: Option<Duration>) -> Result<(), PortCheckError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|e| PortCheckError::ResolutionFailed {
            host: host.to_string(),
            reason: e.to_string(),
        })?
        .collect();

    if addrs.is_empty() {
        return Err(PortCheckError::ResolutionFailed {
            host: host.to_string(),
            reason: "No addresses found".to_string(),
        });
    }

    let mut last_error = String::new();
    for addr in addrs {
        let attempt = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(_stream) => return Ok(()),
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(PortCheckError::Unreachable {
        host: host.to_string(),
        port,
        reason: last_error,
    })
}

/// Probe that connects to a TCP port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpProbe {
    port: u16,
    timeout: Option<Duration>,
}

impl TcpProbe {
    /// Creates a probe for `port` with no timeout
    #[must_use]
    pub const fn new(port: u16) -> Self {
        Self {
            port,
            timeout: None,
        }
    }

    /// Sets the connect timeout in seconds
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: Option<u32>) -> Self {
        self.timeout = timeout_secs.map(|secs| Duration::from_secs(u64::from(secs)));
        self
    }

    /// Port being probed
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl ReachabilityProbe for TcpProbe {
    fn is_reachable(&self, host: &str) -> bool {
        match check_port(host, self.port, self.timeout) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "TCP probe failed");
                false
            }
        }
    }
}
