//! ICMP echo probe through the system `ping`

use std::process::{Command, Stdio};

use super::ReachabilityProbe;

/// Sends one echo request using the platform `ping` executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcmpProbe {
    program: String,
    timeout_secs: Option<u32>,
}

impl Default for IcmpProbe {
    fn default() -> Self {
        Self {
            program: "ping".to_string(),
            timeout_secs: None,
        }
    }
}

impl IcmpProbe {
    /// Creates a probe using `ping` from `PATH`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reply timeout; `None` leaves it to `ping`
    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: Option<u32>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Overrides the `ping` executable
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Builds the argument list for a single echo request
    #[must_use]
    pub fn build_args(&self, host: &str) -> Vec<String> {
        let mut args = Vec::new();

        #[cfg(windows)]
        {
            args.push("-n".to_string());
            args.push("1".to_string());
            if let Some(secs) = self.timeout_secs {
                args.push("-w".to_string());
                args.push((u64::from(secs) * 1000).to_string());
            }
        }

        #[cfg(not(windows))]
        {
            args.push("-c".to_string());
            args.push("1".to_string());
            if let Some(secs) = self.timeout_secs {
                args.push("-W".to_string());
                args.push(secs.to_string());
            }
        }

        args.push(host.to_string());
        args
    }
}

impl ReachabilityProbe for IcmpProbe {
    fn is_reachable(&self, host: &str) -> bool {
        let status = Command::new(&self.program)
            .args(self.build_args(host))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) => {
                tracing::debug!(host, success = status.success(), "ICMP probe finished");
                status.success()
            }
            Err(e) => {
                tracing::warn!(host, program = %self.program, error = %e, "Failed to run ping");
                false
            }
        }
    }
}
