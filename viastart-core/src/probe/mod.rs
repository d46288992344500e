//! Host reachability probes
//!
//! A host that passes syntax validation must answer exactly one probe
//! before the launcher asks for credentials.

mod icmp;
mod tcp;

pub use icmp::IcmpProbe;
pub use tcp::{PortCheckError, TcpProbe, check_port};

use crate::config::{LauncherConfig, ProbeMethod};

/// Checks whether a host answers on the network
pub trait ReachabilityProbe {
    /// Returns true if `host` responded
    fn is_reachable(&self, host: &str) -> bool;
}

impl<P: ReachabilityProbe + ?Sized> ReachabilityProbe for &P {
    fn is_reachable(&self, host: &str) -> bool {
        (**self).is_reachable(host)
    }
}

impl<P: ReachabilityProbe + ?Sized> ReachabilityProbe for Box<P> {
    fn is_reachable(&self, host: &str) -> bool {
        (**self).is_reachable(host)
    }
}

/// Builds the probe selected by the configuration
#[must_use]
pub fn probe_from_config(config: &LauncherConfig) -> Box<dyn ReachabilityProbe> {
    match config.probe.method {
        ProbeMethod::Icmp => {
            Box::new(IcmpProbe::new().with_timeout_secs(config.probe.timeout_secs))
        }
        ProbeMethod::Tcp => Box::new(
            TcpProbe::new(config.ssh.port).with_timeout_secs(config.probe.timeout_secs),
        ),
    }
}
