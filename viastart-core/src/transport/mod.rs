//! Remote session transports
//!
//! The launcher only needs to connect and attach; listing and tearing
//! sessions down are transport-specific and live on the implementations.

mod askpass;
mod openssh;

pub use askpass::{ASKPASS_SOCKET_ENV, AskpassServer, is_askpass_invocation, run_askpass};
pub use openssh::{ControlMaster, OpenSshTransport, classify_ssh_failure};

use crate::error::ConnectError;
use crate::models::{Credentials, SessionHandle};

/// Establishes and attaches to named remote sessions
pub trait Transport {
    /// Transport-specific data kept in the returned handle
    type Connection;

    /// Establishes a session named `session_name` on `host`
    ///
    /// # Errors
    ///
    /// Returns `ConnectError::Authentication` if the credentials were
    /// rejected, `ConnectError::Parameter` if the parameters were malformed,
    /// and `ConnectError::Transport` for any other failure.
    fn connect(
        &mut self,
        host: &str,
        credentials: &Credentials,
        session_name: &str,
    ) -> Result<SessionHandle<Self::Connection>, ConnectError>;

    /// Binds the invoking terminal to the named session until it detaches
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not exist or the terminal
    /// could not be attached.
    fn attach(&mut self, session_name: &str) -> Result<(), ConnectError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Connection = T::Connection;

    fn connect(
        &mut self,
        host: &str,
        credentials: &Credentials,
        session_name: &str,
    ) -> Result<SessionHandle<Self::Connection>, ConnectError> {
        (**self).connect(host, credentials, session_name)
    }

    fn attach(&mut self, session_name: &str) -> Result<(), ConnectError> {
        (**self).attach(session_name)
    }
}
