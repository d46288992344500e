//! Session handle model

use serde::{Deserialize, Serialize};

/// Logical name given to every session established by the launcher
pub const DEFAULT_SESSION_NAME: &str = "viaStart-RemoteSession";

/// An established remote session
///
/// Returned to the caller, who owns it from then on. Dropping the handle
/// does not tear the session down; use the transport's remove operation
/// with [`SessionHandle::name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle<C> {
    name: String,
    host: String,
    username: String,
    connection: C,
}

impl<C> SessionHandle<C> {
    /// Creates a handle for a session that the transport just established
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        username: impl Into<String>,
        connection: C,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            username: username.into(),
            connection,
        }
    }

    /// Logical session name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remote host the session is connected to
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Username the session authenticated as
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Transport-specific connection details
    #[must_use]
    pub const fn connection(&self) -> &C {
        &self.connection
    }

    /// Consumes the handle, returning the transport-specific connection
    #[must_use]
    pub fn into_connection(self) -> C {
        self.connection
    }

    /// Returns the serializable projection of this handle
    #[must_use]
    pub fn record(&self) -> SessionRecord {
        SessionRecord {
            name: self.name.clone(),
            host: self.host.clone(),
            username: self.username.clone(),
        }
    }
}

/// Serializable view of a session handle
///
/// Written as JSON on stdout so the output of `connect` can be piped into
/// `attach` or `remove`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Logical session name
    #[serde(alias = "Name")]
    pub name: String,
    /// Remote host
    #[serde(alias = "ComputerName", alias = "Host")]
    pub host: String,
    /// Authenticated username
    #[serde(default)]
    pub username: String,
}
