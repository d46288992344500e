//! Credential model

use secrecy::{ExposeSecret, SecretString};

/// Username and password for a single connect attempt
///
/// The password is held in a [`SecretString`] which is zeroized on drop.
/// `Debug` output never includes the secret.
pub struct Credentials {
    username: String,
    secret: SecretString,
}

impl Credentials {
    /// Creates credentials from a username and secret
    #[must_use]
    pub fn new(username: impl Into<String>, secret: SecretString) -> Self {
        Self {
            username: username.into(),
            secret,
        }
    }

    /// Returns the username
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the secret wrapper
    #[must_use]
    pub const fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// Returns true if the password is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secret.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
