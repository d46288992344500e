//! Session request model

use serde::Deserialize;

/// Parameters of one launcher invocation
///
/// Empty strings are treated as absent so that `--session-host ""` falls
/// through to the configured default the same way an omitted flag does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRequest {
    /// Down-level username (`DOMAIN\user`)
    pub username: Option<String>,
    /// Fully-qualified host name
    pub host: Option<String>,
    /// Attach the terminal once the session is up
    pub attach: bool,
}

impl SessionRequest {
    /// Creates an empty request
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the username
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = non_empty(Some(username.into()));
        self
    }

    /// Sets the host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = non_empty(Some(host.into()));
        self
    }

    /// Sets whether to attach after connecting
    #[must_use]
    pub const fn with_attach(mut self, attach: bool) -> Self {
        self.attach = attach;
        self
    }

    /// Returns the explicit username, if any
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Returns the explicit host, if any
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref().filter(|h| !h.trim().is_empty())
    }

    /// Fills fields the caller left empty from piped parameters
    #[must_use]
    pub fn merge_piped(mut self, piped: PipedParameters) -> Self {
        if self.username().is_none() {
            self.username = non_empty(piped.session_username);
        }
        if self.host().is_none() {
            self.host = non_empty(piped.session_host);
        }
        self
    }
}

/// Parameters bound from the properties of a piped JSON object
///
/// Property names match the command's parameter names; unknown properties
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipedParameters {
    /// `sessionUsername` property
    #[serde(default, alias = "SessionUsername")]
    pub session_username: Option<String>,
    /// `sessionHost` property
    #[serde(default, alias = "SessionHost")]
    pub session_host: Option<String>,
}

impl PipedParameters {
    /// Parses piped parameters from a JSON object
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a JSON object with string
    /// properties.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_strings_are_absent() {
        let request = SessionRequest::new().with_username("").with_host("  ");
        assert_eq!(request.username(), None);
        assert_eq!(request.host(), None);
    }

    #[test]
    fn test_piped_parameters_fill_missing_fields() {
        let piped = PipedParameters::from_json(
            r#"{"sessionUsername": "corp\\bob", "sessionHost": "db.corp.example", "other": 1}"#,
        )
        .unwrap();

        let request = SessionRequest::new()
            .with_host("web.corp.example")
            .merge_piped(piped);

        assert_eq!(request.username(), Some("corp\\bob"));
        assert_eq!(request.host(), Some("web.corp.example"));
    }

    #[test]
    fn test_piped_parameters_accept_pascal_case() {
        let piped = PipedParameters::from_json(r#"{"SessionHost": "db.corp.example"}"#).unwrap();
        assert_eq!(piped.session_host.as_deref(), Some("db.corp.example"));
        assert_eq!(piped.session_username, None);
    }
}
