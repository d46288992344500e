//! Username and host validation
//!
//! Both checks are pure; the network reachability check lives in
//! [`crate::probe`] and only runs once a host has passed [`validate_host`].

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

/// Separator between domain and account in a down-level username
pub const DOMAIN_SEPARATOR: char = '\\';

/// Maximum length of a fully-qualified domain name
pub const MAX_FQDN_LENGTH: usize = 255;

/// Maximum length of a single DNS label
pub const MAX_LABEL_LENGTH: usize = 63;

static LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_](?:[A-Za-z0-9_-]{0,61}[A-Za-z0-9_])?$")
        .expect("LABEL_REGEX is a valid regex pattern")
});

/// Returns true if the username is empty or in `DOMAIN\user` form
#[must_use]
pub fn is_down_level_username(username: &str) -> bool {
    username.is_empty() || username.contains(DOMAIN_SEPARATOR)
}

/// Validates the format of a username
///
/// An empty username passes; it is filled in later from defaults or a
/// prompt.
///
/// # Errors
///
/// Returns `ValidationError::InvalidUsername` for a non-empty username
/// without a domain separator.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if is_down_level_username(username) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUsername(username.to_string()))
    }
}

/// Returns true if `host` has fully-qualified domain name syntax
///
/// 1 to 255 characters in total, dot-separated labels of 1 to 63
/// characters, and a final label that is not purely numeric (which rules
/// out dotted IPv4 addresses). A single trailing dot is accepted.
#[must_use]
pub fn is_fqdn(host: &str) -> bool {
    if host.is_empty() || host.len() > MAX_FQDN_LENGTH {
        return false;
    }

    let name = host.strip_suffix('.').unwrap_or(host);
    if name.is_empty() {
        return false;
    }

    let labels: Vec<&str> = name.split('.').collect();
    if !labels
        .iter()
        .all(|label| label.len() <= MAX_LABEL_LENGTH && LABEL_REGEX.is_match(label))
    {
        return false;
    }

    labels
        .last()
        .is_some_and(|last| !last.chars().all(|c| c.is_ascii_digit()))
}

/// Validates the syntax of a host name
///
/// # Errors
///
/// Returns `ValidationError::InvalidHost` if the host is not an FQDN.
pub fn validate_host(host: &str) -> Result<(), ValidationError> {
    if is_fqdn(host) {
        Ok(())
    } else {
        Err(ValidationError::InvalidHost(host.to_string()))
    }
}

/// Validates a session name
///
/// The name becomes a file name inside the control directory, so it must
/// be non-empty, free of path separators and NUL, and not `.` or `..`.
///
/// # Errors
///
/// Returns `ValidationError::InvalidSessionName` otherwise.
pub fn validate_session_name(name: &str) -> Result<(), ValidationError> {
    let valid = !name.trim().is_empty()
        && !name.contains(['/', '\\', '\0'])
        && name != "."
        && name != "..";
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidSessionName(name.to_string()))
    }
}
