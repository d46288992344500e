//! Property-based tests for username and host validation

use proptest::prelude::*;
use viastart_core::error::ValidationError;
use viastart_core::validation::{is_down_level_username, is_fqdn, validate_host, validate_username};

/// Strategy for a single DNS label
fn arb_label() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,20}[a-z0-9]"
}

/// Strategy for an alphabetic top-level label
fn arb_tld() -> impl Strategy<Value = String> {
    "[a-z]{2,10}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any non-empty name without a backslash is rejected
    #[test]
    fn prop_username_without_separator_fails(name in "[A-Za-z0-9._@-]{1,40}") {
        prop_assert!(!is_down_level_username(&name));
        prop_assert_eq!(
            validate_username(&name),
            Err(ValidationError::InvalidUsername(name.clone()))
        );
    }

    /// Any DOMAIN\user shape is accepted
    #[test]
    fn prop_username_with_separator_passes(
        domain in "[A-Za-z0-9.-]{0,20}",
        user in "[A-Za-z0-9._-]{0,20}",
    ) {
        let username = format!("{domain}\\{user}");
        prop_assert!(validate_username(&username).is_ok());
    }

    /// Two or more labels with an alphabetic final label form an FQDN
    #[test]
    fn prop_multi_label_names_are_fqdn(
        labels in prop::collection::vec(arb_label(), 1..4),
        tld in arb_tld(),
    ) {
        let host = format!("{}.{tld}", labels.join("."));
        prop_assert!(is_fqdn(&host));
        prop_assert!(validate_host(&host).is_ok());
    }

    /// An empty label anywhere makes a host invalid
    #[test]
    fn prop_empty_label_is_rejected(
        left in arb_label(),
        right in arb_label(),
        tld in arb_tld(),
    ) {
        let host = format!("{left}..{right}.{tld}");
        prop_assert!(!is_fqdn(&host));
    }

    /// A numeric final label is an address, not a name
    #[test]
    fn prop_dotted_quads_are_not_fqdn(
        a in 0u8..=255,
        b in 0u8..=255,
        c in 0u8..=255,
        d in 0u8..=255,
    ) {
        let host = format!("{a}.{b}.{c}.{d}");
        prop_assert!(!is_fqdn(&host));
    }

    /// Whitespace anywhere makes a host invalid
    #[test]
    fn prop_whitespace_is_rejected(
        left in arb_label(),
        right in arb_label(),
        tld in arb_tld(),
    ) {
        let host = format!("{left} {right}.{tld}");
        prop_assert_eq!(
            validate_host(&host),
            Err(ValidationError::InvalidHost(host.clone()))
        );
    }
}

#[test]
fn test_empty_username_is_accepted() {
    assert!(validate_username("").is_ok());
}

#[test]
fn test_literal_bad_host_is_rejected() {
    assert!(!is_fqdn("bad host"));
    assert!(!is_fqdn("10.0.0.1"));
    assert!(is_fqdn("host.corp.example."));
}
