//! Property-based tests for the launcher's resolve and retry loop
//!
//! All collaborators are scripted; nothing touches the network or a
//! terminal.

use proptest::prelude::*;
use viastart_core::config::LauncherConfig;
use viastart_core::error::{ConnectError, ErrorKind, LaunchError, ValidationError};
use viastart_core::launcher::{Launched, Notice, SessionLauncher};
use viastart_core::models::{DEFAULT_SESSION_NAME, SessionRequest};
use viastart_core::testing::{ScriptedConsole, ScriptedProbe, ScriptedTransport};

type Launcher = SessionLauncher<ScriptedProbe, ScriptedConsole, ScriptedTransport>;

const USERNAME: &str = "corp\\alice";
const HOST: &str = "host.corp.example";

fn launcher(
    probe: ScriptedProbe,
    console: ScriptedConsole,
    transport: ScriptedTransport,
) -> Launcher {
    SessionLauncher::new(LauncherConfig::default(), probe, console, transport)
}

fn explicit_request() -> SessionRequest {
    SessionRequest::new().with_username(USERNAME).with_host(HOST)
}

fn rejections(count: usize) -> Vec<Result<(), ConnectError>> {
    (0..count)
        .map(|_| Err(ConnectError::Authentication("Permission denied".to_string())))
        .collect()
}

/// Strategy for host strings that are not FQDN-shaped
fn arb_bad_host() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,10} [a-z]{1,10}",
        "[a-z]{1,10}\\.\\.[a-z]{2,5}",
        "-[a-z]{1,10}\\.[a-z]{2,5}",
        "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}",
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// N rejected attempts followed by an accepted one take exactly N+1
    /// connects and succeed
    #[test]
    fn prop_rejections_then_success(rejected in 0usize..8) {
        let passwords: Vec<String> = (0..=rejected).map(|i| format!("attempt-{i}")).collect();
        let mut launcher = launcher(
            ScriptedProbe::reachable(),
            ScriptedConsole::new().with_passwords(passwords),
            ScriptedTransport::new().with_replies(rejections(rejected)),
        );

        let handle = launcher.launch(&explicit_request()).unwrap().into_handle().unwrap();

        prop_assert_eq!(handle.host(), HOST);
        prop_assert_eq!(launcher.transport().connects().len(), rejected + 1);
        prop_assert_eq!(launcher.console().credential_prompts().len(), rejected + 1);

        let warnings = launcher
            .console()
            .notices()
            .iter()
            .filter(|(notice, _)| *notice == Notice::Warning)
            .count();
        prop_assert_eq!(warnings, rejected);
    }

    /// Dismissing the prompt after N rejections stops with no further connects
    #[test]
    fn prop_cancel_stops_connecting(rejected in 0usize..6) {
        let passwords: Vec<String> = (0..rejected).map(|i| format!("attempt-{i}")).collect();
        let mut launcher = launcher(
            ScriptedProbe::reachable(),
            ScriptedConsole::new().with_passwords(passwords).then_cancel(),
            ScriptedTransport::new().with_replies(rejections(rejected)),
        );

        let err = launcher.launch(&explicit_request()).unwrap_err();

        prop_assert_eq!(err.kind(), ErrorKind::UserCancelled);
        prop_assert_eq!(launcher.transport().connects().len(), rejected);
    }

    /// Malformed hosts fail before the probe and before any prompt
    #[test]
    fn prop_bad_host_fails_before_probe(host in arb_bad_host()) {
        let mut launcher = launcher(
            ScriptedProbe::reachable(),
            ScriptedConsole::new(),
            ScriptedTransport::new(),
        );

        let err = launcher
            .launch(&SessionRequest::new().with_username(USERNAME).with_host(host.clone()))
            .unwrap_err();

        prop_assert!(matches!(
            err,
            LaunchError::Validation(ValidationError::InvalidHost(ref h)) if *h == host
        ));
        prop_assert!(launcher.probe().calls().is_empty());
        prop_assert_eq!(launcher.console().prompt_count(), 0);
        prop_assert!(launcher.transport().connects().is_empty());
    }

    /// Usernames without a domain separator fail before any prompt
    #[test]
    fn prop_bad_username_fails_before_prompt(username in "[a-z]{1,12}(@[a-z]{1,8}\\.[a-z]{2,4})?") {
        let mut launcher = launcher(
            ScriptedProbe::reachable(),
            ScriptedConsole::new(),
            ScriptedTransport::new(),
        );

        let err = launcher
            .launch(&SessionRequest::new().with_username(username).with_host(HOST))
            .unwrap_err();

        prop_assert!(matches!(err, LaunchError::Validation(ValidationError::InvalidUsername(_))));
        prop_assert_eq!(launcher.console().prompt_count(), 0);
        prop_assert!(launcher.transport().connects().is_empty());
    }
}

#[test]
fn test_unreachable_host_is_probed_exactly_once() {
    let mut launcher = launcher(
        ScriptedProbe::unreachable(),
        ScriptedConsole::new().with_passwords(["secret"]),
        ScriptedTransport::new(),
    );

    let err = launcher.launch(&explicit_request()).unwrap_err();

    assert_eq!(
        err.to_string(),
        LaunchError::Validation(ValidationError::Unreachable(HOST.to_string())).to_string()
    );
    assert_eq!(launcher.probe().calls(), [HOST]);
    assert!(launcher.console().credential_prompts().is_empty());
    assert!(launcher.transport().connects().is_empty());
}

#[test]
fn test_detached_launch_returns_resolved_host() {
    let mut launcher = launcher(
        ScriptedProbe::reachable(),
        ScriptedConsole::new().with_passwords(["secret"]),
        ScriptedTransport::new(),
    );

    let launched = launcher.launch(&explicit_request()).unwrap();

    let Launched::Detached(handle) = launched else {
        panic!("expected a detached session");
    };
    assert_eq!(handle.host(), HOST);
    assert_eq!(handle.record().name, DEFAULT_SESSION_NAME);
    assert!(launcher.transport().attaches().is_empty());
}

#[test]
fn test_attached_launch_attaches_once_by_name() {
    let mut launcher = launcher(
        ScriptedProbe::reachable(),
        ScriptedConsole::new().with_passwords(["secret"]),
        ScriptedTransport::new(),
    );

    let launched = launcher
        .launch(&explicit_request().with_attach(true))
        .unwrap();

    assert!(launched.into_handle().is_none());
    assert_eq!(launcher.transport().attaches(), [DEFAULT_SESSION_NAME]);
}

#[test]
fn test_interactive_scenario() {
    let mut launcher = launcher(
        ScriptedProbe::reachable(),
        ScriptedConsole::new()
            .with_lines([USERNAME, HOST])
            .with_passwords(["secret"]),
        ScriptedTransport::new(),
    );

    let handle = launcher
        .launch(&SessionRequest::new())
        .unwrap()
        .into_handle()
        .unwrap();

    assert_eq!(handle.host(), HOST);
    assert_eq!(handle.username(), USERNAME);
    assert_eq!(launcher.console().line_prompts().len(), 2);

    let connects = launcher.transport().connects();
    assert_eq!(connects.len(), 1);
    assert_eq!(connects[0].host, HOST);
    assert_eq!(connects[0].username, USERNAME);
    assert_eq!(connects[0].session_name, DEFAULT_SESSION_NAME);
}

#[test]
fn test_bad_host_literal_fails_before_any_prompt() {
    let mut launcher = launcher(
        ScriptedProbe::reachable(),
        ScriptedConsole::new(),
        ScriptedTransport::new(),
    );

    let err = launcher
        .launch(&SessionRequest::new().with_host("bad host"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(launcher.console().prompt_count(), 0);
    assert!(launcher.probe().calls().is_empty());

    // Failure is reported on the console as well as returned
    assert!(
        launcher
            .console()
            .notices()
            .iter()
            .any(|(notice, message)| *notice == Notice::Error && message.contains("bad host"))
    );
}
