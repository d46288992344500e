//! Session launcher
//!
//! Resolves the username and host, validates them, asks for credentials
//! until the transport accepts them or the user gives up, and then either
//! hands the session back or attaches the terminal to it.
//!
//! Only [`ConnectError::Authentication`] loops back to the credential
//! prompt. Cancellation, parameter errors and transport errors end the
//! invocation.

mod console;
mod state;

pub use console::{CREDENTIAL_TITLE, Console, CredentialPrompt, Notice};
pub use state::{LaunchPhase, LaunchState, ResolvedTarget};

use crate::config::LauncherConfig;
use crate::error::{ConnectError, LaunchError, LaunchResult, ValidationError};
use crate::models::{Credentials, SessionHandle, SessionRequest};
use crate::probe::ReachabilityProbe;
use crate::trace_operation;
use crate::tracing::span_names;
use crate::transport::Transport;
use crate::validation::{validate_host, validate_username};

/// Prompt label for a missing username
pub const USERNAME_PROMPT: &str = "Username (DOMAIN\\user)";

/// Prompt label for a missing host
pub const HOST_PROMPT: &str = "Host (FQDN)";

/// Outcome of a successful launch
#[derive(Debug)]
pub enum Launched<C> {
    /// The session runs in the background and belongs to the caller
    Detached(SessionHandle<C>),
    /// The terminal was attached and has since detached
    Attached {
        /// Name of the session that was attached
        name: String,
    },
}

impl<C> Launched<C> {
    /// Returns the handle if the session was not attached
    #[must_use]
    pub fn into_handle(self) -> Option<SessionHandle<C>> {
        match self {
            Self::Detached(handle) => Some(handle),
            Self::Attached { .. } => None,
        }
    }
}

/// Drives one launch through [`LaunchState`]
///
/// Collaborators are injected so the loop can run against fakes.
pub struct SessionLauncher<P, C, T> {
    config: LauncherConfig,
    probe: P,
    console: C,
    transport: T,
    phases: Vec<LaunchPhase>,
}

impl<P, C, T> SessionLauncher<P, C, T>
where
    P: ReachabilityProbe,
    C: Console,
    T: Transport,
{
    /// Creates a launcher
    #[must_use]
    pub fn new(config: LauncherConfig, probe: P, console: C, transport: T) -> Self {
        Self {
            config,
            probe,
            console,
            transport,
            phases: Vec::new(),
        }
    }

    /// Phases visited by the most recent launch
    #[must_use]
    pub fn phases(&self) -> &[LaunchPhase] {
        &self.phases
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// The injected console
    #[must_use]
    pub const fn console(&self) -> &C {
        &self.console
    }

    /// The injected transport
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// The injected probe
    #[must_use]
    pub const fn probe(&self) -> &P {
        &self.probe
    }

    /// Runs one launch
    ///
    /// Every failure is shown on the console and returned.
    ///
    /// # Errors
    ///
    /// Returns `LaunchError::Validation` for malformed or unreachable
    /// parameters, `LaunchError::Cancelled` if the user dismissed a prompt,
    /// and `LaunchError::Connect` for parameter or transport failures.
    pub fn launch(&mut self, request: &SessionRequest) -> LaunchResult<Launched<T::Connection>> {
        let _span = trace_operation!(span_names::LAUNCH, attach = request.attach).entered();
        self.phases.clear();

        let result = self
            .run_to_completion(request)
            .and_then(|handle| self.finish(handle, request.attach));

        if let Err(ref e) = result {
            tracing::debug!(kind = %e.kind(), "Launch failed");
            self.console.notify(Notice::Error, &e.to_string());
        }
        result
    }

    fn run_to_completion(
        &mut self,
        request: &SessionRequest,
    ) -> LaunchResult<SessionHandle<T::Connection>> {
        let mut state = LaunchState::ResolvingParams;
        loop {
            self.phases.push(state.phase());
            state = match state {
                LaunchState::ResolvingParams => match self.resolve(request) {
                    Ok(target) => LaunchState::PromptingCredential { target, attempt: 1 },
                    Err(LaunchError::Cancelled) => LaunchState::Cancelled,
                    Err(e) => LaunchState::Failed(e),
                },
                LaunchState::PromptingCredential { target, attempt } => {
                    self.prompt_credential(target, attempt)
                }
                LaunchState::Connecting {
                    target,
                    attempt,
                    credentials,
                } => self.connect(target, attempt, credentials),
                LaunchState::Succeeded(handle) => return Ok(handle),
                LaunchState::Cancelled => return Err(LaunchError::Cancelled),
                LaunchState::Failed(e) => return Err(e),
            };
        }
    }

    /// Applies defaults, validates, then prompts for whatever is missing
    ///
    /// Values that are already known are validated before any prompt is
    /// shown.
    fn resolve(&mut self, request: &SessionRequest) -> LaunchResult<ResolvedTarget> {
        let _span = trace_operation!(span_names::RESOLVE).entered();

        let username = request
            .username()
            .or_else(|| self.config.default_username())
            .map(str::to_owned);
        let host = request
            .host()
            .or_else(|| self.config.default_host())
            .map(str::to_owned);

        if let Some(ref username) = username {
            validate_username(username)?;
        }
        if let Some(ref host) = host {
            self.check_host(host)?;
        }

        let username = match username {
            Some(username) => username,
            None => {
                let username = self.prompt_until_non_empty(USERNAME_PROMPT)?;
                validate_username(&username)?;
                username
            }
        };
        let host = match host {
            Some(host) => host,
            None => {
                let host = self.prompt_until_non_empty(HOST_PROMPT)?;
                self.check_host(&host)?;
                host
            }
        };

        tracing::debug!(username = %username, host = %host, "Parameters resolved");
        Ok(ResolvedTarget { username, host })
    }

    /// Syntax check, then exactly one reachability probe
    fn check_host(&self, host: &str) -> Result<(), ValidationError> {
        validate_host(host)?;
        if self.probe.is_reachable(host) {
            Ok(())
        } else {
            Err(ValidationError::Unreachable(host.to_string()))
        }
    }

    fn prompt_until_non_empty(&mut self, label: &str) -> LaunchResult<String> {
        loop {
            match self.console.read_line(label)? {
                None => return Err(LaunchError::Cancelled),
                Some(value) if value.trim().is_empty() => {}
                Some(value) => return Ok(value.trim().to_string()),
            }
        }
    }

    fn prompt_credential(
        &mut self,
        target: ResolvedTarget,
        attempt: u32,
    ) -> LaunchState<T::Connection> {
        let message = credential_message(&target, attempt);
        let prompt = CredentialPrompt {
            username: &target.username,
            host: &target.host,
            title: CREDENTIAL_TITLE,
            message: &message,
            attempt,
        };

        match self.console.read_credential(&prompt) {
            Ok(Some(credentials)) if !credentials.is_empty() => LaunchState::Connecting {
                target,
                attempt,
                credentials,
            },
            Ok(_) => LaunchState::Cancelled,
            Err(e) => LaunchState::Failed(e.into()),
        }
    }

    fn connect(
        &mut self,
        target: ResolvedTarget,
        attempt: u32,
        credentials: Credentials,
    ) -> LaunchState<T::Connection> {
        let _span =
            trace_operation!(span_names::CONNECT, host = %target.host, attempt).entered();

        let result = self.transport.connect(
            &target.host,
            &credentials,
            &self.config.session.name,
        );
        drop(credentials);

        match result {
            Ok(handle) => {
                tracing::info!(session = handle.name(), "Session established");
                LaunchState::Succeeded(handle)
            }
            Err(ConnectError::Authentication(reason)) => {
                tracing::info!(attempt, "Credentials rejected");
                self.console.notify(
                    Notice::Warning,
                    &format!(
                        "The username or password for '{}' is incorrect: {reason}",
                        target.username
                    ),
                );
                LaunchState::PromptingCredential {
                    target,
                    attempt: attempt + 1,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Connect failed");
                LaunchState::Failed(e.into())
            }
        }
    }

    fn finish(
        &mut self,
        handle: SessionHandle<T::Connection>,
        attach: bool,
    ) -> LaunchResult<Launched<T::Connection>> {
        let name = handle.name().to_string();
        self.console.notify(
            Notice::Info,
            &format!(
                "Session '{name}' stays open until you remove it: viastart remove --name {name}"
            ),
        );

        if attach {
            self.console.notify(
                Notice::Info,
                &format!(
                    "Entering session '{name}' on {}. Exit the remote shell to detach.",
                    handle.host()
                ),
            );
            drop(handle);

            let _span = trace_operation!(span_names::ATTACH, session = %name).entered();
            self.transport.attach(&name)?;
            Ok(Launched::Attached { name })
        } else {
            self.console.notify(
                Notice::Info,
                &format!(
                    "Session '{name}' is running in the background on {}.",
                    handle.host()
                ),
            );
            Ok(Launched::Detached(handle))
        }
    }
}

fn credential_message(target: &ResolvedTarget, attempt: u32) -> String {
    if attempt <= 1 {
        format!("Enter the password for {} on {}.", target.username, target.host)
    } else {
        format!(
            "The username or password is incorrect. Enter the password for {} on {} (attempt {attempt}).",
            target.username, target.host
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{ScriptedConsole, ScriptedProbe, ScriptedTransport};

    type TestLauncher = SessionLauncher<ScriptedProbe, ScriptedConsole, ScriptedTransport>;

    fn launcher(console: ScriptedConsole, transport: ScriptedTransport) -> TestLauncher {
        SessionLauncher::new(
            LauncherConfig::default(),
            ScriptedProbe::reachable(),
            console,
            transport,
        )
    }

    fn request() -> SessionRequest {
        SessionRequest::new()
            .with_username("corp\\alice")
            .with_host("host.corp.example")
    }

    #[test]
    fn test_first_attempt_success_returns_handle() {
        let mut launcher = launcher(
            ScriptedConsole::new().with_passwords(["secret"]),
            ScriptedTransport::new(),
        );

        let handle = launcher.launch(&request()).unwrap().into_handle().unwrap();

        assert_eq!(handle.host(), "host.corp.example");
        assert_eq!(handle.name(), crate::models::DEFAULT_SESSION_NAME);
        assert_eq!(
            launcher.phases(),
            [
                LaunchPhase::ResolvingParams,
                LaunchPhase::PromptingCredential,
                LaunchPhase::Connecting,
                LaunchPhase::Succeeded,
            ]
        );
        assert!(launcher.transport().attaches().is_empty());
    }

    #[test]
    fn test_authentication_failure_loops_back_to_prompt() {
        let mut launcher = launcher(
            ScriptedConsole::new().with_passwords(["wrong", "right"]),
            ScriptedTransport::new().with_replies([Err(ConnectError::Authentication(
                "Permission denied".into(),
            ))]),
        );

        launcher.launch(&request()).unwrap();

        assert_eq!(launcher.transport().connects().len(), 2);
        let prompts = launcher.console().credential_prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].attempt, 1);
        assert_eq!(prompts[1].attempt, 2);
        assert!(prompts[1].message.contains("incorrect"));
        assert!(
            launcher
                .console()
                .notices()
                .iter()
                .any(|(notice, _)| *notice == Notice::Warning)
        );
        assert!(
            !launcher
                .console()
                .notices()
                .iter()
                .any(|(notice, _)| *notice == Notice::Error)
        );
    }

    #[test]
    fn test_transport_error_is_terminal() {
        let mut launcher = launcher(
            ScriptedConsole::new().with_passwords(["a", "b"]),
            ScriptedTransport::new().with_replies([Err(ConnectError::Transport(
                "Connection refused".into(),
            ))]),
        );

        let err = launcher.launch(&request()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(launcher.transport().connects().len(), 1);
        assert_eq!(launcher.phases().last(), Some(&LaunchPhase::Failed));
        assert!(
            launcher
                .console()
                .notices()
                .iter()
                .any(|(notice, text)| *notice == Notice::Error && text.contains("refused"))
        );
    }

    #[test]
    fn test_parameter_error_is_terminal() {
        let mut launcher = launcher(
            ScriptedConsole::new().with_passwords(["a", "b"]),
            ScriptedTransport::new().with_replies([Err(ConnectError::Parameter(
                "Bad configuration option".into(),
            ))]),
        );

        let err = launcher.launch(&request()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Parameter);
        assert_eq!(launcher.transport().connects().len(), 1);
    }

    #[test]
    fn test_empty_password_cancels() {
        let mut launcher = launcher(
            ScriptedConsole::new().with_passwords([""]),
            ScriptedTransport::new(),
        );

        let err = launcher.launch(&request()).unwrap_err();

        assert!(matches!(err, LaunchError::Cancelled));
        assert!(launcher.transport().connects().is_empty());
        assert_eq!(launcher.phases().last(), Some(&LaunchPhase::Cancelled));
    }

    #[test]
    fn test_attach_does_not_return_handle() {
        let mut launcher = launcher(
            ScriptedConsole::new().with_passwords(["secret"]),
            ScriptedTransport::new(),
        );

        let launched = launcher.launch(&request().with_attach(true)).unwrap();

        assert!(matches!(launched, Launched::Attached { .. }));
        assert_eq!(
            launcher.transport().attaches(),
            [crate::models::DEFAULT_SESSION_NAME]
        );
    }

    #[test]
    fn test_defaults_fill_missing_parameters() {
        let mut config = LauncherConfig::default();
        config.defaults.username = Some("corp\\svc".into());
        config.defaults.host = Some("jump.corp.example".into());

        let mut launcher = SessionLauncher::new(
            config,
            ScriptedProbe::reachable(),
            ScriptedConsole::new().with_passwords(["secret"]),
            ScriptedTransport::new(),
        );

        launcher.launch(&SessionRequest::new()).unwrap();

        let connects = launcher.transport().connects();
        assert_eq!(connects[0].username, "corp\\svc");
        assert_eq!(connects[0].host, "jump.corp.example");
        assert!(launcher.console().line_prompts().is_empty());
    }

    #[test]
    fn test_blank_prompt_input_is_asked_again() {
        let mut launcher = launcher(
            ScriptedConsole::new()
                .with_lines(["", "  ", "corp\\alice"])
                .with_passwords(["secret"]),
            ScriptedTransport::new(),
        );

        launcher
            .launch(&SessionRequest::new().with_host("host.corp.example"))
            .unwrap();

        assert_eq!(launcher.console().line_prompts().len(), 3);
        assert_eq!(launcher.transport().connects()[0].username, "corp\\alice");
    }

    #[test]
    fn test_closed_input_on_parameter_prompt_cancels() {
        let mut launcher = launcher(ScriptedConsole::new(), ScriptedTransport::new());

        let err = launcher
            .launch(&SessionRequest::new().with_host("host.corp.example"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UserCancelled);
        assert!(launcher.console().credential_prompts().is_empty());
    }

    #[test]
    fn test_prompted_username_is_validated() {
        let mut launcher = launcher(
            ScriptedConsole::new().with_lines(["alice"]),
            ScriptedTransport::new(),
        );

        let err = launcher
            .launch(&SessionRequest::new().with_host("host.corp.example"))
            .unwrap_err();

        assert!(matches!(
            err,
            LaunchError::Validation(ValidationError::InvalidUsername(_))
        ));
        assert!(launcher.console().credential_prompts().is_empty());
    }

    #[test]
    fn test_unreachable_host_fails_before_credentials() {
        let mut launcher = SessionLauncher::new(
            LauncherConfig::default(),
            ScriptedProbe::unreachable(),
            ScriptedConsole::new().with_passwords(["secret"]),
            ScriptedTransport::new(),
        );

        let err = launcher.launch(&request()).unwrap_err();

        assert!(matches!(
            err,
            LaunchError::Validation(ValidationError::Unreachable(_))
        ));
        assert_eq!(launcher.probe().calls(), ["host.corp.example"]);
        assert!(launcher.console().credential_prompts().is_empty());
    }

    #[test]
    fn test_custom_session_name_is_used() {
        let mut config = LauncherConfig::default();
        config.session.name = "ops".into();

        let mut launcher = SessionLauncher::new(
            config,
            ScriptedProbe::reachable(),
            ScriptedConsole::new().with_passwords(["secret"]),
            ScriptedTransport::new(),
        );

        let handle = launcher.launch(&request()).unwrap().into_handle().unwrap();
        assert_eq!(handle.name(), "ops");
        assert_eq!(launcher.transport().connects()[0].session_name, "ops");
    }
}
