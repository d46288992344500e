//! OpenSSH transport
//!
//! A session is an `ssh` control master running in the background, bound to
//! a control socket named after the session. Attaching opens a shell over
//! the master; removing asks the master to exit. Because the socket name is
//! the session name, later invocations find the session by name alone.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::config::SshConfig;
use crate::error::ConnectError;
use crate::models::{Credentials, SessionHandle};
use crate::trace_operation;
use crate::tracing::span_names;
use crate::validation::validate_session_name;

use super::Transport;
use super::askpass::{ASKPASS_SOCKET_ENV, AskpassServer};

const SSH_LOG_FILE_NAME: &str = "ssh.log";

/// How long the forked master may take to bind its control socket
const SOCKET_WAIT: Duration = Duration::from_secs(2);
const SOCKET_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Exit status `ssh` uses for its own errors
const SSH_ERROR_STATUS: i32 = 255;

const AUTH_MARKERS: [&str; 4] = [
    "permission denied",
    "authentication failed",
    "too many authentication failures",
    "no more authentication methods",
];

const PARAMETER_MARKERS: [&str; 6] = [
    "bad configuration option",
    "command-line line",
    "usage: ssh",
    "bad port",
    "unknown option",
    "illegal option",
];

/// Connection details kept in a [`SessionHandle`] from this transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlMaster {
    /// Control socket of the background master
    pub control_path: PathBuf,
}

/// Transport driving the system `ssh` client
#[derive(Debug, Clone)]
pub struct OpenSshTransport {
    config: SshConfig,
    control_dir: PathBuf,
    askpass_program: PathBuf,
}

impl OpenSshTransport {
    /// Creates a transport
    ///
    /// `askpass_program` is the executable `ssh` runs to obtain the
    /// password; normally the current `viastart` binary.
    #[must_use]
    pub fn new(config: SshConfig, askpass_program: impl Into<PathBuf>) -> Self {
        let control_dir = config.resolve_control_dir();
        Self {
            config,
            control_dir,
            askpass_program: askpass_program.into(),
        }
    }

    /// Overrides the control socket directory
    #[must_use]
    pub fn with_control_dir(mut self, control_dir: impl Into<PathBuf>) -> Self {
        self.control_dir = control_dir.into();
        self
    }

    /// Control socket path for a session name
    #[must_use]
    pub fn control_path(&self, session_name: &str) -> PathBuf {
        self.control_dir.join(session_name)
    }

    /// Arguments that start a background control master
    #[must_use]
    pub fn build_connect_args(
        &self,
        host: &str,
        username: &str,
        session_name: &str,
        log_file: &Path,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        let mut option = |value: String| {
            args.push("-o".into());
            args.push(value.into());
        };

        option("ControlMaster=yes".to_string());
        option(format!(
            "ControlPath={}",
            self.control_path(session_name).display()
        ));
        option("ControlPersist=yes".to_string());
        option("BatchMode=no".to_string());
        option("NumberOfPasswordPrompts=1".to_string());
        option("PubkeyAuthentication=no".to_string());
        option("PreferredAuthentications=password,keyboard-interactive".to_string());
        option(format!(
            "StrictHostKeyChecking={}",
            self.config.strict_host_key_checking.as_ssh_value()
        ));
        for (key, value) in &self.config.options {
            option(format!("{key}={value}"));
        }

        if self.config.port != crate::config::DEFAULT_SSH_PORT {
            args.push("-p".into());
            args.push(self.config.port.to_string().into());
        }

        args.push("-E".into());
        args.push(log_file.as_os_str().to_owned());
        args.push("-f".into());
        args.push("-N".into());
        args.push("-l".into());
        args.push(username.into());
        args.push(host.into());
        args
    }

    /// Arguments that open an interactive shell over an existing master
    #[must_use]
    pub fn build_attach_args(&self, session_name: &str) -> Vec<OsString> {
        vec![
            "-S".into(),
            self.control_path(session_name).into_os_string(),
            "-o".into(),
            "ControlMaster=no".into(),
            "-t".into(),
            session_name.into(),
        ]
    }

    /// Arguments for a control command (`check` or `exit`)
    #[must_use]
    pub fn build_control_args(&self, session_name: &str, command: &str) -> Vec<OsString> {
        vec![
            "-S".into(),
            self.control_path(session_name).into_os_string(),
            "-O".into(),
            command.into(),
            session_name.into(),
        ]
    }

    /// Control socket path for a session name, refusing names that would
    /// leave the control directory
    ///
    /// # Errors
    ///
    /// Returns `ConnectError::Parameter` for an invalid session name.
    pub fn checked_control_path(&self, session_name: &str) -> Result<PathBuf, ConnectError> {
        validate_session_name(session_name)
            .map_err(|e| ConnectError::Parameter(e.to_string()))?;
        Ok(self.control_path(session_name))
    }

    /// Returns true if a master is serving the named session
    #[must_use]
    pub fn is_alive(&self, session_name: &str) -> bool {
        if !self
            .checked_control_path(session_name)
            .is_ok_and(|path| path.exists())
        {
            return false;
        }
        Command::new(&self.config.program)
            .args(self.build_control_args(session_name, "check"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    /// Tears the named session down
    ///
    /// # Errors
    ///
    /// Returns `ConnectError::Transport` if no such session exists or the
    /// master refused to exit.
    pub fn remove(&self, session_name: &str) -> Result<(), ConnectError> {
        let _span = trace_operation!(span_names::REMOVE, session = %session_name).entered();
        self.checked_control_path(session_name)?;

        if !self.is_alive(session_name) {
            self.remove_stale_socket(session_name);
            return Err(ConnectError::Transport(format!(
                "No session named '{session_name}'"
            )));
        }

        let output = Command::new(&self.config.program)
            .args(self.build_control_args(session_name, "exit"))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if output.status.success() {
            self.remove_stale_socket(session_name);
            tracing::info!(session = %session_name, "Session removed");
            Ok(())
        } else {
            Err(classify_ssh_failure(
                &String::from_utf8_lossy(&output.stderr),
                output.status.code(),
            ))
        }
    }

    fn prepare_control_dir(&self) -> Result<(), ConnectError> {
        use std::os::unix::fs::PermissionsExt;

        std::fs::create_dir_all(&self.control_dir).map_err(|e| {
            ConnectError::Transport(format!(
                "Failed to create control directory {}: {e}",
                self.control_dir.display()
            ))
        })?;
        std::fs::set_permissions(&self.control_dir, std::fs::Permissions::from_mode(0o700))
            .map_err(|e| {
                ConnectError::Transport(format!(
                    "Failed to secure control directory {}: {e}",
                    self.control_dir.display()
                ))
            })
    }

    /// Unlinks a leftover control socket; anything that is not a socket is
    /// left alone
    fn remove_stale_socket(&self, session_name: &str) {
        use std::os::unix::fs::FileTypeExt;

        let Ok(path) = self.checked_control_path(session_name) else {
            return;
        };
        match std::fs::symlink_metadata(&path) {
            Ok(meta) if meta.file_type().is_socket() => {}
            Ok(_) => {
                tracing::warn!(path = %path.display(), "Not a control socket, leaving it in place");
                return;
            }
            Err(_) => return,
        }
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed control socket"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Failed to remove control socket");
            }
        }
    }

    fn spawn_error(&self, e: std::io::Error) -> ConnectError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConnectError::Transport(format!(
                "Required program '{}' not found. Please install OpenSSH.",
                self.config.program
            ))
        } else {
            ConnectError::Transport(format!("Failed to execute {}: {e}", self.config.program))
        }
    }
}

impl Transport for OpenSshTransport {
    type Connection = ControlMaster;

    fn connect(
        &mut self,
        host: &str,
        credentials: &Credentials,
        session_name: &str,
    ) -> Result<SessionHandle<ControlMaster>, ConnectError> {
        let control_path = self.checked_control_path(session_name)?;
        self.prepare_control_dir()?;

        if self.is_alive(session_name) {
            return Err(ConnectError::Transport(format!(
                "A session named '{session_name}' already exists; remove it first"
            )));
        }
        self.remove_stale_socket(session_name);

        let askpass = AskpassServer::start(credentials.secret()).map_err(|e| {
            ConnectError::Transport(format!("Failed to prepare password hand-off: {e}"))
        })?;
        let log_file = askpass.dir().join(SSH_LOG_FILE_NAME);
        let args = self.build_connect_args(host, credentials.username(), session_name, &log_file);

        tracing::debug!(host, program = %self.config.program, "Starting control master");
        let status = Command::new(&self.config.program)
            .args(&args)
            .env("SSH_ASKPASS", &self.askpass_program)
            .env("SSH_ASKPASS_REQUIRE", "force")
            .env(ASKPASS_SOCKET_ENV, askpass.socket_path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| self.spawn_error(e))?;

        let log = std::fs::read_to_string(&log_file).unwrap_or_default();
        let served = askpass.finish().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Password hand-off failed");
            false
        });
        tracing::debug!(status = ?status.code(), password_served = served, "ssh finished");

        if !status.success() {
            return Err(classify_ssh_failure(&log, status.code()));
        }

        if !wait_for_socket(&control_path) {
            return Err(ConnectError::Transport(
                "ssh exited without creating a control socket".to_string(),
            ));
        }

        Ok(SessionHandle::new(
            session_name,
            host,
            credentials.username(),
            ControlMaster { control_path },
        ))
    }

    fn attach(&mut self, session_name: &str) -> Result<(), ConnectError> {
        self.checked_control_path(session_name)?;
        if !self.is_alive(session_name) {
            return Err(ConnectError::Transport(format!(
                "No session named '{session_name}'"
            )));
        }

        let status = Command::new(&self.config.program)
            .args(self.build_attach_args(session_name))
            .status()
            .map_err(|e| self.spawn_error(e))?;

        // Any other status is the remote shell's own exit code
        if status.code() == Some(SSH_ERROR_STATUS) {
            return Err(ConnectError::Transport(format!(
                "Lost connection to session '{session_name}'"
            )));
        }
        tracing::info!(session = %session_name, "Detached from session");
        Ok(())
    }
}

fn wait_for_socket(path: &Path) -> bool {
    let deadline = Instant::now() + SOCKET_WAIT;
    while !path.exists() {
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(SOCKET_POLL_INTERVAL);
    }
    true
}

/// Maps `ssh` diagnostics to a connect error kind
///
/// `ssh` exits with 255 for every failure of its own, so the kind is
/// inferred from the last messages it logged.
#[must_use]
pub fn classify_ssh_failure(log: &str, exit_code: Option<i32>) -> ConnectError {
    let detail = log
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| match exit_code {
            Some(code) => format!("ssh exited with status {code}"),
            None => "ssh was terminated by a signal".to_string(),
        });
    let lower = log.to_lowercase();

    if AUTH_MARKERS.iter().any(|m| lower.contains(m)) {
        ConnectError::Authentication(detail)
    } else if PARAMETER_MARKERS.iter().any(|m| lower.contains(m)) {
        ConnectError::Parameter(detail)
    } else {
        ConnectError::Transport(detail)
    }
}
