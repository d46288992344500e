//! Password hand-off to `ssh` through `SSH_ASKPASS`
//!
//! `ssh` reads passwords from a terminal or from an askpass program, never
//! from a pipe. The transport points `SSH_ASKPASS` at the `viastart`
//! executable itself; in askpass mode it connects to a one-shot Unix socket
//! served by [`AskpassServer`] and prints the secret for `ssh`.
//!
//! The socket lives in a private temporary directory and serves the secret
//! at most once, so it never appears in argv, the environment or on disk.

use std::io::{self, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tempfile::TempDir;
use zeroize::Zeroizing;

/// Environment variable carrying the socket path to the askpass helper
pub const ASKPASS_SOCKET_ENV: &str = "VIASTART_ASKPASS_SOCKET";

const SOCKET_FILE_NAME: &str = "askpass.sock";
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Serves one secret to one askpass helper
///
/// The directory returned by [`AskpassServer::dir`] is private to the
/// current user and removed when the server is finished or dropped.
pub struct AskpassServer {
    dir: TempDir,
    socket_path: PathBuf,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<io::Result<bool>>>,
}

impl AskpassServer {
    /// Binds the socket and starts serving `secret`
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory or socket cannot be
    /// created.
    pub fn start(secret: &SecretString) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("viastart-").tempdir()?;
        let socket_path = dir.path().join(SOCKET_FILE_NAME);

        let listener = UnixListener::bind(&socket_path)?;
        listener.set_nonblocking(true)?;

        let stop = Arc::new(AtomicBool::new(false));
        let payload = Zeroizing::new(secret.expose_secret().as_bytes().to_vec());
        let worker_stop = Arc::clone(&stop);
        let worker = std::thread::Builder::new()
            .name("viastart-askpass".to_string())
            .spawn(move || serve_once(&listener, &payload, &worker_stop))?;

        Ok(Self {
            dir,
            socket_path,
            stop,
            worker: Some(worker),
        })
    }

    /// Socket path to export through [`ASKPASS_SOCKET_ENV`]
    #[must_use]
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Private scratch directory, also usable for `ssh` log files
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Stops serving and reports whether the secret was handed out
    ///
    /// # Errors
    ///
    /// Returns an error if the worker failed while serving.
    pub fn finish(mut self) -> io::Result<bool> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> io::Result<bool> {
        self.stop.store(true, Ordering::SeqCst);
        match self.worker.take() {
            Some(worker) => worker
                .join()
                .map_err(|_| io::Error::other("askpass worker panicked"))?,
            None => Ok(false),
        }
    }
}

impl Drop for AskpassServer {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn serve_once(listener: &UnixListener, payload: &[u8], stop: &AtomicBool) -> io::Result<bool> {
    while !stop.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((mut stream, _)) => {
                stream.set_nonblocking(false)?;
                stream.write_all(payload)?;
                return Ok(true);
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                std::thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(false)
}

/// Returns true if this process was started by `ssh` as an askpass helper
#[must_use]
pub fn is_askpass_invocation() -> bool {
    std::env::var_os(ASKPASS_SOCKET_ENV).is_some_and(|v| !v.is_empty())
}

/// Askpass helper entry point
///
/// Fetches the secret and writes it, newline-terminated, to `out`.
/// Confirmation prompts such as unknown host keys are refused so the
/// password can only ever answer a password prompt.
///
/// # Errors
///
/// Returns an error if the socket is not set, unreachable, already used,
/// or if `prompt` is not a password prompt.
pub fn run_askpass(prompt: Option<&str>, out: &mut impl Write) -> io::Result<()> {
    if prompt.is_some_and(is_confirmation_prompt) {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "refusing to answer a confirmation prompt",
        ));
    }

    let socket_path = std::env::var_os(ASKPASS_SOCKET_ENV)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "askpass socket not set"))?;

    let secret = fetch_secret(Path::new(&socket_path))?;
    out.write_all(&secret)?;
    out.write_all(b"\n")?;
    out.flush()
}

fn fetch_secret(socket_path: &Path) -> io::Result<Zeroizing<Vec<u8>>> {
    let mut stream = UnixStream::connect(socket_path)?;
    let mut secret = Zeroizing::new(Vec::new());
    stream.read_to_end(&mut secret)?;
    if secret.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "askpass socket returned no secret",
        ));
    }
    Ok(secret)
}

fn is_confirmation_prompt(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    lower.contains("(yes/no") || lower.contains("continue connecting")
}
