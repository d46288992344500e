//! Terminal console: prompts on the terminal, notices on stderr.

use std::io::{self, BufRead, Write};

use secrecy::SecretString;
use viastart_core::launcher::{Console, CredentialPrompt, Notice};
use viastart_core::models::Credentials;

/// Console backed by stdin/stderr and `rpassword`
pub struct TerminalConsole {
    quiet: bool,
}

impl TerminalConsole {
    /// Creates a console; `quiet` hides info and warning notices
    pub const fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "{prompt}: ")?;
        stderr.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            writeln!(stderr)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn read_credential(
        &mut self,
        prompt: &CredentialPrompt<'_>,
    ) -> io::Result<Option<Credentials>> {
        eprintln!("{}", prompt.title);
        eprintln!("{}", prompt.message);

        match rpassword::prompt_password(format!("Password for {}: ", prompt.username)) {
            Ok(password) => Ok(Some(Credentials::new(
                prompt.username,
                SecretString::from(password),
            ))),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn notify(&mut self, notice: Notice, message: &str) {
        match notice {
            Notice::Error => eprintln!("Error: {message}"),
            Notice::Warning if !self.quiet => eprintln!("Warning: {message}"),
            Notice::Info if !self.quiet => eprintln!("{message}"),
            Notice::Warning | Notice::Info => {}
        }
    }
}
