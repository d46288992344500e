//! Interactive surface used by the launcher

use std::io;

use crate::models::Credentials;

/// Title shown on every credential prompt
pub const CREDENTIAL_TITLE: &str = "viaStart Remote Session";

/// Severity of a side-channel message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Progress and reminders
    Info,
    /// Recoverable problems, such as rejected credentials
    Warning,
    /// Terminal failures
    Error,
}

/// What to show when asking for credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialPrompt<'a> {
    /// Username the credentials are for
    pub username: &'a str,
    /// Host being connected to
    pub host: &'a str,
    /// Dialog title
    pub title: &'a str,
    /// Message, updated after a rejected attempt
    pub message: &'a str,
    /// 1-based attempt number
    pub attempt: u32,
}

/// Prompts and human-readable messages
///
/// Messages go to the interactive surface, never to the structured output
/// channel.
pub trait Console {
    /// Reads one line of input; `Ok(None)` means input was closed
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Asks for credentials; `Ok(None)` means the prompt was dismissed
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn read_credential(&mut self, prompt: &CredentialPrompt<'_>)
    -> io::Result<Option<Credentials>>;

    /// Shows a message
    fn notify(&mut self, notice: Notice, message: &str);
}

impl<C: Console + ?Sized> Console for &mut C {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        (**self).read_line(prompt)
    }

    fn read_credential(
        &mut self,
        prompt: &CredentialPrompt<'_>,
    ) -> io::Result<Option<Credentials>> {
        (**self).read_credential(prompt)
    }

    fn notify(&mut self, notice: Notice, message: &str) {
        (**self).notify(notice, message);
    }
}
