//! Scripted collaborators for exercising the launcher without a network
//! or a terminal
//!
//! Each fake replays a queue of canned answers and records how it was
//! called. When a queue runs dry the fake behaves like a user who closed
//! the prompt, or like a transport that accepts the connection.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;

use secrecy::SecretString;

use crate::error::ConnectError;
use crate::launcher::{Console, CredentialPrompt, Notice};
use crate::models::{Credentials, SessionHandle};
use crate::probe::ReachabilityProbe;
use crate::transport::Transport;

/// Probe with a fixed answer that records every host it was asked about
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    reachable: bool,
    calls: RefCell<Vec<String>>,
}

impl ScriptedProbe {
    /// A probe for which every host answers
    #[must_use]
    pub fn reachable() -> Self {
        Self {
            reachable: true,
            calls: RefCell::default(),
        }
    }

    /// A probe for which no host answers
    #[must_use]
    pub fn unreachable() -> Self {
        Self::default()
    }

    /// Hosts probed so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ReachabilityProbe for ScriptedProbe {
    fn is_reachable(&self, host: &str) -> bool {
        self.calls.borrow_mut().push(host.to_string());
        self.reachable
    }
}

/// A credential prompt as the console saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPrompt {
    /// Username shown
    pub username: String,
    /// Host shown
    pub host: String,
    /// Message shown
    pub message: String,
    /// Attempt number
    pub attempt: u32,
}

/// Console that replays scripted input
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    lines: VecDeque<String>,
    passwords: VecDeque<Option<String>>,
    line_prompts: Vec<String>,
    credential_prompts: Vec<RecordedPrompt>,
    notices: Vec<(Notice, String)>,
}

impl ScriptedConsole {
    /// Creates a console with no scripted input
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues answers for parameter prompts
    #[must_use]
    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Queues passwords for credential prompts
    #[must_use]
    pub fn with_passwords<I, S>(mut self, passwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.passwords
            .extend(passwords.into_iter().map(|p| Some(p.into())));
        self
    }

    /// Queues a dismissed credential prompt
    #[must_use]
    pub fn then_cancel(mut self) -> Self {
        self.passwords.push_back(None);
        self
    }

    /// Labels of parameter prompts shown so far
    #[must_use]
    pub fn line_prompts(&self) -> &[String] {
        &self.line_prompts
    }

    /// Credential prompts shown so far
    #[must_use]
    pub fn credential_prompts(&self) -> &[RecordedPrompt] {
        &self.credential_prompts
    }

    /// Messages shown so far
    #[must_use]
    pub fn notices(&self) -> &[(Notice, String)] {
        &self.notices
    }

    /// Total number of prompts of either kind
    #[must_use]
    pub fn prompt_count(&self) -> usize {
        self.line_prompts.len() + self.credential_prompts.len()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.line_prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }

    fn read_credential(
        &mut self,
        prompt: &CredentialPrompt<'_>,
    ) -> io::Result<Option<Credentials>> {
        self.credential_prompts.push(RecordedPrompt {
            username: prompt.username.to_string(),
            host: prompt.host.to_string(),
            message: prompt.message.to_string(),
            attempt: prompt.attempt,
        });
        Ok(self
            .passwords
            .pop_front()
            .flatten()
            .map(|password| Credentials::new(prompt.username, SecretString::from(password))))
    }

    fn notify(&mut self, notice: Notice, message: &str) {
        self.notices.push((notice, message.to_string()));
    }
}

/// A connect call as the transport saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectCall {
    /// Host connected to
    pub host: String,
    /// Username from the credentials
    pub username: String,
    /// Requested session name
    pub session_name: String,
}

/// Transport that replays scripted connect results
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: VecDeque<Result<(), ConnectError>>,
    attach_reply: Option<ConnectError>,
    connects: Vec<ConnectCall>,
    attaches: Vec<String>,
}

impl ScriptedTransport {
    /// Creates a transport that accepts every connection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues connect results; once exhausted, connections succeed
    #[must_use]
    pub fn with_replies<I>(mut self, replies: I) -> Self
    where
        I: IntoIterator<Item = Result<(), ConnectError>>,
    {
        self.replies.extend(replies);
        self
    }

    /// Makes every attach fail with `error`
    #[must_use]
    pub fn with_attach_error(mut self, error: ConnectError) -> Self {
        self.attach_reply = Some(error);
        self
    }

    /// Connect calls so far
    #[must_use]
    pub fn connects(&self) -> &[ConnectCall] {
        &self.connects
    }

    /// Session names attached so far
    #[must_use]
    pub fn attaches(&self) -> &[String] {
        &self.attaches
    }
}

impl Transport for ScriptedTransport {
    type Connection = ();

    fn connect(
        &mut self,
        host: &str,
        credentials: &Credentials,
        session_name: &str,
    ) -> Result<SessionHandle<()>, ConnectError> {
        self.connects.push(ConnectCall {
            host: host.to_string(),
            username: credentials.username().to_string(),
            session_name: session_name.to_string(),
        });
        self.replies.pop_front().unwrap_or(Ok(()))?;
        Ok(SessionHandle::new(
            session_name,
            host,
            credentials.username(),
            (),
        ))
    }

    fn attach(&mut self, session_name: &str) -> Result<(), ConnectError> {
        self.attaches.push(session_name.to_string());
        match self.attach_reply {
            Some(ref e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}
