//! Interactive input used by commands and at startup.

use crate::error::{Result, VaultError};
use dialoguer::{Input, Password};
use std::io;

/// Source of user input for commands that ask follow-up questions.
///
/// `Ok(None)` means the input was closed or interrupted.
pub trait Prompter {
    /// Read one line of visible text. `current` is shown as the value kept
    /// when the answer is empty.
    fn read_line(&mut self, prompt: &str, current: Option<&str>) -> Result<Option<String>>;

    /// Read a secret without echoing it.
    fn read_secret(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    fn read_line(&mut self, prompt: &str, current: Option<&str>) -> Result<Option<String>> {
        let prompt = match current {
            Some(value) => format!("{prompt} [{value}]"),
            None => prompt.to_string(),
        };

        let answer = Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text();
        closed_as_none(answer)
    }

    fn read_secret(&mut self, prompt: &str) -> Result<Option<String>> {
        let answer = Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact();
        closed_as_none(answer)
    }
}

fn closed_as_none(answer: std::result::Result<String, dialoguer::Error>) -> Result<Option<String>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(dialoguer::Error::IO(e))
            if matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof | io::ErrorKind::Interrupted
            ) =>
        {
            Ok(None)
        }
        Err(dialoguer::Error::IO(e)) => Err(VaultError::Io(e)),
    }
}

/// Ask for a new database passphrase twice.
pub fn new_passphrase(prompter: &mut dyn Prompter) -> Result<String> {
    let first = prompter
        .read_secret("Passphrase")?
        .ok_or(VaultError::Cancelled)?;
    if first.is_empty() {
        return Err(VaultError::EmptyPassphrase);
    }

    let confirm = prompter
        .read_secret("Confirm passphrase")?
        .ok_or(VaultError::Cancelled)?;
    if first != confirm {
        return Err(VaultError::PasswordMismatch);
    }

    Ok(first)
}

/// Ask for the passphrase of an existing database.
pub fn existing_passphrase(prompter: &mut dyn Prompter) -> Result<String> {
    prompter
        .read_secret("Passphrase")?
        .ok_or(VaultError::Cancelled)
}
