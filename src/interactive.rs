//! Interactive shell around the [`Dispatcher`].

use crate::dispatcher::{Dispatcher, Reply, Status, Verb, View};
use crate::error::{Result, VaultError};
use crate::models::Entry;
use crate::prompt::Prompter;
use crate::security::Clipboard;
use colored::*;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

const PROMPT: &str = "npass> ";

/// Tab completion over verbs and entry keys.
#[derive(Debug, Default, Clone)]
pub struct ShellHelper {
    verbs: Vec<&'static str>,
    keys: Vec<String>,
}

impl ShellHelper {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            verbs: Verb::spellings(),
            keys,
        }
    }

    /// Replace the completable keys after the store changed.
    pub fn set_keys(&mut self, keys: Vec<String>) {
        self.keys = keys;
    }

    /// Candidates for the word ending at `pos`, and where that word starts.
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let head = &line[..pos];
        let start = head
            .rfind(char::is_whitespace)
            .map_or(0, |i| i + 1);
        let word = &head[start..];

        let verbs = self.verbs.iter().copied().filter(|_| start == 0);
        let mut found: Vec<String> = verbs
            .map(String::from)
            .chain(self.keys.iter().cloned())
            .filter(|candidate| candidate.starts_with(word))
            .collect();
        found.dedup();
        (start, found)
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, found) = self.candidates(line, pos);
        let pairs = found
            .into_iter()
            .map(|word| Pair {
                display: word.clone(),
                replacement: word,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

/// Interactive shell session.
pub struct Shell<P: Prompter, C: Clipboard> {
    dispatcher: Dispatcher<P, C>,
    editor: Editor<ShellHelper, DefaultHistory>,
}

impl<P: Prompter, C: Clipboard> Shell<P, C> {
    /// Create a shell for an already opened dispatcher.
    pub fn new(dispatcher: Dispatcher<P, C>) -> Result<Self> {
        let mut editor = Editor::<ShellHelper, DefaultHistory>::new()
            .map_err(|_| VaultError::Other("Failed to create editor".to_string()))?;
        editor.set_helper(Some(ShellHelper::new(dispatcher.store().keys())));

        Ok(Self { dispatcher, editor })
    }

    /// Run the read-dispatch-render loop until `quit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        self.print_welcome();

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    // Add to history
                    let _ = self.editor.add_history_entry(line);

                    let Some(reply) = self.dispatcher.execute_line(line) else {
                        continue;
                    };
                    if reply.status == Status::Quit {
                        break;
                    }

                    let verb = line.split_whitespace().next().unwrap_or_default();
                    for out in render(&reply, verb) {
                        println!("{out}");
                    }

                    let keys = self.dispatcher.store().keys();
                    if let Some(helper) = self.editor.helper_mut() {
                        helper.set_keys(keys);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Use 'quit' to exit");
                }
                Err(ReadlineError::Eof) => {
                    break;
                }
                Err(err) => {
                    return Err(VaultError::Other(format!("Input error: {err}")));
                }
            }
        }

        Ok(())
    }

    /// Print welcome message.
    fn print_welcome(&self) {
        println!("\n{}", "npass".bold().cyan());
        println!("Type 'help' for available commands");
        println!(
            "Database: {} ({} entries)\n",
            self.dispatcher.store().path().display(),
            self.dispatcher.store().len()
        );
    }
}

/// Turn a reply into the lines the shell prints.
pub fn render(reply: &Reply, verb: &str) -> Vec<String> {
    match reply.status {
        Status::Ok => render_view(&reply.view),
        Status::OtherError => match &reply.view {
            View::Error(message) => vec![format!("{} {}", "Error:".red(), message)],
            _ => vec!["Error".red().to_string()],
        },
        Status::Quit => Vec::new(),
        status => vec![status_message(status, verb).yellow().to_string()],
    }
}

/// Message for a rejected command.
pub fn status_message(status: Status, verb: &str) -> String {
    match status {
        Status::Ok | Status::Quit => String::new(),
        Status::NoSuchCommand => format!("Unknown command: {verb}"),
        Status::InvalidParameterCount => "Invalid number of parameters".to_string(),
        Status::MissingKey => "Missing required key parameter".to_string(),
        Status::NothingToShow => "Nothing to display".to_string(),
        Status::AlreadyExists => "Already exists".to_string(),
        Status::Aborted => "Aborted".to_string(),
        Status::OtherError => "Error".to_string(),
    }
}

fn render_view(view: &View) -> Vec<String> {
    match view {
        View::Nothing => Vec::new(),
        View::Listing(entries) => render_listing(entries),
        View::Entry(entry) => render_entry(entry),
        View::Copied(key) => vec![format!("{} Copied password of {} to clipboard", "✓".green(), key)],
        View::Passwords(passwords) => passwords.clone(),
        View::Help(rows) => {
            let width = rows.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
            let mut lines = vec![format!("\n{}", "Available Commands:".bold())];
            lines.extend(rows.iter().map(|(usage, summary)| {
                format!("  {}  - {}", format!("{usage:<width$}").cyan(), summary)
            }));
            lines.push("  <ref>  - an index from the last listing, or a key".to_string());
            lines
        }
        View::Saved(path) => vec![format!("{} Saved {}", "✓".green(), path)],
        View::Error(message) => vec![format!("{} {}", "Error:".red(), message)],
    }
}

fn render_listing(entries: &[Entry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No entries found".to_string()];
    }

    let index_width = (entries.len() - 1).to_string().len();
    let key_width = entries
        .iter()
        .map(|e| e.key.chars().count())
        .max()
        .unwrap_or(0);

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            format!(
                "{idx:>index_width$})   {}   -   {}",
                format!("{:<key_width$}", entry.key).cyan(),
                entry.description
            )
        })
        .collect()
}

fn render_entry(entry: &Entry) -> Vec<String> {
    vec![
        "=".repeat(50),
        format!("{}: {}", "Key".bold(), entry.key),
        format!("{}: {}", "Login".bold(), entry.login),
        format!("{}: {}", "Password".bold(), entry.secret),
        format!("{}: {}", "Description".bold(), entry.description),
        "=".repeat(50),
    ]
}
