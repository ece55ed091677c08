//! Command dispatch for the interactive shell.
//!
//! A [`Dispatcher`] owns the open store, the session context and the codec,
//! and borrows nothing global. Every command is a small state transition that
//! ends in a [`Reply`]: a [`Status`] code plus a [`View`] describing what the
//! shell should render. Commands that change entries save the whole store
//! and reset the session so stale positional references cannot reach a
//! removed or renamed key.

use crate::codec::VaultCodec;
use crate::error::Result;
use crate::generator::{self, DEFAULT_BATCH, MAX_BATCH};
use crate::models::Entry;
use crate::prompt::Prompter;
use crate::security::Clipboard;
use crate::session::SessionContext;
use crate::store::EntryStore;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use tracing::{debug, warn};

/// Outcome code of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NoSuchCommand,
    InvalidParameterCount,
    MissingKey,
    NothingToShow,
    AlreadyExists,
    Aborted,
    OtherError,
    Quit,
}

/// What a command produced for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Nothing,
    /// Result of `list`/`search`, in the order positional references use.
    Listing(Vec<Entry>),
    Entry(Entry),
    /// Key whose secret went to the clipboard.
    Copied(String),
    Passwords(Vec<String>),
    /// `(usage, summary)` per verb.
    Help(Vec<(&'static str, &'static str)>),
    /// The store was written to this path.
    Saved(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: Status,
    pub view: View,
}

impl Reply {
    fn ok(view: View) -> Self {
        Self {
            status: Status::Ok,
            view,
        }
    }

    fn status(status: Status) -> Self {
        Self {
            status,
            view: View::Nothing,
        }
    }

    fn error(message: String) -> Self {
        Self {
            status: Status::OtherError,
            view: View::Error(message),
        }
    }
}

/// Shell verbs. Aliases parse to the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Verb {
    Help,
    Add,
    Edit,
    #[strum(to_string = "delete", serialize = "rm")]
    Delete,
    #[strum(to_string = "rename", serialize = "mv")]
    Rename,
    #[strum(to_string = "list", serialize = "ls")]
    List,
    Search,
    #[strum(to_string = "show", serialize = "cat")]
    Show,
    Print,
    #[strum(to_string = "copy", serialize = "cp")]
    Copy,
    #[strum(to_string = "generate", serialize = "gen")]
    Generate,
    Save,
    #[strum(to_string = "quit", serialize = "exit")]
    Quit,
}

impl Verb {
    /// Canonical name.
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn usage(self) -> &'static str {
        match self {
            Verb::Help => "help",
            Verb::Add => "add <key>",
            Verb::Edit => "edit [ref]",
            Verb::Delete => "delete <ref>",
            Verb::Rename => "rename <from> <to>",
            Verb::List => "list [query]",
            Verb::Search => "search <query>",
            Verb::Show => "show [ref]",
            Verb::Print => "print [ref]",
            Verb::Copy => "copy [ref]",
            Verb::Generate => "generate [count]",
            Verb::Save => "save",
            Verb::Quit => "quit",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Verb::Help => "Show this help",
            Verb::Add => "Add a new entry",
            Verb::Edit => "Change login, password or description",
            Verb::Delete => "Delete an entry",
            Verb::Rename => "Move an entry to a new key",
            Verb::List => "List entries, optionally filtered",
            Verb::Search => "Search logins and descriptions",
            Verb::Show => "Show an entry",
            Verb::Print => "Show an entry",
            Verb::Copy => "Copy the password to the clipboard",
            Verb::Generate => "Generate random passwords",
            Verb::Save => "Write the database to disk again",
            Verb::Quit => "Exit",
        }
    }

    /// Every accepted spelling, aliases included, for completion.
    pub fn spellings() -> Vec<&'static str> {
        let mut words: Vec<&'static str> = Verb::iter().map(Verb::name).collect();
        words.extend(["rm", "mv", "ls", "cat", "cp", "gen", "exit"]);
        words.sort_unstable();
        words
    }
}

/// Runs shell commands against one open store.
pub struct Dispatcher<P: Prompter, C: Clipboard> {
    store: EntryStore,
    session: SessionContext,
    codec: VaultCodec,
    prompter: P,
    clipboard: C,
}

impl<P: Prompter, C: Clipboard> Dispatcher<P, C> {
    pub fn new(store: EntryStore, codec: VaultCodec, prompter: P, clipboard: C) -> Self {
        Self {
            store,
            session: SessionContext::new(),
            codec,
            prompter,
            clipboard,
        }
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Split a raw input line on whitespace and dispatch it.
    ///
    /// Returns `None` for a blank line.
    pub fn execute_line(&mut self, line: &str) -> Option<Reply> {
        let mut words = line.split_whitespace();
        let verb = words.next()?;
        let params: Vec<&str> = words.collect();
        Some(self.dispatch(verb, &params))
    }

    /// Run `verb` with `params`.
    ///
    /// A word that is not a verb and comes without parameters is shown as an
    /// entry reference when it resolves to one. Verbs are matched first, so an
    /// entry whose key is also a verb needs `show <key>`.
    pub fn dispatch(&mut self, verb: &str, params: &[&str]) -> Reply {
        let parsed = verb.parse::<Verb>();
        debug!(verb, params = params.len(), known = parsed.is_ok(), "dispatching");

        let result = match parsed {
            Ok(verb) => self.run(verb, params),
            Err(_) if params.is_empty() => Ok(self.implicit_show(verb)),
            Err(_) => Ok(Reply::status(Status::NoSuchCommand)),
        };

        result.unwrap_or_else(|e| {
            warn!(error = %e, "command failed");
            Reply::error(e.to_string())
        })
    }

    fn run(&mut self, verb: Verb, params: &[&str]) -> Result<Reply> {
        match verb {
            Verb::Help => Ok(self.help()),
            Verb::Add => self.add(params),
            Verb::Edit => self.edit(params),
            Verb::Delete => Ok(self.delete(params)),
            Verb::Rename => Ok(self.rename(params)),
            Verb::List | Verb::Search => Ok(self.search(params)),
            Verb::Show | Verb::Print => Ok(self.show(params)),
            Verb::Copy => self.copy(params),
            Verb::Generate => Ok(self.generate(params)),
            Verb::Save => Ok(self.persist()),
            Verb::Quit => Ok(Reply::status(Status::Quit)),
        }
    }

    fn help(&self) -> Reply {
        Reply::ok(View::Help(
            Verb::iter().map(|v| (v.usage(), v.summary())).collect(),
        ))
    }

    fn add(&mut self, params: &[&str]) -> Result<Reply> {
        let key = match params {
            [] => return Ok(Reply::status(Status::MissingKey)),
            [key] => *key,
            _ => return Ok(Reply::status(Status::InvalidParameterCount)),
        };

        if self.store.get(key).is_some() {
            return Ok(Reply::status(Status::AlreadyExists));
        }

        let login = match self.prompter.read_line("Login", None)? {
            Some(login) if !login.is_empty() => login,
            _ => return Ok(Reply::status(Status::Aborted)),
        };
        let secret = match self.prompter.read_secret("Password")? {
            Some(secret) if !secret.is_empty() => secret,
            _ => return Ok(Reply::status(Status::Aborted)),
        };
        let Some(description) = self.prompter.read_line("Description", None)? else {
            return Ok(Reply::status(Status::Aborted));
        };

        self.store.add(key, &login, &secret, &description);
        self.session.invalidate();
        Ok(self.persist())
    }

    fn edit(&mut self, params: &[&str]) -> Result<Reply> {
        let Some(entry) = self.find(params) else {
            return Ok(Reply::status(Status::MissingKey));
        };

        let Some(login) = self.prompter.read_line("Login", Some(entry.login.as_str()))? else {
            return Ok(Reply::status(Status::Aborted));
        };
        let Some(secret) = self
            .prompter
            .read_secret("Password (empty keeps current)")?
        else {
            return Ok(Reply::status(Status::Aborted));
        };
        let Some(description) = self
            .prompter
            .read_line("Description", Some(entry.description.as_str()))?
        else {
            return Ok(Reply::status(Status::Aborted));
        };

        self.store.add(
            &entry.key,
            or_current(&login, &entry.login),
            or_current(&secret, &entry.secret),
            or_current(&description, &entry.description),
        );
        self.session.invalidate();
        Ok(self.persist())
    }

    fn delete(&mut self, params: &[&str]) -> Reply {
        let [reference] = params else {
            return Reply::status(Status::MissingKey);
        };

        let key = self.session.resolve(reference);
        self.store.delete(&key);
        self.session.invalidate();
        self.persist()
    }

    fn rename(&mut self, params: &[&str]) -> Reply {
        let [from, to] = params else {
            return Reply::status(Status::InvalidParameterCount);
        };

        let Some(entry) = self.store.get(&self.session.resolve(from)) else {
            return Reply::status(Status::NothingToShow);
        };

        // an existing entry at `to` is overwritten
        self.store.delete(&entry.key);
        self.store
            .add(to, &entry.login, &entry.secret, &entry.description);
        self.session.invalidate();
        self.persist()
    }

    fn search(&mut self, params: &[&str]) -> Reply {
        let query = params.join(" ");
        let results = self.store.search(&query);
        self.session.record(results.clone());
        Reply::ok(View::Listing(results))
    }

    fn show(&mut self, params: &[&str]) -> Reply {
        match self.find(params) {
            Some(entry) => Reply::ok(View::Entry(entry)),
            None => Reply::status(Status::NothingToShow),
        }
    }

    fn implicit_show(&mut self, token: &str) -> Reply {
        match self.find(&[token]) {
            Some(entry) => Reply::ok(View::Entry(entry)),
            None => Reply::status(Status::NoSuchCommand),
        }
    }

    fn copy(&mut self, params: &[&str]) -> Result<Reply> {
        let Some(entry) = self.find(params) else {
            return Ok(Reply::status(Status::NothingToShow));
        };

        if let Err(e) = self.clipboard.copy(&entry.secret) {
            return Ok(Reply::error(e.to_string()));
        }
        Ok(Reply::ok(View::Copied(entry.key)))
    }

    fn generate(&mut self, params: &[&str]) -> Reply {
        let count = match params {
            [] => DEFAULT_BATCH,
            [count] => match count.parse::<usize>() {
                Ok(n) if (1..=MAX_BATCH).contains(&n) => n,
                _ => return Reply::status(Status::InvalidParameterCount),
            },
            _ => return Reply::status(Status::InvalidParameterCount),
        };

        let passwords = generator::generate_batch(&mut rand::thread_rng(), count);
        Reply::ok(View::Passwords(passwords))
    }

    /// Resolve a reference and remember the key when it names an entry.
    fn find(&mut self, params: &[&str]) -> Option<Entry> {
        let key = self.session.resolve_implicit(params)?;
        let entry = self.store.get(&key)?;
        self.session.touch(&entry.key);
        Some(entry)
    }

    /// Save the store. A failure keeps the in-memory changes so `save` can
    /// be retried.
    fn persist(&mut self) -> Reply {
        match self.codec.save(&self.store) {
            Ok(()) => Reply::ok(View::Saved(self.store.path().display().to_string())),
            Err(e) => {
                warn!(error = %e, path = %self.store.path().display(), "save failed");
                Reply::error(format!("Error while saving: {e}"))
            }
        }
    }
}

fn or_current<'a>(answer: &'a str, current: &'a str) -> &'a str {
    if answer.is_empty() {
        current
    } else {
        answer
    }
}
