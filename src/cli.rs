//! Command-line arguments and the startup sequence.

use crate::codec::VaultCodec;
use crate::dispatcher::Dispatcher;
use crate::error::{Result, VaultError};
use crate::interactive::Shell;
use crate::prompt::{self, Prompter, TerminalPrompter};
use crate::security::SystemClipboard;
use crate::store::EntryStore;
use crate::utils::warning;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

/// Database file name used when no path is given.
pub const DEFAULT_DB_NAME: &str = ".npass.db";

/// Encrypted password store with an interactive shell.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the database file
    #[arg(value_name = "DATABASE")]
    pub database: Option<PathBuf>,

    /// Path to the database file (alternative to the positional argument)
    #[arg(short = 'f', long, env = "NPASS_DB")]
    pub file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the database path: positional argument, `--file`/`NPASS_DB`,
    /// then `~/.npass.db`.
    pub fn db_path(&self) -> Result<PathBuf> {
        if let Some(path) = self.database.as_ref().or(self.file.as_ref()) {
            return Ok(path.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_DB_NAME))
            .ok_or_else(|| VaultError::Other("Cannot determine home directory".to_string()))
    }

    /// Open the database and run the shell.
    pub fn execute(&self) -> Result<()> {
        let path = self.db_path()?;

        if !atty::is(atty::Stream::Stdin) {
            return Err(VaultError::NoTerminal);
        }

        for warn in crate::utils::check_file_permissions(&path) {
            warning(&warn);
        }

        let codec = VaultCodec::new();
        let mut prompter = TerminalPrompter::new();
        let store = open_store(&path, &codec, &mut prompter)?;

        let dispatcher = Dispatcher::new(store, codec, prompter, SystemClipboard::new());
        Shell::new(dispatcher)?.run()
    }
}

/// Create the database at `path` if it is missing, otherwise unlock it.
///
/// A new database needs the passphrase twice; an existing one is asked for
/// once and any load failure is returned to the caller.
pub fn open_store(
    path: &Path,
    codec: &VaultCodec,
    prompter: &mut dyn Prompter,
) -> Result<EntryStore> {
    if !path.exists() {
        println!(
            "File '{}' does not exist. Creating new database. Press Ctrl-C to abort.",
            path.display()
        );
        let passphrase = prompt::new_passphrase(prompter)?;
        let mut store = EntryStore::new(path, passphrase);
        codec.create(&mut store)?;
        info!(path = %path.display(), "created database");
        return Ok(store);
    }

    let passphrase = prompt::existing_passphrase(prompter)?;
    let mut store = EntryStore::new(path, passphrase);
    codec.load(&mut store)?;
    Ok(store)
}
