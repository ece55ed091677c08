//! In-memory entry store.
//!
//! The store knows nothing about encryption or the shell. It owns the
//! passphrase and path it was opened with so the codec can persist it.

use crate::models::{Credential, Entry};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Mapping from entry key to credential, plus the file it belongs to.
pub struct EntryStore {
    path: PathBuf,
    passphrase: Zeroizing<String>,
    entries: BTreeMap<String, Credential>,
}

impl EntryStore {
    /// Create an empty store bound to `path` and `passphrase`.
    pub fn new(path: impl Into<PathBuf>, passphrase: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            passphrase: Zeroizing::new(passphrase.into()),
            entries: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or overwrite the entry at `key`.
    pub fn add(&mut self, key: &str, login: &str, secret: &str, description: &str) {
        self.entries.insert(
            key.to_string(),
            Credential {
                login: login.to_string(),
                secret: secret.to_string(),
                description: description.to_string(),
            },
        );
    }

    /// Remove the entry at `key`. Absent keys are ignored.
    pub fn delete(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Get an owned copy of the entry at `key`.
    pub fn get(&self, key: &str) -> Option<Entry> {
        self.entries
            .get(key)
            .map(|credential| Entry::from_credential(key, credential))
    }

    /// Entries whose login or description contain `query`, sorted by key.
    pub fn search(&self, query: &str) -> Vec<Entry> {
        // BTreeMap iterates in key order
        self.entries
            .iter()
            .map(|(key, credential)| Entry::from_credential(key, credential))
            .filter(|entry| entry.matches(query))
            .collect()
    }

    /// All keys in ascending order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub(crate) fn credentials(&self) -> &BTreeMap<String, Credential> {
        &self.entries
    }

    pub(crate) fn replace_credentials(&mut self, entries: BTreeMap<String, Credential>) {
        self.entries = entries;
    }
}

impl fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryStore")
            .field("path", &self.path)
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}
