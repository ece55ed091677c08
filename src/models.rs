//! Data models for the credential store.

use serde::{Deserialize, Serialize};

/// The persisted half of an entry. The key lives in the map that owns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub login: String,
    pub secret: String,
    pub description: String,
}

/// A single credential together with the key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Unique, user-chosen identifier
    pub key: String,
    pub login: String,
    /// The password value
    pub secret: String,
    pub description: String,
}

impl Entry {
    /// Build an entry from a map key and its credential.
    pub fn from_credential(key: &str, credential: &Credential) -> Self {
        Self {
            key: key.to_string(),
            login: credential.login.clone(),
            secret: credential.secret.clone(),
            description: credential.description.clone(),
        }
    }

    /// Check whether `query` occurs in the login or the description.
    ///
    /// An empty query matches everything. Matching is case-sensitive.
    pub fn matches(&self, query: &str) -> bool {
        query.is_empty() || self.login.contains(query) || self.description.contains(query)
    }
}
