//! Volatile per-session state used to resolve entry references.
//!
//! Users can refer to an entry by its position in the last listing or by its
//! literal key. A numeric token inside the listing's range is always read as
//! a position, even when an entry with that literal key exists.

use crate::models::Entry;

/// Most recent listing and most recently referenced key.
#[derive(Debug, Default, Clone)]
pub struct SessionContext {
    last_results: Vec<Entry>,
    last_key: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `token` to a key: an in-range index into the last listing, or the
    /// token itself.
    pub fn resolve(&self, token: &str) -> String {
        if let Ok(index) = token.parse::<usize>() {
            if let Some(entry) = self.last_results.get(index) {
                return entry.key.clone();
            }
        }
        token.to_string()
    }

    /// Resolve a command's reference parameter.
    ///
    /// With exactly one parameter this is [`resolve`](Self::resolve). With
    /// none (or too many) it falls back to the last referenced key, then to
    /// the first entry of the last listing.
    pub fn resolve_implicit(&self, params: &[&str]) -> Option<String> {
        if let [token] = params {
            return Some(self.resolve(token));
        }
        self.last_key
            .clone()
            .or_else(|| self.last_results.first().map(|entry| entry.key.clone()))
    }

    /// Replace the last listing. The last key is kept.
    pub fn record(&mut self, results: Vec<Entry>) {
        self.last_results = results;
    }

    pub fn touch(&mut self, key: &str) {
        self.last_key = Some(key.to_string());
    }

    /// Forget everything; called after entries were added, deleted or renamed.
    pub fn invalidate(&mut self) {
        self.last_results.clear();
        self.last_key = None;
    }

    pub fn last_results(&self) -> &[Entry] {
        &self.last_results
    }

    pub fn last_key(&self) -> Option<&str> {
        self.last_key.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str) -> Entry {
        Entry {
            key: key.to_string(),
            login: format!("{key}-login"),
            secret: "s".to_string(),
            description: String::new(),
        }
    }

    fn session() -> SessionContext {
        let mut session = SessionContext::new();
        session.record(vec![entry("alpha"), entry("bravo"), entry("charlie")]);
        session
    }

    #[test]
    fn test_resolve_index() {
        let session = session();
        assert_eq!(session.resolve("0"), "alpha");
        assert_eq!(session.resolve("1"), "bravo");
        assert_eq!(session.resolve("1"), "bravo");
        assert_eq!(session.resolve("2"), "charlie");
    }

    #[test]
    fn test_resolve_literal() {
        let session = session();
        assert_eq!(session.resolve("alice"), "alice");
        assert_eq!(session.resolve("3"), "3");
        assert_eq!(session.resolve("-1"), "-1");
        assert_eq!(session.resolve(""), "");
    }

    #[test]
    fn test_position_wins_over_numeric_key() {
        let mut session = SessionContext::new();
        session.record(vec![entry("zulu"), entry("1")]);
        // "1" is in range, so it names position 1 even though a key "1" exists
        assert_eq!(session.resolve("1"), "1");
        assert_eq!(session.resolve("0"), "zulu");
    }

    #[test]
    fn test_resolve_implicit_single_param() {
        let session = session();
        assert_eq!(session.resolve_implicit(&["2"]), Some("charlie".to_string()));
        assert_eq!(session.resolve_implicit(&["x"]), Some("x".to_string()));
    }

    #[test]
    fn test_resolve_implicit_fallbacks() {
        let mut session = session();
        assert_eq!(session.resolve_implicit(&[]), Some("alpha".to_string()));

        session.touch("bravo");
        assert_eq!(session.resolve_implicit(&[]), Some("bravo".to_string()));
        assert_eq!(
            session.resolve_implicit(&["a", "b"]),
            Some("bravo".to_string())
        );

        assert_eq!(SessionContext::new().resolve_implicit(&[]), None);
    }

    #[test]
    fn test_record_keeps_last_key() {
        let mut session = session();
        session.touch("charlie");
        session.record(vec![entry("delta")]);

        assert_eq!(session.last_key(), Some("charlie"));
        assert_eq!(session.resolve("0"), "delta");
    }

    #[test]
    fn test_invalidate() {
        let mut session = session();
        session.touch("alpha");
        session.invalidate();

        assert!(session.last_results().is_empty());
        assert_eq!(session.last_key(), None);
        assert_eq!(session.resolve("0"), "0");
        assert_eq!(session.resolve_implicit(&[]), None);
    }
}
