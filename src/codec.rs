//! Encrypted persistence of an [`EntryStore`].
//!
//! The entry map is serialized to JSON first and the JSON bytes are sealed
//! second, so the file is always "envelope wrapping a self-describing
//! payload". The passphrase is taken from the store; loading never prompts.

use crate::crypto::VaultCrypto;
use crate::error::{Result, VaultError};
use crate::models::Credential;
use crate::store::EntryStore;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use zeroize::Zeroizing;

/// Decryption attempts allowed while loading. The passphrase was supplied
/// once at startup and there is nobody to ask again.
pub const LOAD_ATTEMPTS: u32 = 1;

/// Reads and writes encrypted database files.
#[derive(Debug, Clone, Default)]
pub struct VaultCodec {
    crypto: VaultCrypto,
}

impl VaultCodec {
    /// Create a codec with the default key derivation cost.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec on top of a specific cipher configuration.
    pub fn with_crypto(crypto: VaultCrypto) -> Self {
        Self { crypto }
    }

    /// Serialize, encrypt and write the store to its path.
    ///
    /// The new envelope is written to a sibling temporary file which then
    /// replaces the target, so an existing database is never left truncated.
    pub fn save(&self, store: &EntryStore) -> Result<()> {
        let payload = Zeroizing::new(
            serde_json::to_vec(store.credentials()).map_err(VaultError::Serialization)?,
        );
        let envelope = self.crypto.seal(&payload, store.passphrase())?;

        write_replacing(store.path(), envelope.as_bytes())?;
        info!(path = %store.path().display(), entries = store.len(), "saved database");
        Ok(())
    }

    /// Decrypt and deserialize the store's file into the store.
    ///
    /// On any failure the store's entries are left untouched.
    pub fn load(&self, store: &mut EntryStore) -> Result<()> {
        let path = store.path();
        if !path.exists() {
            return Err(VaultError::NotFound(path.to_path_buf()));
        }

        let envelope = fs::read_to_string(path).map_err(|e| match e.kind() {
            // a binary file is not one of ours
            std::io::ErrorKind::InvalidData => VaultError::Decryption,
            _ => VaultError::Io(e),
        })?;

        let passphrase = store.passphrase();
        let plaintext = self.crypto.open(&envelope, LOAD_ATTEMPTS, |attempt| {
            debug!(attempt, "supplying session passphrase");
            Ok(Zeroizing::new(passphrase.to_string()))
        })?;

        let entries: BTreeMap<String, Credential> =
            serde_json::from_slice(&plaintext).map_err(VaultError::Deserialization)?;

        info!(path = %path.display(), entries = entries.len(), "loaded database");
        store.replace_credentials(entries);
        Ok(())
    }

    /// Start an empty database at the store's path and write it out.
    pub fn create(&self, store: &mut EntryStore) -> Result<()> {
        store.replace_credentials(BTreeMap::new());
        self.save(store)
    }
}

fn write_replacing(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;

    // Set secure permissions
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o600))?;
    }

    temp.persist(path).map_err(|e| VaultError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn codec() -> VaultCodec {
        VaultCodec::with_crypto(VaultCrypto::with_cost(1024, 1))
    }

    #[test]
    fn test_create_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("npass.db");
        let codec = codec();

        let mut store = EntryStore::new(&path, "pw");
        store.add("stale", "x", "y", "z");
        codec.create(&mut store).unwrap();
        assert!(store.is_empty());
        assert!(path.exists());

        let mut reopened = EntryStore::new(&path, "pw");
        codec.load(&mut reopened).unwrap();
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("npass.db");
        let codec = codec();

        let mut store = EntryStore::new(&path, "pw");
        store.add("svc1", "u", "p", "d");
        store.add("svc2", "ü-login", "p@ss \"quoted\"", "");
        codec.save(&store).unwrap();

        let mut reopened = EntryStore::new(&path, "pw");
        codec.load(&mut reopened).unwrap();
        assert_eq!(reopened.search(""), store.search(""));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut store = EntryStore::new(dir.path().join("absent.db"), "pw");

        let err = codec().load(&mut store).unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));
    }

    #[test]
    fn test_wrong_passphrase_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("npass.db");
        let codec = codec();

        let mut store = EntryStore::new(&path, "right");
        store.add("svc1", "u", "p", "d");
        codec.save(&store).unwrap();

        let mut other = EntryStore::new(&path, "wrong");
        other.add("local", "a", "b", "c");
        let err = codec.load(&mut other).unwrap_err();

        assert!(err.is_decryption_failure());
        assert_eq!(other.keys(), vec!["local"]);
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("npass.db");
        fs::write(&path, "definitely not an envelope").unwrap();

        let mut store = EntryStore::new(&path, "pw");
        let err = codec().load(&mut store).unwrap_err();
        assert!(matches!(err, VaultError::Decryption));
    }

    #[test]
    fn test_malformed_payload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("npass.db");
        let crypto = VaultCrypto::with_cost(1024, 1);
        let envelope = crypto.seal(b"[1, 2, 3]", "pw").unwrap();
        fs::write(&path, envelope).unwrap();

        let mut store = EntryStore::new(&path, "pw");
        let err = VaultCodec::with_crypto(crypto).load(&mut store).unwrap_err();
        assert!(matches!(err, VaultError::Deserialization(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let store = EntryStore::new(dir.path().join("nope").join("npass.db"), "pw");

        let err = codec().save(&store).unwrap_err();
        assert!(matches!(err, VaultError::Io(_)));
    }

    #[test]
    fn test_save_replaces_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("npass.db");
        let codec = codec();

        let mut store = EntryStore::new(&path, "pw");
        store.add("a", "1", "2", "3");
        codec.save(&store).unwrap();
        store.delete("a");
        store.add("b", "4", "5", "6");
        codec.save(&store).unwrap();

        let mut reopened = EntryStore::new(&path, "pw");
        codec.load(&mut reopened).unwrap();
        assert_eq!(reopened.keys(), vec!["b"]);

        // only the database itself remains in the directory
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("npass.db");
        codec().save(&EntryStore::new(&path, "pw")).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
