// Integration tests for the encrypted database file
// These tests go through the public codec API only

use npass::crypto::VaultCrypto;
use npass::{EntryStore, VaultCodec, VaultError};
use std::fs;
use tempfile::TempDir;

fn codec() -> VaultCodec {
    VaultCodec::with_crypto(VaultCrypto::with_cost(1024, 1))
}

fn populated(path: &std::path::Path, passphrase: &str, count: usize) -> EntryStore {
    let mut store = EntryStore::new(path, passphrase);
    for i in 0..count {
        store.add(
            &format!("key-{i:03}"),
            &format!("login-{i}"),
            &format!("secret {i} with spaces and ünïcode"),
            &format!("description {i}"),
        );
    }
    store
}

#[test]
fn test_round_trip_for_various_sizes() {
    let dir = TempDir::new().unwrap();
    let codec = codec();

    for count in [0, 1, 2, 25] {
        let path = dir.path().join(format!("db-{count}"));
        let store = populated(&path, "passphrase", count);
        codec.save(&store).unwrap();

        let mut loaded = EntryStore::new(&path, "passphrase");
        codec.load(&mut loaded).unwrap();

        assert_eq!(loaded.len(), count);
        assert_eq!(loaded.search(""), store.search(""));
    }
}

#[test]
fn test_wrong_passphrase_never_yields_entries() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("npass.db");
    let codec = codec();
    codec.save(&populated(&path, "right", 5)).unwrap();

    for wrong in ["wrong", "right ", "RIGHT"] {
        let mut loaded = EntryStore::new(&path, wrong);
        let err = codec.load(&mut loaded).unwrap_err();

        assert!(err.is_decryption_failure(), "unexpected error: {err}");
        assert!(loaded.is_empty());
    }
}

#[test]
fn test_file_does_not_contain_plaintext() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("npass.db");
    codec().save(&populated(&path, "pw", 3)).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("login-1"));
    assert!(!raw.contains("secret"));
    assert!(!raw.contains("key-000"));
}

#[test]
fn test_truncated_file_is_a_decryption_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("npass.db");
    codec().save(&populated(&path, "pw", 3)).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    fs::write(&path, &raw[..raw.len() / 2]).unwrap();

    let mut loaded = EntryStore::new(&path, "pw");
    let err = codec().load(&mut loaded).unwrap_err();
    assert!(err.is_decryption_failure());
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let mut store = EntryStore::new(dir.path().join("nothing-here"), "pw");

    assert!(matches!(
        codec().load(&mut store),
        Err(VaultError::NotFound(_))
    ));
}

#[test]
fn test_default_cost_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("npass.db");
    let codec = VaultCodec::new();

    let mut store = EntryStore::new(&path, "correct horse");
    codec.create(&mut store).unwrap();
    store.add("svc", "u", "p", "d");
    codec.save(&store).unwrap();

    let mut loaded = EntryStore::new(&path, "correct horse");
    codec.load(&mut loaded).unwrap();
    assert_eq!(loaded.get("svc"), store.get("svc"));
}
