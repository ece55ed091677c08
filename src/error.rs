//! Error types for npass.

use crate::crypto::CryptoError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vault operations.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Database file not found: {0}")]
    NotFound(PathBuf),

    #[error("Decryption failed - database is corrupt or not an npass file")]
    Decryption,

    #[error("Decryption failed - incorrect passphrase")]
    InvalidPassphrase,

    #[error("Encryption failed")]
    Encryption,

    #[error("Malformed database contents: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("Failed to serialize entries: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Passphrases do not match")]
    PasswordMismatch,

    #[error("Empty passphrase")]
    EmptyPassphrase,

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Clipboard operation failed")]
    ClipboardFailed,

    #[error("A terminal is required to read the passphrase")]
    NoTerminal,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crypto error: {0}")]
    Crypto(CryptoError),

    #[error("{0}")]
    Other(String),
}

impl VaultError {
    /// True for every failure that means the ciphertext could not be opened.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, VaultError::Decryption | VaultError::InvalidPassphrase)
    }
}

impl From<CryptoError> for VaultError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::EncryptionFailed => VaultError::Encryption,
            CryptoError::InvalidPassphrase => VaultError::InvalidPassphrase,
            CryptoError::DecryptionFailed
            | CryptoError::InvalidBase64
            | CryptoError::Truncated => VaultError::Decryption,
            other => VaultError::Crypto(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decryption_class() {
        assert!(VaultError::Decryption.is_decryption_failure());
        assert!(VaultError::InvalidPassphrase.is_decryption_failure());
        assert!(!VaultError::Encryption.is_decryption_failure());
        assert!(!VaultError::NotFound(PathBuf::from("x")).is_decryption_failure());
    }

    #[test]
    fn test_crypto_error_mapping() {
        assert!(matches!(
            VaultError::from(CryptoError::InvalidPassphrase),
            VaultError::InvalidPassphrase
        ));
        assert!(matches!(
            VaultError::from(CryptoError::Truncated),
            VaultError::Decryption
        ));
        assert!(matches!(
            VaultError::from(CryptoError::EncryptionFailed),
            VaultError::Encryption
        ));
        assert!(matches!(
            VaultError::from(CryptoError::KeyDerivationFailed),
            VaultError::Crypto(_)
        ));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            VaultError::InvalidPassphrase.to_string(),
            "Decryption failed - incorrect passphrase"
        );
        assert_eq!(
            VaultError::NotFound(PathBuf::from("/tmp/db")).to_string(),
            "Database file not found: /tmp/db"
        );
    }
}
