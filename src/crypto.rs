//! Passphrase envelope for the database file using Argon2id and AES-256-GCM.
//!
//! An envelope is the base64 encoding of `salt || nonce || ciphertext`, where
//! the AES-GCM tag is appended to the ciphertext. A fresh salt and nonce are
//! drawn for every seal, so sealing the same payload twice never produces the
//! same envelope.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use argon2::{password_hash::rand_core::RngCore, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Errors that can occur during cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed")]
    EncryptionFailed,
    #[error("Decryption failed")]
    DecryptionFailed,
    #[error("Invalid base64 encoding")]
    InvalidBase64,
    #[error("Envelope is too short")]
    Truncated,
    #[error("Invalid passphrase")]
    InvalidPassphrase,
    #[error("Key derivation failed")]
    KeyDerivationFailed,
}

/// Handles all cryptographic operations for the database file.
#[derive(Debug, Clone)]
pub struct VaultCrypto {
    // Argon2id parameters (tuned for desktop use)
    argon2_time_cost: u32,
    argon2_memory_cost: u32,
    argon2_parallelism: u32,
    argon2_hash_len: usize,
    argon2_salt_len: usize,
    // AES-GCM parameters
    aes_nonce_size: usize,
}

impl Default for VaultCrypto {
    fn default() -> Self {
        Self {
            argon2_time_cost: 2,
            argon2_memory_cost: 65536, // 64 MB
            argon2_parallelism: 1,
            argon2_hash_len: 32, // 256 bits for AES-256
            argon2_salt_len: 16, // 128 bits
            aes_nonce_size: 12,  // 96 bits (GCM standard)
        }
    }
}

impl VaultCrypto {
    /// Create a new VaultCrypto instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an instance with a custom Argon2id cost.
    ///
    /// The file format carries no parameters, so an envelope sealed with a
    /// custom cost only opens with the same cost.
    pub fn with_cost(memory_kib: u32, time_cost: u32) -> Self {
        Self {
            argon2_time_cost: time_cost,
            argon2_memory_cost: memory_kib,
            ..Self::default()
        }
    }

    /// Generate a new random salt.
    pub fn generate_salt(&self) -> Vec<u8> {
        let mut salt = vec![0u8; self.argon2_salt_len];
        OsRng.fill_bytes(&mut salt);
        salt
    }

    /// Derive encryption key from passphrase using Argon2id.
    /// Returns a key that will be automatically zeroed on drop.
    pub fn derive_key(&self, passphrase: &str, salt: &[u8]) -> Result<DerivedKey, CryptoError> {
        let params = Params::new(
            self.argon2_memory_cost,
            self.argon2_time_cost,
            self.argon2_parallelism,
            Some(self.argon2_hash_len),
        )
        .map_err(|_| CryptoError::KeyDerivationFailed)?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

        let mut output = vec![0u8; self.argon2_hash_len];
        argon2
            .hash_password_into(passphrase.as_bytes(), salt, &mut output)
            .map_err(|_| CryptoError::KeyDerivationFailed)?;

        Ok(DerivedKey(output))
    }

    /// Seal a payload under `passphrase` and return the base64 envelope.
    pub fn seal(&self, plaintext: &[u8], passphrase: &str) -> Result<String, CryptoError> {
        let salt = self.generate_salt();
        let key = self.derive_key(passphrase, &salt)?;
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut combined = Vec::with_capacity(salt.len() + nonce.len() + ciphertext.len());
        combined.extend_from_slice(&salt);
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(&combined))
    }

    /// Open an envelope, asking `passphrase` for the key material.
    ///
    /// `passphrase` is called once per attempt with the zero-based attempt
    /// number. After `max_attempts` failed attempts no further call is made
    /// and `CryptoError::InvalidPassphrase` is returned instead. A malformed
    /// envelope fails before the callback is ever invoked.
    pub fn open<F>(
        &self,
        envelope: &str,
        max_attempts: u32,
        mut passphrase: F,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError>
    where
        F: FnMut(u32) -> Result<Zeroizing<String>, CryptoError>,
    {
        let combined = STANDARD
            .decode(envelope.trim())
            .map_err(|_| CryptoError::InvalidBase64)?;

        let header_len = self.argon2_salt_len + self.aes_nonce_size;
        if combined.len() < header_len {
            return Err(CryptoError::Truncated);
        }

        let (salt, rest) = combined.split_at(self.argon2_salt_len);
        let (nonce_bytes, ciphertext) = rest.split_at(self.aes_nonce_size);
        let nonce = Nonce::from_slice(nonce_bytes);

        let mut attempt = 0;
        loop {
            if attempt >= max_attempts {
                return Err(CryptoError::InvalidPassphrase);
            }

            let secret = passphrase(attempt)?;
            let key = self.derive_key(&secret, salt)?;
            let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

            match cipher.decrypt(nonce, ciphertext) {
                Ok(plaintext) => return Ok(Zeroizing::new(plaintext)),
                Err(_) => {
                    debug!(attempt, "envelope authentication failed");
                    attempt += 1;
                }
            }
        }
    }
}

/// A derived key that automatically zeroes itself on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey(Vec<u8>);

impl DerivedKey {
    /// Get a reference to the key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
