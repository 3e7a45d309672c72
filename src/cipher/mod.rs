//! The encrypt/decrypt capability used for encrypted columns.

use thiserror::Error;

mod aes;

pub use aes::AesGcmCipher;

/// Failure raised by a [`Cipher`] implementation.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    #[error("cipher operation failed: {0}")]
    OperationFailed(String),
}

/// Symmetric string cipher applied to encrypted columns.
///
/// `decrypt(encrypt(x))` must give back `x`, up to trailing whitespace which the caller
/// trims. Encryption may be randomized. Implementations are shared across statements
/// and must not hold mutable state.
pub trait Cipher: Send + Sync {
    /// Encrypt a non-empty plaintext.
    ///
    /// # Errors
    /// Returns [`CipherError`] if the plaintext cannot be encrypted.
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError>;

    /// Decrypt a ciphertext previously produced by [`Cipher::encrypt`].
    ///
    /// # Errors
    /// Returns [`CipherError`] if the ciphertext is malformed or fails authentication.
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError>;
}
