use std::fmt;

use aes_gcm::aead::Aead;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::{Aes256Gcm, KeyInit};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;

use super::{Cipher, CipherError};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// AES-256-GCM cipher producing `base64(nonce || ciphertext)`.
///
/// A fresh random nonce is drawn per call, so equal plaintexts encrypt differently.
#[derive(Clone)]
pub struct AesGcmCipher {
    key: [u8; KEY_LEN],
}

impl fmt::Debug for AesGcmCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcmCipher").finish_non_exhaustive()
    }
}

impl AesGcmCipher {
    #[must_use]
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Build from a base64-encoded 32-byte key.
    ///
    /// # Errors
    /// Returns [`CipherError::InvalidKey`] if the input is not base64 or not 32 bytes long.
    pub fn from_base64_key(encoded: &str) -> Result<Self, CipherError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CipherError::InvalidKey(format!("key is not valid base64: {e}")))?;
        let key: [u8; KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
            CipherError::InvalidKey(format!(
                "key must be exactly {KEY_LEN} bytes, got {} bytes",
                bytes.len()
            ))
        })?;
        Ok(Self::new(key))
    }

    /// Build from a base64-encoded key held in environment variable `var`.
    ///
    /// # Errors
    /// Returns [`CipherError::InvalidKey`] if the variable is unset or holds a bad key.
    pub fn from_env(var: &str) -> Result<Self, CipherError> {
        let encoded = std::env::var(var)
            .map_err(|e| CipherError::InvalidKey(format!("{var}: {e}")))?;
        Self::from_base64_key(&encoded)
    }

    /// A key drawn from the thread-local RNG, base64-encoded.
    #[must_use]
    pub fn generate_key() -> String {
        let mut key = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        STANDARD.encode(key)
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(GenericArray::from_slice(&self.key))
    }
}

impl Cipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = GenericArray::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher()
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CipherError::OperationFailed(format!("encryption failed: {e}")))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let data = STANDARD
            .decode(ciphertext.trim())
            .map_err(|e| CipherError::MalformedCiphertext(format!("not valid base64: {e}")))?;
        if data.len() < NONCE_LEN {
            return Err(CipherError::MalformedCiphertext(
                "ciphertext too short".to_string(),
            ));
        }

        let (nonce, body) = data.split_at(NONCE_LEN);
        let plaintext = self
            .cipher()
            .decrypt(GenericArray::from_slice(nonce), body)
            .map_err(|e| CipherError::OperationFailed(format!("decryption failed: {e}")))?;

        String::from_utf8(plaintext)
            .map_err(|e| CipherError::MalformedCiphertext(format!("plaintext is not UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> AesGcmCipher {
        AesGcmCipher::new([7u8; KEY_LEN])
    }

    #[test]
    fn round_trips() {
        let c = cipher();
        for plain in ["123-45-6789", "x", "ünïcødé", "trailing  "] {
            let enc = c.encrypt(plain).unwrap();
            assert_ne!(enc, plain);
            assert_eq!(c.decrypt(&enc).unwrap(), plain);
        }
    }

    #[test]
    fn randomized_nonce() {
        let c = cipher();
        assert_ne!(c.encrypt("same").unwrap(), c.encrypt("same").unwrap());
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let enc = cipher().encrypt("secret").unwrap();
        let other = AesGcmCipher::new([8u8; KEY_LEN]);
        assert!(matches!(
            other.decrypt(&enc),
            Err(CipherError::OperationFailed(_))
        ));
    }

    #[test]
    fn malformed_input_is_rejected() {
        let c = cipher();
        assert!(matches!(
            c.decrypt("not base64!!"),
            Err(CipherError::MalformedCiphertext(_))
        ));
        assert!(matches!(
            c.decrypt(&STANDARD.encode([1u8; 4])),
            Err(CipherError::MalformedCiphertext(_))
        ));
    }

    #[test]
    fn base64_key_length_is_checked() {
        assert!(AesGcmCipher::from_base64_key(&AesGcmCipher::generate_key()).is_ok());
        assert!(matches!(
            AesGcmCipher::from_base64_key(&STANDARD.encode([0u8; 16])),
            Err(CipherError::InvalidKey(_))
        ));
    }
}
