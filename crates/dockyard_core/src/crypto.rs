//! Field-level encryption for sensitive byte columns.
//!
//! # Responsibility
//! - Turn the configured key string into a fixed-size symmetric key.
//! - Seal and open individual column values with ChaCha20-Poly1305.
//!
//! # Invariants
//! - Every sealed value carries its own random 12-byte nonce as a prefix.
//! - Empty values are stored empty and never sealed.
//! - Key material is never printed through `Debug`.

use crate::config::ConfigError;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use uuid::Uuid;

/// Required key length in bytes.
pub const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// 32-byte symmetric key protecting sensitive columns.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    /// Copies the raw bytes of `value` into a key.
    ///
    /// # Errors
    /// - Returns [`ConfigError::InvalidEncryptionKey`] unless `value` is
    ///   exactly [`KEY_LEN`] bytes long.
    pub fn from_passphrase(value: &str) -> Result<Self, ConfigError> {
        let bytes: [u8; KEY_LEN] = value
            .as_bytes()
            .try_into()
            .map_err(|_| ConfigError::InvalidEncryptionKey { len: value.len() })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Debug for EncryptionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

/// Errors raised while sealing or opening a column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    Encrypt,
    Decrypt,
    Truncated { len: usize },
}

impl Display for CryptoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encrypt => write!(f, "failed to encrypt column value"),
            Self::Decrypt => write!(f, "failed to decrypt column value (wrong key or tampered data)"),
            Self::Truncated { len } => {
                write!(f, "encrypted column value is truncated ({len} bytes)")
            }
        }
    }
}

impl Error for CryptoError {}

/// Seals and opens sensitive column values.
pub struct FieldCipher {
    aead: ChaCha20Poly1305,
}

impl FieldCipher {
    pub fn new(key: &EncryptionKey) -> Self {
        Self {
            aead: ChaCha20Poly1305::new(Key::from_slice(key.as_bytes())),
        }
    }

    /// Seals `plaintext` as `nonce || ciphertext`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if plaintext.is_empty() {
            return Ok(Vec::new());
        }

        let nonce_source = Uuid::new_v4();
        let nonce_bytes = &nonce_source.as_bytes()[..NONCE_LEN];
        let ciphertext = self
            .aead
            .encrypt(Nonce::from_slice(nonce_bytes), plaintext)
            .map_err(|_| CryptoError::Encrypt)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Opens a value produced by [`FieldCipher::encrypt`].
    pub fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if sealed.is_empty() {
            return Ok(Vec::new());
        }
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::Truncated { len: sealed.len() });
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        self.aead
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Decrypt)
    }
}

impl Debug for FieldCipher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("FieldCipher")
    }
}

#[cfg(test)]
mod tests {
    use super::{CryptoError, EncryptionKey, FieldCipher, KEY_LEN};
    use crate::config::ConfigError;

    const TEST_KEY: &str = "__random_strong_encryption_key__";

    fn cipher() -> FieldCipher {
        FieldCipher::new(&EncryptionKey::from_passphrase(TEST_KEY).unwrap())
    }

    #[test]
    fn key_must_be_exactly_32_bytes() {
        assert_eq!(TEST_KEY.len(), KEY_LEN);
        assert!(EncryptionKey::from_passphrase(TEST_KEY).is_ok());

        let err = EncryptionKey::from_passphrase("short").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEncryptionKey { len: 5 }));
    }

    #[test]
    fn debug_output_hides_key_bytes() {
        let key = EncryptionKey::from_passphrase(TEST_KEY).unwrap();
        let rendered = format!("{key:?}");
        assert!(!rendered.contains("random"));
    }

    #[test]
    fn sealed_value_differs_from_plaintext_and_opens_back() {
        let cipher = cipher();
        let sealed = cipher.encrypt(b"current-context: testing\n").unwrap();
        assert_ne!(sealed.as_slice(), b"current-context: testing\n".as_slice());
        assert_eq!(cipher.decrypt(&sealed).unwrap(), b"current-context: testing\n");
    }

    #[test]
    fn same_plaintext_uses_fresh_nonce() {
        let cipher = cipher();
        let first = cipher.encrypt(b"secret").unwrap();
        let second = cipher.encrypt(b"secret").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn empty_value_is_not_sealed() {
        let cipher = cipher();
        assert!(cipher.encrypt(b"").unwrap().is_empty());
        assert!(cipher.decrypt(b"").unwrap().is_empty());
    }

    #[test]
    fn tampered_or_truncated_values_are_rejected() {
        let cipher = cipher();
        let mut sealed = cipher.encrypt(b"secret").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0xff;
        assert_eq!(cipher.decrypt(&sealed), Err(CryptoError::Decrypt));

        assert_eq!(
            cipher.decrypt(&[1, 2, 3]),
            Err(CryptoError::Truncated { len: 3 })
        );
    }

    #[test]
    fn other_key_cannot_open_value() {
        let sealed = cipher().encrypt(b"secret").unwrap();
        let other =
            FieldCipher::new(&EncryptionKey::from_passphrase("0123456789abcdef0123456789abcdef").unwrap());
        assert_eq!(other.decrypt(&sealed), Err(CryptoError::Decrypt));
    }
}
