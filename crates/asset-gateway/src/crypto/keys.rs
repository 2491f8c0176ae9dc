//! Process-wide secrets: the asset [`EncryptionKey`] and the token [`SigningSecret`].

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use zeroize::Zeroize;

use super::cipher::KEY_LEN;

/// Errors produced while constructing key material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The secret was not provided.
    #[error("secret is missing")]
    Missing,

    /// The encoded key is not valid standard base64.
    #[error("key is not valid base64")]
    InvalidEncoding,

    /// The decoded key has an unexpected length.
    #[error("key has invalid length: expected {KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

/// Fixed-size 256-bit key used to pack and unpack every asset and content key.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which plaintext key material lives in RAM.
#[derive(Clone)]
pub struct EncryptionKey(Box<[u8; KEY_LEN]>);

impl EncryptionKey {
    /// Build a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidLength`] unless `bytes` is exactly [`KEY_LEN`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != KEY_LEN {
            return Err(KeyError::InvalidLength(bytes.len()));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Decode a standard-base64 key as delivered through the environment.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Missing`] for an empty value, [`KeyError::InvalidEncoding`]
    /// for bad base64 and [`KeyError::InvalidLength`] for anything but 32 decoded bytes.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(KeyError::Missing);
        }
        let mut decoded = STANDARD
            .decode(encoded)
            .map_err(|_| KeyError::InvalidEncoding)?;
        let key = Self::from_bytes(&decoded);
        decoded.zeroize();
        key
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

impl Zeroize for EncryptionKey {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("EncryptionKey([REDACTED])")
    }
}

/// HMAC secret used to sign content-key tokens. Must never equal the asset key.
#[derive(Clone)]
pub struct SigningSecret(Box<[u8]>);

impl SigningSecret {
    /// # Errors
    ///
    /// Returns [`KeyError::Missing`] if `secret` is empty.
    pub fn new(secret: &[u8]) -> Result<Self, KeyError> {
        if secret.is_empty() {
            return Err(KeyError::Missing);
        }
        Ok(Self(secret.to_vec().into_boxed_slice()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Zeroize for SigningSecret {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for SigningSecret {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}
