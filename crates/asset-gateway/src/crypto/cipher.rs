//! AES-256-GCM encryption and decryption of whole assets in the packed layout.
//!
//! A fresh 96-bit IV is drawn from the OS CSPRNG for every call. GCM nonce
//! reuse under one key breaks both confidentiality and authentication, so
//! callers never supply the IV.

use aes_gcm::{
    aead::{AeadCore, AeadInPlace, KeyInit, OsRng},
    Aes256Gcm, Nonce, Tag,
};
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of the GCM IV (12 bytes = 96 bits).
pub const IV_LEN: usize = 12;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Minimum length of any packed ciphertext: IV plus tag, empty payload.
pub const HEADER_LEN: usize = IV_LEN + TAG_LEN;

/// Errors produced by the cipher layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The packed input is shorter than [`HEADER_LEN`].
    #[error("packed ciphertext too short: expected at least {HEADER_LEN} bytes, got {0}")]
    Malformed(usize),

    /// The authentication tag did not verify: tampered data, wrong key or corrupted IV.
    #[error("authentication tag mismatch")]
    Authentication,

    /// AES-GCM encryption failed (only reachable for absurdly large inputs).
    #[error("aead operation failed")]
    AeadFailure,
}

/// Borrowed view over the three regions of a packed ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedCiphertext<'a> {
    pub iv: &'a [u8],
    pub tag: &'a [u8],
    pub ciphertext: &'a [u8],
}

impl<'a> PackedCiphertext<'a> {
    /// Split `packed` into IV, tag and ciphertext.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Malformed`] if `packed` is shorter than [`HEADER_LEN`].
    pub fn parse(packed: &'a [u8]) -> Result<Self, CipherError> {
        if packed.len() < HEADER_LEN {
            return Err(CipherError::Malformed(packed.len()));
        }
        let (iv, rest) = packed.split_at(IV_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);
        Ok(Self {
            iv,
            tag,
            ciphertext,
        })
    }

    /// Total encoded length.
    pub fn len(&self) -> usize {
        HEADER_LEN + self.ciphertext.len()
    }

    /// `true` if the encrypted payload is empty.
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }
}

/// Encrypt `plaintext` under `key`, returning `IV ‖ Tag ‖ Ciphertext`.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(&nonce, b"", &mut buffer)
        .map_err(|_| CipherError::AeadFailure)?;

    let mut packed = Vec::with_capacity(HEADER_LEN + buffer.len());
    packed.extend_from_slice(&nonce);
    packed.extend_from_slice(&tag);
    packed.extend_from_slice(&buffer);
    Ok(packed)
}

/// Decrypt a packed ciphertext produced by [`encrypt`].
///
/// Either the complete plaintext is returned or nothing is: the tag is
/// verified before the buffer is handed back.
///
/// # Errors
///
/// Returns [`CipherError::Malformed`] if `packed` is shorter than [`HEADER_LEN`].
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`CipherError::Authentication`] if the tag does not verify.
pub fn decrypt(packed: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let parts = PackedCiphertext::parse(packed)?;
    let cipher = build_cipher(key)?;

    let mut buffer = parts.ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(parts.iv),
            b"",
            &mut buffer,
            Tag::from_slice(parts.tag),
        )
        .map_err(|_| CipherError::Authentication)?;
    Ok(buffer)
}

fn build_cipher(key: &[u8]) -> Result<Aes256Gcm, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength(key.len()));
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength(key.len()))
}
