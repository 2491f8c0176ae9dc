//! AES-256-GCM packing primitives and the key types that feed them.
//!
//! This module is intentionally free of HTTP and AWS dependencies.
//!
//! # Packed ciphertext format
//!
//! ```text
//! [ IV: 12 bytes ][ AuthTag: 16 bytes ][ Ciphertext: N bytes ]
//! ```
//!
//! Every encrypted artifact, both GLB assets and per-asset content keys, uses
//! this layout. Total length is always `28 + N`.

pub mod cipher;
pub mod keys;

pub use cipher::{decrypt, encrypt, CipherError, PackedCiphertext, HEADER_LEN, KEY_LEN};
pub use keys::{EncryptionKey, KeyError, SigningSecret};
