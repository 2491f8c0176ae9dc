//! Short-lived content-key tokens.
//!
//! A client holding an encrypted per-asset content key exchanges it for a
//! compact HS256 token whose claims carry the recovered plaintext key. The
//! heavy asset and its key therefore travel through different trust
//! boundaries: the asset via the fetch-proxy, the key via this issuer.
//!
//! Tokens are never stored. They expire [`DEFAULT_TTL`] after issuance.

pub mod issuer;

pub use issuer::{TokenError, TokenIssuer, DEFAULT_TTL};
