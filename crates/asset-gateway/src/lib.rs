//! Encrypted 3D asset delivery.
//!
//! - [`crypto`]: AES-256-GCM packing (`IV ‖ Tag ‖ Ciphertext`) and key types.
//! - [`token`]: content-key unwrapping and short-lived HS256 tokens.
//! - [`upstream`]: auth-service and CDN clients.
//! - [`storage`]: stored-asset batch deletion over S3.
//! - [`server`]: the axum gateway exposing all of the above.

pub mod config;
pub mod crypto;
pub mod server;
pub mod storage;
pub mod telemetry;
pub mod token;
pub mod upstream;
