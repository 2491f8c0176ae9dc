//! Structured logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No key material, content keys, tokens or plaintext** may appear in any
//!   span attribute or log field.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`), overridden by `RUST_LOG`.

pub mod init;

pub use init::init_telemetry;
