//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::Unauthorized`] → 401
/// - [`ServiceError::PayloadTooLarge`] → 413
/// - [`ServiceError::Configuration`] → 500
/// - [`ServiceError::DecryptionFailed`] → 500
/// - [`ServiceError::UpstreamFetch`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: missing parameter, empty body, undersized ciphertext.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The caller could not be authenticated against the auth service.
    #[error("unauthorized")]
    Unauthorized,

    /// The request body exceeded the configured limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// A server secret is missing or invalid. Never carries secret material.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The authentication tag did not verify. Deliberately carries no detail.
    #[error("decryption failed")]
    DecryptionFailed,

    /// The remote resource could not be fetched.
    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::Unauthorized => 401,
            ServiceError::PayloadTooLarge(_) => 413,
            ServiceError::Configuration(_) => 500,
            ServiceError::DecryptionFailed => 500,
            ServiceError::UpstreamFetch(_) => 500,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code placed in the `code` field of error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::Unauthorized => "unauthorized",
            ServiceError::PayloadTooLarge(_) => "payload_too_large",
            ServiceError::Configuration(_) => "configuration_error",
            ServiceError::DecryptionFailed => "decryption_failed",
            ServiceError::UpstreamFetch(_) => "upstream_fetch_failed",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::BadRequest("x".into()).http_status(), 400);
        assert_eq!(ServiceError::Unauthorized.http_status(), 401);
        assert_eq!(ServiceError::PayloadTooLarge("x".into()).http_status(), 413);
        assert_eq!(ServiceError::Configuration("x".into()).http_status(), 500);
        assert_eq!(ServiceError::DecryptionFailed.http_status(), 500);
        assert_eq!(ServiceError::UpstreamFetch("x".into()).http_status(), 500);
        assert_eq!(ServiceError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [
            ServiceError::BadRequest("x".into()).code(),
            ServiceError::Unauthorized.code(),
            ServiceError::PayloadTooLarge("x".into()).code(),
            ServiceError::Configuration("x".into()).code(),
            ServiceError::DecryptionFailed.code(),
            ServiceError::UpstreamFetch("x".into()).code(),
            ServiceError::Internal("x".into()).code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceError::BadRequest("missing url parameter".into());
        assert!(e.to_string().contains("missing url parameter"));
    }

    #[test]
    fn decryption_failure_is_generic() {
        assert_eq!(ServiceError::DecryptionFailed.to_string(), "decryption failed");
    }
}
