//! Request and response types exchanged with gateway clients.
//!
//! Field names follow the camelCase JSON contract the web front-end already
//! speaks (`contentKey`, `jwtToken`, `fileId`).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Content-key exchange
// ---------------------------------------------------------------------------

/// Request body for `POST /api/content-key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentKeyRequest {
    /// Standard base64 of a packed, encrypted per-asset content key.
    #[serde(rename = "contentKey")]
    pub content_key: String,
}

/// Successful response body for `POST /api/content-key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentKeyResponse {
    /// Signed, short-lived token carrying the plaintext content key.
    #[serde(rename = "jwtToken")]
    pub jwt_token: String,
}

/// Claims carried inside a content-key token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentKeyClaims {
    /// The encrypted content key exactly as the client submitted it.
    #[serde(rename = "fileId")]
    pub file_id: String,
    /// Standard base64 of the recovered plaintext content key.
    #[serde(rename = "contentKey")]
    pub content_key: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

// ---------------------------------------------------------------------------
// Batch delete
// ---------------------------------------------------------------------------

/// Request body for `POST /api/assets/delete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteRequest {
    /// Public URLs (or object keys) of the stored assets to remove.
    pub urls: Vec<String>,
}

/// Outcome of deleting one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub url: String,
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response body for `POST /api/assets/delete`, one entry per requested URL in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteResponse {
    pub results: Vec<DeleteResult>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub error: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
