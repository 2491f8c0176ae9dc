//! Axum request handlers for all service endpoints.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::{
    protocol::{
        BatchDeleteRequest, BatchDeleteResponse, ContentKeyRequest, ContentKeyResponse,
        ErrorResponse, HealthResponse,
    },
    ServiceError,
};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info};

use super::{
    error::ApiError,
    extract::{ApiJson, ApiQuery},
    state::AppState,
};
use crate::crypto;
use crate::storage;
use crate::upstream;

/// Query string of `GET /api/assets`.
#[derive(Debug, Deserialize)]
pub struct AssetQuery {
    pub url: Option<String>,
}

/// `POST /api/content-key`: exchange an encrypted content key for a short-lived token.
pub async fn issue_content_key(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ContentKeyRequest>,
) -> Result<Json<ContentKeyResponse>, ApiError> {
    if req.content_key.is_empty() {
        return Err(ServiceError::BadRequest("contentKey must not be empty".into()).into());
    }
    let jwt_token = state.issuer.issue(&req.content_key, &state.encryption_key)?;
    debug!(ttl_secs = state.issuer.ttl().as_secs(), "content-key token issued");
    Ok(Json(ContentKeyResponse { jwt_token }))
}

/// `POST /api/decrypt`: unpack a raw encrypted body.
pub async fn decrypt_asset(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body = body?;
    if body.is_empty() {
        return Err(ServiceError::BadRequest("request body is empty".into()).into());
    }
    let plaintext = crypto::decrypt(&body, state.encryption_key.as_bytes())?;
    Ok(octet_stream(plaintext))
}

/// `POST /api/encrypt`: seal a raw asset body into the packed layout. Authenticated.
pub async fn encrypt_asset(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body = body?;
    if body.is_empty() {
        return Err(ServiceError::BadRequest("request body is empty".into()).into());
    }
    let packed = crypto::encrypt(&body, state.encryption_key.as_bytes())?;
    info!(plaintext_bytes = body.len(), "asset encrypted");
    Ok(octet_stream(packed))
}

/// `GET /api/assets?url=<encoded>`: fetch an encrypted asset and return its plaintext.
/// Authenticated.
///
/// The upstream fetch is single-shot; the caller is expected to retry.
pub async fn fetch_asset(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AssetQuery>,
) -> Result<Response, ApiError> {
    let url = match query.url {
        Some(url) if !url.trim().is_empty() => url,
        _ => return Err(ServiceError::BadRequest("missing url parameter".into()).into()),
    };

    let target = Url::parse(url.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .ok_or_else(|| ServiceError::BadRequest("url must be an absolute http(s) URL".into()))?;

    if let Some(base) = state.asset_base_url.as_deref() {
        if upstream::path_under_base(&target, base).is_none() {
            return Err(ServiceError::BadRequest("url is outside the asset origin".into()).into());
        }
    }

    let encrypted = state.assets.fetch(target.as_str()).await?;
    let plaintext = crypto::decrypt(&encrypted, state.encryption_key.as_bytes())?;
    debug!(
        encrypted_bytes = encrypted.len(),
        plaintext_bytes = plaintext.len(),
        "asset fetched and decrypted"
    );
    Ok(octet_stream(plaintext))
}

/// `POST /api/assets/delete`: delete stored assets, tolerating per-item failures.
/// Authenticated.
pub async fn delete_assets(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BatchDeleteRequest>,
) -> Result<Json<BatchDeleteResponse>, ApiError> {
    if req.urls.is_empty() {
        return Err(ServiceError::BadRequest("urls must not be empty".into()).into());
    }
    let results = storage::delete_all(
        state.store.clone(),
        req.urls,
        state.asset_base_url.as_deref(),
    )
    .await;
    Ok(Json(BatchDeleteResponse { results }))
}

/// `GET /health`: liveness check. Secrets are validated at startup, so a
/// running process is ready.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

fn octet_stream(bytes: Vec<u8>) -> Response {
    ([(CONTENT_TYPE, "application/octet-stream")], bytes).into_response()
}
