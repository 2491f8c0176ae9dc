//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use reqwest::Url;

use crate::crypto::EncryptionKey;
use crate::storage::AssetStore;
use crate::token::TokenIssuer;
use crate::upstream::{AssetSource, Authenticator};

/// Application state shared across all request handlers.
///
/// Everything is immutable after startup and `Arc`-backed, so Axum can clone
/// the state per request without copying key material.
#[derive(Clone)]
pub struct AppState {
    /// Asset encryption key, validated at startup.
    pub encryption_key: Arc<EncryptionKey>,
    /// Content-key token issuer holding the signing secret.
    pub issuer: Arc<TokenIssuer>,
    /// Auth service client gating protected routes.
    pub authenticator: Arc<dyn Authenticator>,
    /// Storage/CDN client for encrypted asset bytes.
    pub assets: Arc<dyn AssetSource>,
    /// Object store for batch deletion.
    pub store: Arc<dyn AssetStore>,
    /// Allowed URL prefix for proxied assets, if restricted.
    pub asset_base_url: Option<Arc<Url>>,
}

impl AppState {
    pub fn new(
        encryption_key: EncryptionKey,
        issuer: TokenIssuer,
        authenticator: Arc<dyn Authenticator>,
        assets: Arc<dyn AssetSource>,
        store: Arc<dyn AssetStore>,
        asset_base_url: Option<Url>,
    ) -> Self {
        Self {
            encryption_key: Arc::new(encryption_key),
            issuer: Arc::new(issuer),
            authenticator,
            assets,
            store,
            asset_base_url: asset_base_url.map(Arc::new),
        }
    }
}
