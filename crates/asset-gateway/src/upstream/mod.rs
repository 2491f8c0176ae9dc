//! Clients for the services the gateway depends on over HTTP.
//!
//! - [`Authenticator`]: the external `auth/me` check gating every protected route.
//! - [`AssetSource`]: the storage/CDN that serves encrypted asset bytes.
//!
//! Both are single-shot: no retries. Timeouts come from the shared
//! [`reqwest::Client`] built by [`http_client`].

pub mod assets;
pub mod auth;

pub use assets::HttpAssetSource;
pub use auth::HttpAuthenticator;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{redirect, Url};
use thiserror::Error;

/// Errors from an upstream call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, TLS, timeout or body-decoding failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("upstream returned status {0}")]
    Status(u16),

    /// The object store rejected the operation.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Verifies a caller's bearer token with the auth service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Returns `Ok(true)` only when the auth service positively confirms the token.
    async fn verify(&self, bearer_token: &str) -> Result<bool, UpstreamError>;
}

/// Fetches encrypted asset bytes by URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, UpstreamError>;
}

/// Build the shared HTTP client with a bounded request timeout.
///
/// Redirects are not followed: a 3xx from the CDN is an upstream failure, so
/// a fetch can never leave the origin it was checked against.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, UpstreamError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .redirect(redirect::Policy::none())
        .user_agent(concat!("asset-gateway/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Path of `url` on or below `base`, if both share scheme, host and port.
///
/// The match is per path segment: under `https://cdn/assets`, `/assets/x` and
/// `/assets` qualify but `/assets-old/x` does not. The returned path is still
/// percent-encoded and is empty or starts with `/`.
pub fn path_under_base<'a>(url: &'a Url, base: &Url) -> Option<&'a str> {
    if url.scheme() != base.scheme()
        || url.host() != base.host()
        || url.port_or_known_default() != base.port_or_known_default()
    {
        return None;
    }
    let base_path = base.path().trim_end_matches('/');
    let rest = url.path().strip_prefix(base_path)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::Redirect, routing::get, Router};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn path_under_base_accepts_same_origin_descendants() {
        let base = url("https://cdn.example.com/assets");
        assert_eq!(
            path_under_base(&url("https://cdn.example.com/assets/maps/cafe.glb"), &base),
            Some("/maps/cafe.glb")
        );
        assert_eq!(
            path_under_base(&url("https://cdn.example.com/assets"), &base),
            Some("")
        );
        assert_eq!(
            path_under_base(&url("https://CDN.example.com:443/assets/x"), &base),
            Some("/x")
        );
    }

    #[test]
    fn path_under_base_rejects_host_suffix_and_userinfo_tricks() {
        let base = url("https://cdn.example.com");
        assert!(path_under_base(&url("https://cdn.example.com.attacker.net/x"), &base).is_none());
        assert!(path_under_base(&url("https://cdn.example.com@attacker.net/x"), &base).is_none());
        assert!(path_under_base(&url("http://cdn.example.com/x"), &base).is_none());
        assert!(path_under_base(&url("https://cdn.example.com:8443/x"), &base).is_none());
    }

    #[test]
    fn path_under_base_respects_segment_boundaries() {
        let base = url("https://cdn.example.com/assets/");
        assert!(path_under_base(&url("https://cdn.example.com/assets-old/x.glb"), &base).is_none());
        assert!(path_under_base(&url("https://cdn.example.com/assets/../secret"), &base).is_none());
        assert_eq!(
            path_under_base(&url("https://cdn.example.com/assets/x.glb"), &base),
            Some("/x.glb")
        );
    }

    #[tokio::test]
    async fn client_does_not_follow_redirects() {
        let router = Router::new()
            .route("/moved", get(|| async { Redirect::temporary("/target") }))
            .route("/target", get(|| async { "followed" }));
        let base = test_server::spawn(router).await;

        let client = http_client(Duration::from_secs(5)).unwrap();
        let resp = client.get(format!("{base}/moved")).send().await.unwrap();
        assert_eq!(resp.status().as_u16(), StatusCode::TEMPORARY_REDIRECT.as_u16());
    }
}
