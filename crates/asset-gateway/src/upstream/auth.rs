//! [`HttpAuthenticator`]: bearer-token check against the auth service's `auth/me` endpoint.

use async_trait::async_trait;
use tracing::debug;

use super::{Authenticator, UpstreamError};

/// Calls `GET {base_url}{me_path}` with the caller's bearer token.
///
/// The token is accepted only if the response is 2xx and its JSON body has
/// `"authToken": true`. Everything else is a rejection.
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    client: reqwest::Client,
    me_url: String,
}

impl HttpAuthenticator {
    pub fn new(client: reqwest::Client, base_url: &str, me_path: &str) -> Self {
        let me_url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            me_path.trim_start_matches('/')
        );
        Self { client, me_url }
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn verify(&self, bearer_token: &str) -> Result<bool, UpstreamError> {
        let resp = self
            .client
            .get(&self.me_url)
            .bearer_auth(bearer_token)
            .send()
            .await?;

        if !resp.status().is_success() {
            debug!(status = resp.status().as_u16(), "auth service rejected token");
            return Ok(false);
        }

        let body: serde_json::Value = resp.json().await?;
        Ok(body.get("authToken").and_then(serde_json::Value::as_bool) == Some(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{http_client, test_server};
    use axum::{
        http::{header::AUTHORIZATION, HeaderMap, StatusCode},
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use std::time::Duration;

    async fn me(headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
        match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            Some("Bearer good") => (StatusCode::OK, Json(json!({"authToken": true}))),
            Some("Bearer stale") => (StatusCode::OK, Json(json!({"authToken": false}))),
            Some("Bearer odd") => (StatusCode::OK, Json(json!({"authToken": "true"}))),
            _ => (StatusCode::UNAUTHORIZED, Json(json!({"message": "no"}))),
        }
    }

    async fn authenticator() -> HttpAuthenticator {
        let base = test_server::spawn(Router::new().route("/auth/me", get(me))).await;
        HttpAuthenticator::new(http_client(Duration::from_secs(5)).unwrap(), &base, "/auth/me")
    }

    #[test]
    fn me_url_joins_cleanly() {
        let client = reqwest::Client::new();
        let a = HttpAuthenticator::new(client.clone(), "http://auth/", "/auth/me");
        let b = HttpAuthenticator::new(client, "http://auth", "auth/me");
        assert_eq!(a.me_url, "http://auth/auth/me");
        assert_eq!(b.me_url, "http://auth/auth/me");
    }

    #[tokio::test]
    async fn accepts_auth_token_true() {
        assert!(authenticator().await.verify("good").await.unwrap());
    }

    #[tokio::test]
    async fn rejects_auth_token_false() {
        assert!(!authenticator().await.verify("stale").await.unwrap());
    }

    #[tokio::test]
    async fn rejects_non_boolean_auth_token() {
        assert!(!authenticator().await.verify("odd").await.unwrap());
    }

    #[tokio::test]
    async fn rejects_error_status() {
        assert!(!authenticator().await.verify("unknown").await.unwrap());
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        let auth = HttpAuthenticator::new(
            http_client(Duration::from_secs(1)).unwrap(),
            "http://127.0.0.1:1",
            "/auth/me",
        );
        assert!(auth.verify("good").await.is_err());
    }
}
