//! Axum middleware and limits applied to the router.
//!
//! Protected routes sit behind [`require_auth`], which fails closed: no bearer
//! token, a rejected token, or an unreachable auth service all yield 401
//! before the handler (and any upstream fetch) runs.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use common::ServiceError;
use tracing::warn;

use super::{error::ApiError, state::AppState};

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Reject the request with 401 unless the auth service confirms its bearer token.
pub async fn require_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .ok_or(ServiceError::Unauthorized)?
        .to_owned();

    match state.authenticator.verify(&token).await {
        Ok(true) => Ok(next.run(req).await),
        Ok(false) => Err(ServiceError::Unauthorized.into()),
        Err(e) => {
            warn!(error = %e, "auth check failed; rejecting request");
            Err(ServiceError::Unauthorized.into())
        }
    }
}
