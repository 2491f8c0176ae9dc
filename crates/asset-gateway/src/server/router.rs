//! Axum router construction.

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
///
/// `/api/assets`, `/api/assets/delete` and `/api/encrypt` require a bearer
/// token confirmed by the auth service.
pub fn build(state: AppState, max_body_bytes: usize) -> Router {
    let protected: Router<AppState> = Router::new()
        .route("/api/assets", get(handlers::fetch_asset))
        .route("/api/assets/delete", post(handlers::delete_assets))
        .route("/api/encrypt", post(handlers::encrypt_asset))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .route("/api/content-key", post(handlers::issue_content_key))
        .route("/api/decrypt", post(handlers::decrypt_asset))
        .route("/health", get(handlers::health))
        .merge(protected)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}
