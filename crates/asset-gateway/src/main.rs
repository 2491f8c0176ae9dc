//! `asset-gateway`: binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables, secrets included.
//! 2. Initialise the telemetry pipeline (JSON logs, optional OTLP).
//! 3. Build the upstream HTTP client, auth client, asset source and S3 store.
//! 4. Build the Axum router and serve it, over TLS when configured.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use asset_gateway::{
    config::Config,
    server::{self, AppState},
    storage::S3AssetStore,
    telemetry,
    token::TokenIssuer,
    upstream::{self, HttpAssetSource, HttpAuthenticator},
};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;
    let (encryption_key, signing_secret) = cfg.secrets()?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.listen_port,
        tls = cfg.tls_paths().is_some(),
        "asset-gateway starting"
    );

    // -----------------------------------------------------------------------
    // 3. Upstream clients
    // -----------------------------------------------------------------------
    let http = upstream::http_client(cfg.upstream_timeout())
        .context("failed to build upstream HTTP client")?;
    let authenticator =
        HttpAuthenticator::new(http.clone(), &cfg.auth_service_url, &cfg.auth_me_path);
    let assets = HttpAssetSource::new(http);
    let store =
        S3AssetStore::init(cfg.s3_bucket.clone(), cfg.s3_endpoint_url.as_deref()).await;

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(
        encryption_key,
        TokenIssuer::new(signing_secret, cfg.content_key_ttl()),
        Arc::new(authenticator),
        Arc::new(assets),
        Arc::new(store),
        cfg.asset_origin()?,
    );
    let router = server::router::build(state, cfg.max_body_bytes);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    match cfg.tls_paths() {
        Some((cert_path, key_path)) => {
            let tls_config = server::tls::load_server_config(cert_path, key_path).await?;
            server::tls::serve(listener, tls_config, router, server::shutdown_signal()).await?;
        }
        None => {
            axum::serve(listener, router)
                .with_graceful_shutdown(server::shutdown_signal())
                .await?;
        }
    }

    info!("asset-gateway stopped");
    Ok(())
}
