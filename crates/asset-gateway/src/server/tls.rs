//! TLS termination with rustls.
//!
//! When a certificate chain and key are configured the gateway accepts TCP
//! connections itself, completes the rustls handshake and hands the stream to
//! hyper's HTTP/1 connection builder, serving the same router as the plain path.

use std::{future::Future, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use hyper::server::conn::http1;
use hyper_util::{rt::TokioIo, service::TowerToHyperService};
use rustls::ServerConfig;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, error, info};

/// Build a [`rustls::ServerConfig`] from PEM-encoded certificate and private key bytes.
///
/// # Errors
///
/// Returns an error if the certificate or key cannot be parsed, or if rustls
/// rejects the configuration.
pub fn build_server_config(cert_pem: &[u8], key_pem: &[u8]) -> Result<Arc<ServerConfig>> {
    let certs = rustls_pemfile::certs(&mut std::io::BufReader::new(cert_pem))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to parse TLS certificate chain")?;
    if certs.is_empty() {
        anyhow::bail!("no certificate found in PEM data");
    }

    let key = rustls_pemfile::private_key(&mut std::io::BufReader::new(key_pem))
        .context("failed to read TLS private key")?
        .context("no private key found in PEM data")?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .context("failed to select TLS protocol versions")?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .context("failed to build rustls ServerConfig")?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    Ok(Arc::new(config))
}

/// Read the PEM files from disk and build the server config.
///
/// # Errors
///
/// Returns an error if either file cannot be read or parsed.
pub async fn load_server_config(cert_path: &str, key_path: &str) -> Result<Arc<ServerConfig>> {
    let cert_pem = tokio::fs::read(cert_path)
        .await
        .with_context(|| format!("failed to read TLS certificate from {cert_path}"))?;
    let key_pem = tokio::fs::read(key_path)
        .await
        .with_context(|| format!("failed to read TLS private key from {key_path}"))?;
    build_server_config(&cert_pem, &key_pem)
}

/// Accept loop: terminate TLS on each connection and serve `router` over it.
///
/// Runs until `shutdown` resolves. In-flight connections finish on their own tasks.
pub async fn serve(
    listener: TcpListener,
    config: Arc<ServerConfig>,
    router: Router,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let acceptor = TlsAcceptor::from(config);
    tokio::pin!(shutdown);

    loop {
        let (tcp, peer_addr) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    error!(error = %e, "accept error");
                    continue;
                }
            },
            () = &mut shutdown => {
                info!("TLS listener stopped");
                return Ok(());
            }
        };

        let acceptor = acceptor.clone();
        let service = TowerToHyperService::new(router.clone());
        tokio::spawn(async move {
            let tls = match acceptor.accept(tcp).await {
                Ok(stream) => stream,
                Err(e) => {
                    debug!(%peer_addr, error = %e, "TLS handshake failed");
                    return;
                }
            };
            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(tls), service)
                .await
            {
                debug!(%peer_addr, error = %e, "connection closed with error");
            }
        });
    }
}
