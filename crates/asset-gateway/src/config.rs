//! Configuration loading and validation for the asset gateway.
//!
//! All values are read from environment variables at startup. Both secrets
//! are decoded and checked here, once, so that no request ever runs against a
//! missing or malformed key. The process exits with a clear error message if
//! any required variable is missing or invalid.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;

use crate::crypto::{EncryptionKey, SigningSecret};

/// Validated gateway configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Standard-base64 AES-256 key for assets and content keys. **Required.**
    pub asset_encryption_key: String,

    /// HMAC secret for content-key tokens; must differ from the asset key. **Required.**
    pub token_signing_secret: String,

    /// Base URL of the auth service. **Required.**
    pub auth_service_url: String,

    /// Path of the "who am I" endpoint on the auth service.
    #[serde(default = "default_auth_me_path")]
    pub auth_me_path: String,

    /// Public URL prefix of stored assets. When set, the fetch-proxy only
    /// follows URLs under it and batch delete strips it to obtain object keys.
    #[serde(default)]
    pub asset_base_url: Option<String>,

    /// Bucket holding stored assets. **Required.**
    pub s3_bucket: String,

    /// Endpoint override for S3-compatible object storage.
    #[serde(default)]
    pub s3_endpoint_url: Option<String>,

    /// Validity window of issued content-key tokens, in seconds.
    #[serde(default = "default_content_key_ttl")]
    pub content_key_ttl_secs: u64,

    /// Timeout applied to every upstream call (auth check, asset fetch).
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,

    /// Largest accepted request body (raw assets posted to encrypt/decrypt).
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Port the HTTP(S) server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// PEM certificate chain; TLS is enabled when both paths are set.
    #[serde(default)]
    pub tls_cert_path: Option<String>,

    /// PEM private key; TLS is enabled when both paths are set.
    #[serde(default)]
    pub tls_key_path: Option<String>,

    /// OTLP endpoint for span export. Logs only when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_auth_me_path() -> String {
    "/auth/me".into()
}
fn default_content_key_ttl() -> u64 {
    30
}
fn default_upstream_timeout() -> u64 {
    10
}
fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024
}
fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Decode both secrets.
    ///
    /// # Errors
    ///
    /// Returns an error if either secret is missing or malformed, or if the
    /// two secrets are the same bytes.
    pub fn secrets(&self) -> Result<(EncryptionKey, SigningSecret)> {
        let key = EncryptionKey::from_base64(&self.asset_encryption_key)
            .context("ASSET_ENCRYPTION_KEY must be standard base64 of exactly 32 bytes")?;
        let signing = SigningSecret::new(self.token_signing_secret.as_bytes())
            .context("TOKEN_SIGNING_SECRET is required and must not be empty")?;
        if signing.as_bytes() == key.as_bytes()
            || self.token_signing_secret.trim() == self.asset_encryption_key.trim()
        {
            anyhow::bail!("TOKEN_SIGNING_SECRET must differ from ASSET_ENCRYPTION_KEY");
        }
        Ok((key, signing))
    }

    pub fn content_key_ttl(&self) -> Duration {
        Duration::from_secs(self.content_key_ttl_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Parsed `ASSET_BASE_URL`, if configured.
    ///
    /// # Errors
    ///
    /// Returns an error unless the value is an absolute `http`/`https` URL.
    pub fn asset_origin(&self) -> Result<Option<Url>> {
        let Some(raw) = self.asset_base_url.as_deref() else {
            return Ok(None);
        };
        let url = Url::parse(raw).context("ASSET_BASE_URL must be an absolute URL")?;
        if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
            anyhow::bail!("ASSET_BASE_URL must be an http(s) URL with a host");
        }
        Ok(Some(url))
    }

    /// Certificate and key paths, if TLS termination is configured.
    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        match (&self.tls_cert_path, &self.tls_key_path) {
            (Some(cert), Some(key)) => Some((cert.as_str(), key.as_str())),
            _ => None,
        }
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        self.secrets()?;
        ensure_non_empty(&self.auth_service_url, "AUTH_SERVICE_URL")?;
        ensure_non_empty(&self.auth_me_path, "AUTH_ME_PATH")?;
        ensure_non_empty(&self.s3_bucket, "S3_BUCKET")?;
        self.asset_origin()?;

        if self.content_key_ttl_secs == 0 {
            anyhow::bail!("CONTENT_KEY_TTL_SECS must be > 0");
        }
        if self.upstream_timeout_secs == 0 {
            anyhow::bail!("UPSTREAM_TIMEOUT_SECS must be > 0");
        }
        if self.max_body_bytes == 0 {
            anyhow::bail!("MAX_BODY_BYTES must be > 0");
        }
        if self.tls_cert_path.is_some() != self.tls_key_path.is_some() {
            anyhow::bail!("TLS_CERT_PATH and TLS_KEY_PATH must be set together");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("asset_encryption_key", &"[REDACTED]")
            .field("token_signing_secret", &"[REDACTED]")
            .field("auth_service_url", &self.auth_service_url)
            .field("auth_me_path", &self.auth_me_path)
            .field("asset_base_url", &self.asset_base_url)
            .field("s3_bucket", &self.s3_bucket)
            .field("s3_endpoint_url", &self.s3_endpoint_url)
            .field("content_key_ttl_secs", &self.content_key_ttl_secs)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("listen_port", &self.listen_port)
            .field("tls_cert_path", &self.tls_cert_path)
            .field("tls_key_path", &self.tls_key_path)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
