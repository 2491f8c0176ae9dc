//! Stored-asset management: object-key derivation and batch deletion.
//!
//! Each URL in a batch is deleted independently and concurrently. A failure
//! for one URL is logged and reported in its own [`DeleteResult`]; it never
//! aborts the rest of the batch.

pub mod s3;

pub use s3::S3AssetStore;

use std::sync::Arc;

use async_trait::async_trait;
use common::protocol::DeleteResult;
use percent_encoding::percent_decode_str;
use reqwest::Url;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::upstream::{self, UpstreamError};

/// Object store holding encrypted assets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn delete(&self, key: &str) -> Result<(), UpstreamError>;
}

/// Why a URL in a batch does not name a deletable object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObjectKeyError {
    /// An absolute URL outside the configured asset origin.
    #[error("url is outside the asset origin")]
    OutsideBase,

    /// The percent-decoded path is not UTF-8.
    #[error("url path is not valid UTF-8 once decoded")]
    InvalidEncoding,

    /// Nothing is left once the base and leading slashes are removed.
    #[error("url does not name a stored object")]
    Empty,
}

/// Derive the object key for a stored asset URL.
///
/// For an absolute URL the key is its percent-decoded path, relative to
/// `asset_base_url` when one is configured (the URL must then lie under it).
/// Anything else is taken as a key already. Leading slashes are removed.
pub fn object_key_for(url: &str, asset_base_url: Option<&Url>) -> Result<String, ObjectKeyError> {
    let key = match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => {
            let path = match asset_base_url {
                Some(base) => {
                    upstream::path_under_base(&parsed, base).ok_or(ObjectKeyError::OutsideBase)?
                }
                None => parsed.path(),
            };
            percent_decode_str(path)
                .decode_utf8()
                .map_err(|_| ObjectKeyError::InvalidEncoding)?
                .into_owned()
        }
        _ => url.to_owned(),
    };

    let key = key.trim_start_matches('/');
    if key.is_empty() {
        return Err(ObjectKeyError::Empty);
    }
    Ok(key.to_owned())
}

/// Delete every asset in `urls`, returning one result per URL in input order.
pub async fn delete_all(
    store: Arc<dyn AssetStore>,
    urls: Vec<String>,
    asset_base_url: Option<&Url>,
) -> Vec<DeleteResult> {
    let mut results: Vec<DeleteResult> = urls
        .into_iter()
        .map(|url| DeleteResult {
            url,
            deleted: false,
            error: None,
        })
        .collect();

    let mut tasks = JoinSet::new();
    for (index, result) in results.iter_mut().enumerate() {
        let key = match object_key_for(&result.url, asset_base_url) {
            Ok(key) => key,
            Err(e) => {
                warn!(url = %result.url, error = %e, "asset URL does not map to an object key");
                result.error = Some(e.to_string());
                continue;
            }
        };
        let store = Arc::clone(&store);
        tasks.spawn(async move { (index, store.delete(&key).await) });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(()))) => results[index].deleted = true,
            Ok((index, Err(e))) => {
                warn!(url = %results[index].url, error = %e, "asset deletion failed");
                results[index].error = Some(e.to_string());
            }
            Err(e) => warn!(error = %e, "asset deletion task did not complete"),
        }
    }

    for result in results.iter_mut() {
        if !result.deleted && result.error.is_none() {
            result.error = Some("deletion did not complete".into());
        }
    }

    let deleted = results.iter().filter(|r| r.deleted).count();
    info!(requested = results.len(), deleted, "batch asset deletion finished");
    results
}
