//! [`S3AssetStore`]: S3 (or S3-compatible) bucket backing stored assets.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use tracing::debug;

use super::AssetStore;
use crate::upstream::UpstreamError;

#[derive(Clone, Debug)]
pub struct S3AssetStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3AssetStore {
    /// Build the S3 client from the standard AWS credential chain.
    ///
    /// When `endpoint_url` is set the client targets that S3-compatible
    /// endpoint with path-style addressing.
    pub async fn init(bucket: String, endpoint_url: Option<&str>) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&config);
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket,
        }
    }
}

#[async_trait]
impl AssetStore for S3AssetStore {
    async fn delete(&self, key: &str) -> Result<(), UpstreamError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| UpstreamError::Storage(DisplayErrorContext(&e).to_string()))?;
        debug!(bucket = %self.bucket, key, "stored asset deleted");
        Ok(())
    }
}
