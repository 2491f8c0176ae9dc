//! [`HttpAssetSource`]: fetches encrypted asset bytes from storage or the CDN.

use async_trait::async_trait;
use bytes::Bytes;

use super::{AssetSource, UpstreamError};

#[derive(Debug, Clone)]
pub struct HttpAssetSource {
    client: reqwest::Client,
}

impl HttpAssetSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetSource for HttpAssetSource {
    async fn fetch(&self, url: &str) -> Result<Bytes, UpstreamError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        Ok(resp.bytes().await?)
    }
}
