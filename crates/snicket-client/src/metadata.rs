//! Off-chain token metadata, fetched as JSON over HTTP.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use crate::error::{ClientError, Result};

/// Source of token metadata documents keyed by HTTP URL.
pub trait MetadataSource: Send + Sync {
    fn fetch_json(&self, url: &str) -> impl Future<Output = Result<Value>> + Send;
}

/// Fetches metadata with a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpMetadata {
    http: reqwest::Client,
}

impl HttpMetadata {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Client whose fetches give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(http))
    }
}

impl MetadataSource for HttpMetadata {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Metadata(format!("{url} answered {}", resp.status())));
        }
        Ok(resp.json().await?)
    }
}

/// Extract `image` from a metadata document, if it is a non-empty string.
pub fn image_of(doc: &Value) -> Option<&str> {
    doc.get("image")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_of() {
        assert_eq!(image_of(&json!({ "image": "ipfs://img" })), Some("ipfs://img"));
        assert_eq!(image_of(&json!({ "image": "" })), None);
        assert_eq!(image_of(&json!({ "image": 3 })), None);
        assert_eq!(image_of(&json!({})), None);
    }
}
