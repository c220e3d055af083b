//! Rewrites content-addressed `ipfs://` URIs onto an HTTP gateway.

use crate::constants::{DEFAULT_IPFS_GATEWAY, IPFS_SCHEME};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gateway {
    prefix: String,
}

impl Gateway {
    /// Build a gateway from a URL prefix. A trailing `/` is added if missing.
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Map `ipfs://<cid>` to `<prefix><cid>`. Anything else passes through.
    pub fn resolve(&self, uri: &str) -> String {
        if uri.is_empty() {
            return String::new();
        }
        match uri.strip_prefix(IPFS_SCHEME) {
            Some(rest) => format!("{}{}", self.prefix, rest),
            None => uri.to_string(),
        }
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new(DEFAULT_IPFS_GATEWAY)
    }
}

/// Resolve through the default public gateway.
pub fn ipfs_to_http(uri: &str) -> String {
    Gateway::default().resolve(uri)
}

/// Only `http://` and `https://` URLs are fetched.
pub fn is_fetchable(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
