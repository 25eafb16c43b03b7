// Network trait - the router's only way out
use crate::domain::cache::{AssetRequest, CachedResponse};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network request to {url} failed: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },

    #[error("invalid request url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[async_trait]
pub trait Network: Send + Sync {
    /// Fetch a request. Non-2xx statuses are responses, not errors.
    async fn fetch(&self, request: &AssetRequest) -> Result<CachedResponse, FetchError>;
}
