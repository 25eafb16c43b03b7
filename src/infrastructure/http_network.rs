// reqwest-backed network
use crate::application::network::{FetchError, Network};
use crate::domain::cache::{AssetRequest, CachedResponse};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("vejr-edge/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(4)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }
}

/// Builder failures mean the URL itself was unusable
fn fetch_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_builder() {
        FetchError::InvalidUrl {
            url: url.to_string(),
            reason: error.to_string(),
        }
    } else {
        FetchError::Unreachable {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<CachedResponse, FetchError> {
        let url = request.key();

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_error(&url, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response.bytes().await.map_err(|e| FetchError::Body {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!("Fetched {} ({} bytes, status {})", url, body.len(), status);
        Ok(CachedResponse::new(status, headers, body))
    }
}
