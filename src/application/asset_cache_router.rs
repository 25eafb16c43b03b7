// Asset cache router - Install/activate lifecycle and per-request routing
use crate::application::cache_storage::CacheStorage;
use crate::application::network::{FetchError, Network};
use crate::domain::cache::{AssetRequest, CachedResponse, RoutePolicy};
use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("pre-caching {url} failed: {source}")]
    Install {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("pre-caching {url} returned status {status}")]
    InstallStatus { url: String, status: u16 },

    #[error("host {host} is not served through the cache")]
    HostNotAllowed { host: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("cache storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Lifecycle of one router version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Parsed,
    Installing,
    /// Installed and ready to take over without waiting for old clients
    Installed,
    /// Serving as the current generation and controlling clients
    Activated,
    /// Install failed; this version never activates
    Redundant,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheSummary {
    pub current: String,
    pub state: LifecycleState,
    pub generations: Vec<String>,
    pub entries: Vec<String>,
}

#[derive(Clone)]
pub struct AssetCacheRouter {
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    cache_name: String,
    manifest: Vec<AssetRequest>,
    live_hosts: Vec<String>,
    /// Hosts whose responses may enter the cache: manifest hosts plus the origin
    cacheable_hosts: Vec<String>,
    state: Arc<RwLock<LifecycleState>>,
}

impl AssetCacheRouter {
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        cache_name: String,
        manifest: Vec<AssetRequest>,
        live_hosts: Vec<String>,
    ) -> Self {
        let mut cacheable_hosts: Vec<String> = manifest
            .iter()
            .map(|asset| asset.hostname().to_string())
            .filter(|host| !host.is_empty())
            .collect();
        cacheable_hosts.sort();
        cacheable_hosts.dedup();

        Self {
            storage,
            network,
            cache_name,
            manifest,
            live_hosts,
            cacheable_hosts,
            state: Arc::new(RwLock::new(LifecycleState::Parsed)),
        }
    }

    /// Also serve and cache requests for `host`, e.g. the app origin
    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        let host = host.into();
        if !self.cacheable_hosts.contains(&host) {
            self.cacheable_hosts.push(host);
        }
        self
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// Pre-cache the manifest into the current generation.
    ///
    /// Every manifest entry is fetched before anything is written, so a single
    /// failure leaves no generation behind.
    pub async fn install(&self) -> Result<(), RouterError> {
        *self.state.write().await = LifecycleState::Installing;

        match self.precache_manifest().await {
            Ok(stored) => {
                tracing::info!(
                    "Installed cache generation {} with {} assets",
                    self.cache_name,
                    stored
                );
                // Take over immediately rather than waiting for old clients to close
                *self.state.write().await = LifecycleState::Installed;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Install of {} failed: {}", self.cache_name, e);
                *self.state.write().await = LifecycleState::Redundant;
                Err(e)
            }
        }
    }

    async fn precache_manifest(&self) -> Result<usize, RouterError> {
        let mut entries = Vec::with_capacity(self.manifest.len());
        for asset in &self.manifest {
            let url = asset.key();
            let response = self
                .network
                .fetch(asset)
                .await
                .map_err(|source| RouterError::Install {
                    url: url.clone(),
                    source,
                })?;
            if !response.is_success() {
                return Err(RouterError::InstallStatus {
                    url,
                    status: response.status,
                });
            }
            tracing::debug!("Pre-cached {}", url);
            entries.push((url, response));
        }

        let stored = entries.len();
        self.storage.open(&self.cache_name).await?;
        self.storage.put_all(&self.cache_name, entries).await?;
        Ok(stored)
    }

    /// Delete every generation but the current one and claim clients.
    /// Returns the names that were deleted.
    pub async fn activate(&self) -> Result<Vec<String>, RouterError> {
        let stale: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| name != &self.cache_name)
            .collect();

        try_join_all(stale.iter().map(|name| self.storage.delete(name))).await?;

        for name in &stale {
            tracing::info!("Deleted stale cache generation {}", name);
        }

        *self.state.write().await = LifecycleState::Activated;
        tracing::info!("Cache generation {} is now controlling clients", self.cache_name);
        Ok(stale)
    }

    /// Route one request through network-only, network-first or cache-first.
    ///
    /// Only live-data hosts and cacheable hosts are routed at all.
    pub async fn intercept(&self, request: &AssetRequest) -> Result<CachedResponse, RouterError> {
        let policy = RoutePolicy::for_request(request, &self.live_hosts);
        let host = request.hostname();
        if policy != RoutePolicy::NetworkOnly && !self.cacheable_hosts.iter().any(|h| h == host) {
            tracing::warn!("Refusing to route {}", request.uri);
            return Err(RouterError::HostNotAllowed {
                host: host.to_string(),
            });
        }
        tracing::debug!("{:?} {}", policy, request.uri);

        match policy {
            RoutePolicy::NetworkOnly => Ok(self.network.fetch(request).await?),
            RoutePolicy::NetworkFirst => self.network_first(request).await,
            RoutePolicy::CacheFirst => self.cache_first(request).await,
        }
    }

    async fn network_first(&self, request: &AssetRequest) -> Result<CachedResponse, RouterError> {
        match self.network.fetch(request).await {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::warn!("Network failed for {}, trying cache: {}", request.uri, e);
                match self.storage.match_any(&request.key()).await? {
                    Some(cached) => Ok(cached),
                    None => Err(e.into()),
                }
            }
        }
    }

    async fn cache_first(&self, request: &AssetRequest) -> Result<CachedResponse, RouterError> {
        let key = request.key();
        if let Some(cached) = self.storage.match_any(&key).await? {
            tracing::debug!("Cache hit {}", key);
            return Ok(cached);
        }

        let response = self.network.fetch(request).await?;
        if response.is_success() {
            // Concurrent misses for the same key may both write; last write wins
            self.storage.open(&self.cache_name).await?;
            if !self.storage.put(&self.cache_name, &key, response.clone()).await? {
                tracing::debug!("Cache {} is full, serving {} uncached", self.cache_name, key);
            }
        }
        Ok(response)
    }

    pub async fn summary(&self) -> Result<CacheSummary, RouterError> {
        Ok(CacheSummary {
            current: self.cache_name.clone(),
            state: self.state().await,
            generations: self.storage.keys().await?,
            entries: self.storage.entries(&self.cache_name).await?,
        })
    }
}
