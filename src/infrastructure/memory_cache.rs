// In-memory cache storage
use crate::application::cache_storage::CacheStorage;
use crate::domain::cache::CachedResponse;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

type Generation = HashMap<String, CachedResponse>;

/// Entries per generation unless configured otherwise
pub const DEFAULT_MAX_ENTRIES: usize = 512;

/// Process-local cache store. Each write holds the lock for the whole
/// operation, so single puts and `put_all` batches are atomic.
///
/// Single puts stop adding new keys once a generation holds `max_entries`;
/// replacing an existing key is always allowed.
#[derive(Debug)]
pub struct InMemoryCacheStorage {
    generations: RwLock<BTreeMap<String, Generation>>,
    max_entries: usize,
}

impl Default for InMemoryCacheStorage {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }
}

impl InMemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            generations: RwLock::new(BTreeMap::new()),
            max_entries,
        }
    }
}

#[async_trait]
impl CacheStorage for InMemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<()> {
        self.generations
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.generations.read().await.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.generations.write().await.remove(name).is_some())
    }

    async fn entries(&self, name: &str) -> Result<Vec<String>> {
        let generations = self.generations.read().await;
        let mut keys: Vec<String> = generations
            .get(name)
            .map(|generation| generation.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        Ok(keys)
    }

    async fn match_any(&self, key: &str) -> Result<Option<CachedResponse>> {
        let generations = self.generations.read().await;
        Ok(generations
            .values()
            .find_map(|generation| generation.get(key))
            .cloned())
    }

    async fn put(&self, name: &str, key: &str, response: CachedResponse) -> Result<bool> {
        let mut generations = self.generations.write().await;
        let generation = generations.entry(name.to_string()).or_default();
        if generation.len() >= self.max_entries && !generation.contains_key(key) {
            return Ok(false);
        }
        generation.insert(key.to_string(), response);
        Ok(true)
    }

    async fn put_all(&self, name: &str, entries: Vec<(String, CachedResponse)>) -> Result<()> {
        let mut generations = self.generations.write().await;
        generations.entry(name.to_string()).or_default().extend(entries);
        Ok(())
    }
}
