// Storage trait for named cache generations
use crate::domain::cache::CachedResponse;
use async_trait::async_trait;

#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a generation, creating it empty if absent
    async fn open(&self, name: &str) -> anyhow::Result<()>;

    /// Names of all generations
    async fn keys(&self) -> anyhow::Result<Vec<String>>;

    /// Delete a generation; returns whether it existed
    async fn delete(&self, name: &str) -> anyhow::Result<bool>;

    /// Request keys stored in one generation
    async fn entries(&self, name: &str) -> anyhow::Result<Vec<String>>;

    /// Look a request key up across every generation
    async fn match_any(&self, key: &str) -> anyhow::Result<Option<CachedResponse>>;

    /// Store one entry, replacing any previous value for the key.
    /// Returns false when the generation is full and the entry was dropped.
    async fn put(&self, name: &str, key: &str, response: CachedResponse) -> anyhow::Result<bool>;

    /// Store all entries or none of them; not subject to the entry limit
    async fn put_all(
        &self,
        name: &str,
        entries: Vec<(String, CachedResponse)>,
    ) -> anyhow::Result<()>;
}
