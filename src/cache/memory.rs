//! In-memory TTL cache using moka.

use super::ResponseCache;
use crate::config::CacheSettings;
use crate::error::Result;
use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cached answer together with the lifetime it was stored with.
#[derive(Debug, Clone)]
struct CacheEntry {
    text: Arc<str>,
    ttl: Duration,
}

/// Expires each entry according to its own TTL.
struct PerEntryTtl;

impl Expiry<String, CacheEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Thread-safe in-memory answer cache.
///
/// Entries expire a fixed duration after insertion and are evicted in
/// LRU-like order once `max_capacity` is reached.
pub struct MemoryResponseCache {
    cache: MokaCache<String, CacheEntry>,
}

impl MemoryResponseCache {
    /// Create a cache holding at most `max_capacity` answers.
    pub fn new(max_capacity: u64) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }

    /// Create a cache from the `[cache]` settings section.
    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(settings.max_capacity)
    }
}

impl Default for MemoryResponseCache {
    fn default() -> Self {
        Self::from_settings(&CacheSettings::default())
    }
}

#[async_trait]
impl ResponseCache for MemoryResponseCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cache.get(key).await.map(|entry| entry.text.to_string()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let entry = CacheEntry {
            text: Arc::from(value),
            ttl,
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_after_set() {
        let cache = MemoryResponseCache::default();
        assert!(cache.get("q").await.unwrap().is_none());

        cache
            .set("q", "answer ✓".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("q").await.unwrap().as_deref(), Some("answer ✓"));
    }

    #[tokio::test]
    async fn test_keys_are_exact_strings() {
        let cache = MemoryResponseCache::default();
        cache
            .set("Who teaches CS101?", "A".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache.get("who teaches CS101?").await.unwrap().is_none());
        assert!(cache.get("Who teaches CS101? ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = MemoryResponseCache::default();
        cache
            .set("q", "short-lived".to_string(), Duration::from_millis(50))
            .await
            .unwrap();
        assert!(cache.get("q").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(cache.get("q").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let cache = MemoryResponseCache::default();
        cache.set("q", "first".to_string(), Duration::from_secs(60)).await.unwrap();
        cache.set("q", "second".to_string(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("q").await.unwrap().as_deref(), Some("second"));
    }
}
