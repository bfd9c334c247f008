//! Response cache for the batch routes.
//!
//! Batch answers are expensive (dozens of provider requests) and change
//! slowly, so whole responses are cached. The key is the route plus the
//! canonical JSON of the request body: `serde_json` objects keep their keys
//! sorted, so two bodies that differ only in key order share an entry.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use serde::Serialize;
use tracing::debug;

/// Cache key: (route, canonical request JSON).
pub type CacheKey = (&'static str, String);

/// Cached response body.
pub type CacheEntry = Arc<serde_json::Value>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(370 * 60 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Whole-response cache shared by all handlers.
#[derive(Clone)]
pub struct ResponseCache {
    entries: MokaCache<CacheKey, CacheEntry>,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        let entries = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { entries }
    }

    /// Build the key for a request body.
    pub fn key<T: Serialize>(route: &'static str, request: &T) -> Result<CacheKey, serde_json::Error> {
        let canonical = serde_json::to_value(request)?;
        Ok((route, canonical.to_string()))
    }

    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.get(key).await
    }

    pub async fn insert(&self, key: CacheKey, entry: CacheEntry) {
        self.entries.insert(key, entry).await;
    }

    /// Return the cached response for `key`, computing and storing it on a
    /// miss. Errors are not cached.
    pub async fn get_or_compute<F, Fut, E>(&self, key: CacheKey, compute: F) -> Result<CacheEntry, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value, E>>,
    {
        if let Some(cached) = self.get(&key).await {
            debug!(route = key.0, "cache hit");
            return Ok(cached);
        }

        let entry = Arc::new(compute().await?);
        self.insert(key, entry.clone()).await;
        Ok(entry)
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(1_332_000));
        assert_eq!(config.max_capacity, 10_000);
    }

    #[test]
    fn key_ignores_field_order() {
        let a = json!({ "origins": "57.7,11.9", "areas": [{ "areaId": 1 }] });
        let b: serde_json::Value =
            serde_json::from_str(r#"{"areas":[{"areaId":1}],"origins":"57.7,11.9"}"#).unwrap();

        assert_eq!(
            ResponseCache::key("areas", &a).unwrap(),
            ResponseCache::key("areas", &b).unwrap()
        );
        assert_ne!(
            ResponseCache::key("areas", &a).unwrap(),
            ResponseCache::key("destination", &a).unwrap()
        );
    }

    #[tokio::test]
    async fn computes_once_per_key() {
        let cache = ResponseCache::new(&CacheConfig::default());
        let calls = AtomicUsize::new(0);
        let key = ResponseCache::key("areas", &json!({ "origins": "x" })).unwrap();

        for _ in 0..3 {
            let entry = cache
                .get_or_compute(key.clone(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(json!([1, 2, 3]))
                })
                .await
                .unwrap();
            assert_eq!(*entry, json!([1, 2, 3]));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = ResponseCache::new(&CacheConfig::default());
        let key = ResponseCache::key("areas", &json!({})).unwrap();

        let first = cache
            .get_or_compute(key.clone(), || async { Err::<serde_json::Value, _>("boom") })
            .await;
        assert_eq!(first.unwrap_err(), "boom");
        assert!(cache.get(&key).await.is_none());

        let second = cache
            .get_or_compute(key, || async { Ok::<_, &str>(json!("ok")) })
            .await
            .unwrap();
        assert_eq!(*second, json!("ok"));
    }

    #[tokio::test]
    async fn invalidate_clears_entries() {
        let cache = ResponseCache::new(&CacheConfig::default());
        let key = ResponseCache::key("areas", &json!({})).unwrap();
        cache.insert(key.clone(), Arc::new(json!(1))).await;
        assert!(cache.get(&key).await.is_some());

        cache.invalidate_all();

        assert!(cache.get(&key).await.is_none());
    }
}
