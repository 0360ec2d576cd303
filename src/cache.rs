use moka::future::Cache;
use serde::Serialize;
use std::time::Duration;

/// Assembled dashboard payloads go stale quickly; five minutes matches the
/// upstream feeds' own update cadence.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);
pub const CACHE_CAPACITY: u64 = 100;

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: u64,
    pub keys: Vec<String>,
}

/// TTL'd, capacity-bounded cache for assembled responses. Entries past the
/// TTL are treated as absent; eviction is moka's, no LRU contract.
pub struct ResponseCache<V> {
    inner: Cache<String, V>,
}

impl<V: Clone + Send + Sync + 'static> ResponseCache<V> {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Fingerprint of a dashboard request. Slugs are sorted so that the same
    /// beach set hits the same entry regardless of query order.
    pub fn key(slugs: &[String], mode: &str, slot: &str) -> String {
        let mut sorted: Vec<&str> = slugs.iter().map(|s| s.as_str()).collect();
        sorted.sort_unstable();
        format!("{}-{}-{}", sorted.join(","), mode, slot)
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: String, value: V) {
        self.inner.insert(key, value).await;
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks().await;
        CacheStats {
            size: self.inner.entry_count(),
            keys: self.inner.iter().map(|(k, _)| (*k).clone()).collect(),
        }
    }

    /// Drop everything; returns how many entries were removed.
    pub async fn clear(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        let size = self.inner.entry_count();
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
        size
    }
}

impl<V: Clone + Send + Sync + 'static> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_sorts_slugs() {
        let a = ResponseCache::<String>::key(
            &["rhossili".to_string(), "barry-island".to_string()],
            "swimming",
            "now",
        );
        let b = ResponseCache::<String>::key(
            &["barry-island".to_string(), "rhossili".to_string()],
            "swimming",
            "now",
        );
        assert_eq!(a, b);
        assert_eq!(a, "barry-island,rhossili-swimming-now");
    }

    #[test]
    fn test_key_distinguishes_mode_and_slot() {
        let slugs = vec!["rhossili".to_string()];
        let a = ResponseCache::<String>::key(&slugs, "swimming", "now");
        let b = ResponseCache::<String>::key(&slugs, "dipping", "now");
        let c = ResponseCache::<String>::key(&slugs, "swimming", "tonight");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = ResponseCache::new();
        cache.insert("k".to_string(), "payload".to_string()).await;
        assert_eq!(cache.get("k").await, Some("payload".to_string()));
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let cache = ResponseCache::with_ttl(Duration::from_millis(20));
        cache.insert("k".to_string(), "payload".to_string()).await;
        assert!(cache.get("k").await.is_some());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_clear_reports_removed_count() {
        let cache = ResponseCache::new();
        cache.insert("a".to_string(), 1u32).await;
        cache.insert("b".to_string(), 2u32).await;
        assert_eq!(cache.clear().await, 2);
        assert_eq!(cache.stats().await.size, 0);
    }
}
