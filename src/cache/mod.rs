//! Revalidation cache for loaded page data
//!
//! Loaded values are kept per route key for a bounded window. Once the
//! window has passed the next request loads fresh data from the store.
//! Failed loads are never stored, so an error is retried on the next
//! request.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Time-bounded cache keyed by route
pub struct RevalidationCache<V> {
    max_age: Duration,
    entries: RwLock<HashMap<String, Entry<V>>>,
}

impl<V: Clone> RevalidationCache<V> {
    /// Create a cache whose entries stay fresh for `max_age`
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Create a cache from a `revalidate_secs` setting; 0 disables caching
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn is_enabled(&self) -> bool {
        !self.max_age.is_zero()
    }

    /// Get a value that is still fresh
    pub async fn get(&self, key: &str) -> Option<V> {
        if !self.is_enabled() {
            return None;
        }

        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.max_age)
            .map(|entry| entry.value.clone())
    }

    /// Store a value under `key`
    pub async fn insert(&self, key: &str, value: V) {
        if !self.is_enabled() {
            return;
        }

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.max_age);
        entries.insert(
            key.to_string(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Return the fresh value for `key`, or run `load` and keep its result
    pub async fn get_or_try_load<F, Fut, E>(&self, key: &str, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            tracing::debug!("Cache hit: {}", key);
            return Ok(value);
        }

        let value = load().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn load(counter: &AtomicUsize) -> Result<usize, String> {
        Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[tokio::test(start_paused = true)]
    async fn test_value_is_reused_within_window() {
        let cache = RevalidationCache::from_secs(60);
        let counter = AtomicUsize::new(0);

        assert_eq!(cache.get_or_try_load("/", || load(&counter)).await, Ok(1));
        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get_or_try_load("/", || load(&counter)).await, Ok(1));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get_or_try_load("/", || load(&counter)).await, Ok(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let cache = RevalidationCache::from_secs(60);
        let counter = AtomicUsize::new(0);

        assert_eq!(cache.get_or_try_load("/post/a", || load(&counter)).await, Ok(1));
        assert_eq!(cache.get_or_try_load("/post/b", || load(&counter)).await, Ok(2));
        assert_eq!(cache.get("/post/a").await, Some(1));
    }

    #[tokio::test]
    async fn test_zero_disables_caching() {
        let cache = RevalidationCache::from_secs(0);
        let counter = AtomicUsize::new(0);

        assert!(!cache.is_enabled());
        assert_eq!(cache.get_or_try_load("/", || load(&counter)).await, Ok(1));
        assert_eq!(cache.get_or_try_load("/", || load(&counter)).await, Ok(2));
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: RevalidationCache<usize> = RevalidationCache::from_secs(60);
        let failed: Result<usize, String> = cache
            .get_or_try_load("/", || async { Err("store down".to_string()) })
            .await;
        assert!(failed.is_err());
        assert_eq!(cache.get("/").await, None);

        let counter = AtomicUsize::new(0);
        assert_eq!(cache.get_or_try_load("/", || load(&counter)).await, Ok(1));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = RevalidationCache::from_secs(60);
        cache.insert("/", 7).await;
        assert_eq!(cache.get("/").await, Some(7));
        cache.clear().await;
        assert_eq!(cache.get("/").await, None);
    }
}
