//! Submission de-duplication cache.
//!
//! Keyed by the content fingerprint of a sanitized submission. A hit inside
//! the TTL means a double-submit: the orchestrator skips the CRM entirely and
//! answers success with no lead id. Expired entries evict lazily on lookup.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use leadgate_core::store::{KvStore, StoreError};

#[derive(Clone)]
pub struct DedupCache {
    store: Arc<dyn KvStore>,
    ttl: Duration,
}

fn store_key(fingerprint: &str) -> String {
    format!("dedup:{fingerprint}")
}

impl DedupCache {
    pub fn new(store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub async fn is_duplicate(&self, fingerprint: &str) -> Result<bool, StoreError> {
        Ok(self.store.get(&store_key(fingerprint)).await?.is_some())
    }

    /// Unconditional upsert with the current timestamp as value.
    pub async fn record(&self, fingerprint: &str) -> Result<(), StoreError> {
        self.store
            .put(&store_key(fingerprint), &Utc::now().to_rfc3339(), self.ttl)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadgate_core::store::MemoryStore;

    fn cache() -> DedupCache {
        DedupCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(300))
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_fingerprint_is_not_duplicate() {
        assert!(!cache().is_duplicate("abc").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_recorded_fingerprint_is_duplicate_within_ttl() {
        let cache = cache();
        cache.record("abc").await.unwrap();
        assert!(cache.is_duplicate("abc").await.unwrap());
        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.is_duplicate("abc").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = cache();
        cache.record("abc").await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(!cache.is_duplicate("abc").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_refreshes_ttl() {
        let cache = cache();
        cache.record("abc").await.unwrap();
        tokio::time::advance(Duration::from_secs(200)).await;
        cache.record("abc").await.unwrap();
        tokio::time::advance(Duration::from_secs(200)).await;
        assert!(cache.is_duplicate("abc").await.unwrap());
    }
}
