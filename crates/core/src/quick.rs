//! Short-lived in-process cache for immediate repeat requests.

use std::time::Duration;

use moka::future::Cache;

use crate::search::SearchResponse;

/// Responses keyed by cache key, expiring a fixed time after insertion.
#[derive(Clone)]
pub struct QuickCache {
    inner: Cache<String, SearchResponse>,
}

impl std::fmt::Debug for QuickCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuickCache").field("entries", &self.inner.entry_count()).finish()
    }
}

impl QuickCache {
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        Self { inner: Cache::builder().max_capacity(capacity).time_to_live(ttl).build() }
    }

    pub async fn get(&self, key: &str) -> Option<SearchResponse> {
        let hit = self.inner.get(key).await;
        tracing::debug!(cache_key = key, hit = hit.is_some(), "quick cache lookup");
        hit
    }

    pub async fn insert(&self, key: String, response: SearchResponse) {
        self.inner.insert(key, response).await;
    }

    pub fn clear(&self) {
        self.inner.invalidate_all();
        tracing::info!("quick cache cleared");
    }
}
