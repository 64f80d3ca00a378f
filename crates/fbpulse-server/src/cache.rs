use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;

/// In-process TTL cache for computed insight payloads.
///
/// Keys are derived from the endpoint name plus the canonical filter key, so
/// two requests with the same filters share one cached computation. Entries
/// expire after the configured TTL; expired entries are dropped lazily on the
/// next lookup for that key.
#[derive(Debug, Clone)]
pub struct InsightCache {
    ttl: Duration,
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    value: serde_json::Value,
}

impl InsightCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the cached value for `key` if present and unexpired.
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub async fn put(&self, key: String, value: serde_json::Value) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    /// Drops every cached entry. Called after writes that change the
    /// underlying feedback set.
    pub async fn invalidate_all(&self) {
        self.entries.lock().await.clear();
    }
}
