// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache wrapper that records every write, for asserting on snapshot
//! sequences (progress monotonicity, per-item flushes).

use std::time::Duration;

use async_trait::async_trait;
use leadflow_core::{KvCache, LeadflowError};
use leadflow_host::MemoryCache;
use tokio::sync::Mutex;

/// A [`KvCache`] that delegates to [`MemoryCache`] and keeps a write log.
#[derive(Default)]
pub struct SpyCache {
    inner: MemoryCache,
    writes: Mutex<Vec<(String, String)>>,
}

impl SpyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(key, value)` writes in order.
    pub async fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().await.clone()
    }

    /// The sequence of values written to one key.
    pub async fn values_for(&self, key: &str) -> Vec<String> {
        self.writes
            .lock()
            .await
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

#[async_trait]
impl KvCache for SpyCache {
    async fn get(&self, key: &str) -> Result<Option<String>, LeadflowError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), LeadflowError> {
        self.writes
            .lock()
            .await
            .push((key.to_string(), value.to_string()));
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), LeadflowError> {
        self.inner.delete(key).await
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, LeadflowError> {
        self.inner.list_keys(prefix).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_writes_per_key() {
        let cache = SpyCache::new();
        let ttl = Duration::from_secs(60);
        cache.set("a", "1", ttl).await.unwrap();
        cache.set("b", "x", ttl).await.unwrap();
        cache.set("a", "2", ttl).await.unwrap();

        assert_eq!(cache.values_for("a").await, vec!["1", "2"]);
        assert_eq!(cache.get("a").await.unwrap(), Some("2".to_string()));
    }
}
