// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process TTL key/value cache.
//!
//! Expired entries are evicted lazily on read and listing; there is no
//! background sweeper. Job snapshots are small and short-lived, so the
//! bounded garbage between reads is acceptable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use leadflow_core::{KvCache, LeadflowError};
use tokio::sync::RwLock;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory [`KvCache`] implementation.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, LeadflowError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {} // expired; fall through to evict
                None => return Ok(None),
            }
        }
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), LeadflowError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), LeadflowError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, LeadflowError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|(k, e)| k.starts_with(prefix) && e.expires_at > now)
            .map(|(k, _)| k.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_round_trip() {
        let cache = MemoryCache::new();
        cache
            .set("bulk-email-job:j1", "{}", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            cache.get("bulk-email-job:j1").await.unwrap(),
            Some("{}".to_string())
        );
        assert_eq!(cache.get("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entries_are_gone() {
        let cache = MemoryCache::new();
        cache
            .set("short", "v", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("short").await.unwrap(), None);
        assert!(cache.list_keys("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_keys_filters_by_prefix() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.set("bulk-email-job:a", "1", ttl).await.unwrap();
        cache.set("bulk-email-job:b", "2", ttl).await.unwrap();
        cache.set("unrelated", "3", ttl).await.unwrap();

        let mut keys = cache.list_keys("bulk-email-job:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["bulk-email-job:a", "bulk-email-job:b"]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let cache = MemoryCache::new();
        cache.set("k", "v", Duration::from_secs(60)).await.unwrap();
        cache.delete("k").await.unwrap();
        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn overwrite_refreshes_value() {
        let cache = MemoryCache::new();
        cache.set("k", "old", Duration::from_secs(60)).await.unwrap();
        cache.set("k", "new", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("new".to_string()));
    }
}
