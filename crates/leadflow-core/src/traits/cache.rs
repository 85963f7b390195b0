// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key/value cache trait for TTL-bounded job state.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::LeadflowError;

/// TTL-bounded key/value storage.
///
/// Values are JSON strings; serialization is the caller's concern. Bulk job
/// snapshots live here so status polling survives process restarts until
/// the entry expires.
#[async_trait]
pub trait KvCache: Send + Sync {
    /// Returns the value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, LeadflowError>;

    /// Stores `value` under `key` with the given time-to-live.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), LeadflowError>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), LeadflowError>;

    /// Lists all live keys starting with `prefix`.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, LeadflowError>;
}
