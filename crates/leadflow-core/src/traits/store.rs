// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document store trait for the host CRM's record storage.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::LeadflowError;
use crate::types::DocFilter;

/// Access to the host's document storage.
///
/// Documents are schemaless JSON objects grouped by doctype and keyed by a
/// unique `name`. The engine only creates and patches its own records
/// (communications, settings); everything else is read-only to it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches a document by id. Fails with [`LeadflowError::NotFound`]
    /// when the document does not exist.
    async fn fetch(&self, doctype: &str, id: &str) -> Result<Value, LeadflowError>;

    /// Queries documents matching `filter`, projecting `fields` (empty slice
    /// means all fields), bounded by `limit`.
    async fn query(
        &self,
        doctype: &str,
        filter: &DocFilter,
        fields: &[&str],
        limit: usize,
    ) -> Result<Vec<Value>, LeadflowError>;

    /// Creates a document and returns its assigned id.
    async fn create(&self, doctype: &str, record: Value) -> Result<String, LeadflowError>;

    /// Patches a single field on an existing document.
    async fn update_field(
        &self,
        doctype: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), LeadflowError>;

    /// Sets a boolean flag on exactly one document of a doctype, clearing it
    /// on all others, as a single atomic operation. Used to maintain the
    /// default-template singleton without a clear-then-set race.
    async fn set_exclusive_flag(
        &self,
        doctype: &str,
        id: &str,
        field: &str,
    ) -> Result<(), LeadflowError>;

    /// Reads a field from a singleton settings doctype. `None` when the
    /// singleton or field does not exist yet.
    async fn get_single_value(
        &self,
        doctype: &str,
        field: &str,
    ) -> Result<Option<Value>, LeadflowError>;

    /// Writes a field on a singleton settings doctype, creating the
    /// singleton if needed.
    async fn set_single_value(
        &self,
        doctype: &str,
        field: &str,
        value: Value,
    ) -> Result<(), LeadflowError>;
}
