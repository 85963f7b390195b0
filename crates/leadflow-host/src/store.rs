// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process document store.
//!
//! Schemaless JSON documents grouped by doctype, keyed by `name`. Backs the
//! standalone binary and the test suites; a deployment embedded in a real
//! CRM would implement [`DocumentStore`] against that host instead.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use leadflow_core::types::DocFilter;
use leadflow_core::{DocumentStore, LeadflowError};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::info;

/// One doctype's documents, with insertion order preserved for stable
/// query results.
#[derive(Default)]
struct DocTable {
    by_id: HashMap<String, Value>,
    order: Vec<String>,
}

/// In-memory [`DocumentStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, DocTable>>,
    counter: RwLock<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document under an explicit id, setting its `name` field.
    pub async fn insert_with_id(&self, doctype: &str, id: &str, mut record: Value) {
        if let Some(obj) = record.as_object_mut() {
            obj.insert("name".to_string(), Value::String(id.to_string()));
        }
        let mut tables = self.tables.write().await;
        let table = tables.entry(doctype.to_string()).or_default();
        if !table.by_id.contains_key(id) {
            table.order.push(id.to_string());
        }
        table.by_id.insert(id.to_string(), record);
    }

    /// Loads a JSON seed file shaped as `{doctype: [records...]}`.
    ///
    /// Records without a `name` field get a generated id.
    pub async fn load_seed(&self, path: &Path) -> Result<usize, LeadflowError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            LeadflowError::Store {
                source: Box::new(e),
            }
        })?;
        let seed: Map<String, Value> = serde_json::from_str(&raw).map_err(|e| {
            LeadflowError::Store {
                source: Box::new(e),
            }
        })?;

        let mut count = 0;
        for (doctype, records) in seed {
            let Some(records) = records.as_array() else {
                continue;
            };
            for record in records {
                let id = match record.get("name").and_then(Value::as_str) {
                    Some(name) => name.to_string(),
                    None => self.next_id(&doctype).await,
                };
                self.insert_with_id(&doctype, &id, record.clone()).await;
                count += 1;
            }
        }
        info!(path = %path.display(), count, "seed data loaded");
        Ok(count)
    }

    async fn next_id(&self, doctype: &str) -> String {
        let mut counter = self.counter.write().await;
        *counter += 1;
        format!(
            "{}-{:05}",
            doctype.to_lowercase().replace(' ', "-"),
            *counter
        )
    }
}

fn matches_filter(record: &Value, filter: &DocFilter) -> bool {
    match filter {
        DocFilter::All => true,
        // Ids handled at the table level to preserve requested order.
        DocFilter::Ids(_) => true,
        DocFilter::Fields(fields) => fields
            .iter()
            .all(|(k, v)| record.get(k).is_some_and(|rv| rv == v)),
    }
}

fn project(record: &Value, fields: &[&str]) -> Value {
    if fields.is_empty() {
        return record.clone();
    }
    let mut out = Map::new();
    if let Some(obj) = record.as_object() {
        for field in fields {
            if let Some(v) = obj.get(*field) {
                out.insert((*field).to_string(), v.clone());
            }
        }
        // `name` always rides along so callers can re-fetch.
        if let Some(name) = obj.get("name") {
            out.entry("name".to_string()).or_insert_with(|| name.clone());
        }
    }
    Value::Object(out)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch(&self, doctype: &str, id: &str) -> Result<Value, LeadflowError> {
        let tables = self.tables.read().await;
        tables
            .get(doctype)
            .and_then(|t| t.by_id.get(id))
            .cloned()
            .ok_or_else(|| LeadflowError::not_found(doctype, id))
    }

    async fn query(
        &self,
        doctype: &str,
        filter: &DocFilter,
        fields: &[&str],
        limit: usize,
    ) -> Result<Vec<Value>, LeadflowError> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(doctype) else {
            return Ok(Vec::new());
        };

        let results: Vec<Value> = match filter {
            // Requested order is preserved; unknown ids are skipped.
            DocFilter::Ids(ids) => ids
                .iter()
                .filter_map(|id| table.by_id.get(id))
                .take(limit)
                .map(|r| project(r, fields))
                .collect(),
            _ => table
                .order
                .iter()
                .filter_map(|id| table.by_id.get(id))
                .filter(|r| matches_filter(r, filter))
                .take(limit)
                .map(|r| project(r, fields))
                .collect(),
        };
        Ok(results)
    }

    async fn create(&self, doctype: &str, mut record: Value) -> Result<String, LeadflowError> {
        let id = self.next_id(doctype).await;
        if let Some(obj) = record.as_object_mut() {
            obj.insert("name".to_string(), Value::String(id.clone()));
        }
        let mut tables = self.tables.write().await;
        let table = tables.entry(doctype.to_string()).or_default();
        table.order.push(id.clone());
        table.by_id.insert(id.clone(), record);
        Ok(id)
    }

    async fn update_field(
        &self,
        doctype: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), LeadflowError> {
        let mut tables = self.tables.write().await;
        let record = tables
            .get_mut(doctype)
            .and_then(|t| t.by_id.get_mut(id))
            .ok_or_else(|| LeadflowError::not_found(doctype, id))?;
        if let Some(obj) = record.as_object_mut() {
            obj.insert(field.to_string(), value);
        }
        Ok(())
    }

    async fn set_exclusive_flag(
        &self,
        doctype: &str,
        id: &str,
        field: &str,
    ) -> Result<(), LeadflowError> {
        // One write lock for the whole swap; concurrent callers serialize
        // here, so the singleton invariant cannot be violated by
        // interleaving.
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(doctype)
            .ok_or_else(|| LeadflowError::not_found(doctype, id))?;
        if !table.by_id.contains_key(id) {
            return Err(LeadflowError::not_found(doctype, id));
        }
        for (doc_id, record) in table.by_id.iter_mut() {
            if let Some(obj) = record.as_object_mut() {
                obj.insert(field.to_string(), Value::Bool(doc_id == id));
            }
        }
        Ok(())
    }

    async fn get_single_value(
        &self,
        doctype: &str,
        field: &str,
    ) -> Result<Option<Value>, LeadflowError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(doctype)
            .and_then(|t| t.by_id.get(doctype))
            .and_then(|r| r.get(field))
            .cloned())
    }

    async fn set_single_value(
        &self,
        doctype: &str,
        field: &str,
        value: Value,
    ) -> Result<(), LeadflowError> {
        let mut tables = self.tables.write().await;
        let table = tables.entry(doctype.to_string()).or_default();
        // Singletons live under their own doctype name.
        if !table.by_id.contains_key(doctype) {
            table.order.push(doctype.to_string());
            table
                .by_id
                .insert(doctype.to_string(), Value::Object(Map::new()));
        }
        if let Some(obj) = table.by_id.get_mut(doctype).and_then(Value::as_object_mut) {
            obj.insert(field.to_string(), value);
        }
        Ok(())
    }
}
