// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead field filtering and serialization.
//!
//! The document store attaches bookkeeping fields to every record. None of
//! them belong in a prompt, so they are stripped before the lead is
//! serialized for the model.

use leadflow_core::types::LeadRecord;
use serde_json::{Map, Value};

/// Field-name prefixes that mark internal bookkeeping fields.
const INTERNAL_PREFIXES: [&str; 5] = ["_", "idx", "naming_series", "image", "timeline_hash"];

/// Exact field names that are always stripped.
const INTERNAL_FIELDS: [&str; 10] = [
    "amended_from",
    "docstatus",
    "doctype",
    "modified_by",
    "owner",
    "parent",
    "parentfield",
    "parenttype",
    "creation",
    "modified",
];

/// Returns true for field names the model should never see.
pub fn is_internal_field(name: &str) -> bool {
    INTERNAL_PREFIXES.iter().any(|p| name.starts_with(p))
        || INTERNAL_FIELDS.contains(&name)
}

/// The lead's fields with internal names and null values removed.
pub fn relevant_fields(lead: &LeadRecord) -> Map<String, Value> {
    lead.fields
        .iter()
        .filter(|(name, value)| !is_internal_field(name) && !value.is_null())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Serializes the filtered lead fields to pretty-printed JSON.
///
/// Values arrive as JSON already, so datetime-like fields are ISO-8601
/// strings by the time they get here.
pub fn lead_json(lead: &LeadRecord) -> String {
    serde_json::to_string_pretty(&relevant_fields(lead))
        .unwrap_or_else(|_| "{}".to_string())
}
