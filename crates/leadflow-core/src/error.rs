// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Leadflow outreach engine.

use thiserror::Error;

/// The primary error type used across all Leadflow crates.
///
/// Public operations never surface these to callers directly; the ops layer
/// converts every failure into a tagged `{success: false, message}` envelope.
#[derive(Debug, Error)]
pub enum LeadflowError {
    /// Configuration errors (missing API key, missing default template,
    /// missing test recipient). User-facing, never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// A referenced document (lead, template, communication) does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: String, id: String },

    /// The completion API returned something malformed or incomplete.
    /// The message carries a raw excerpt for diagnosis.
    #[error("upstream response error: {message}")]
    Upstream { message: String },

    /// The mail transport rejected or failed a send.
    #[error("delivery error: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Document store errors (fetch, query, create, update).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Key/value cache errors (serialization, backend failure).
    #[error("cache error: {0}")]
    Cache(String),

    /// Template rendering errors that are not recoverable by fallback.
    #[error("template error: {0}")]
    Template(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LeadflowError {
    /// Shorthand for a [`LeadflowError::NotFound`] with owned strings.
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }
}
