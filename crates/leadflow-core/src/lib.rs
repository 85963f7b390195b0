// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Leadflow outreach engine.
//!
//! Defines the error taxonomy, the domain types (leads, generated emails,
//! communication records, bulk jobs), and the four narrow traits through
//! which the engine consumes its host: [`DocumentStore`], [`KvCache`],
//! [`JobRunner`], and [`MailTransport`].

pub mod error;
pub mod traits;
pub mod types;

pub use error::LeadflowError;
pub use traits::{DocumentStore, JobRunner, KvCache, MailTransport};
