// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process host adapters for the Leadflow outreach engine.
//!
//! Concrete implementations of the four collaborator traits: an in-memory
//! document store with seed loading, a TTL key/value cache, a tokio-backed
//! job runner, and an SMTP mail transport. The standalone binary wires
//! these; an embedded deployment would substitute its host's own.

pub mod cache;
pub mod runner;
pub mod smtp;
pub mod store;

pub use cache::MemoryCache;
pub use runner::TokioRunner;
pub use smtp::{SmtpMailer, UnconfiguredMailer};
pub use store::MemoryStore;
