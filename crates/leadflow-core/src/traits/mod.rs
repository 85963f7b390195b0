// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The four narrow interfaces the engine consumes from its host:
//! document store, key/value cache, job runner, and mail transport.

pub mod cache;
pub mod mail;
pub mod runner;
pub mod store;

pub use cache::KvCache;
pub use mail::MailTransport;
pub use runner::{JobFuture, JobRunner};
pub use store::DocumentStore;
