// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-completion client for the Leadflow outreach engine.
//!
//! One synchronous draft request per call, with the model's structured
//! output validated into a tagged [`CompletionOutcome`].

pub mod client;
pub mod types;

pub use client::CompletionClient;
pub use types::CompletionOutcome;
