// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the Leadflow outreach engine.
//!
//! Mock collaborators (recording transport, inline runner, write-logging
//! cache), document fixtures, and a harness assembling a complete engine
//! for end-to-end tests.

pub mod fixtures;
pub mod harness;
pub mod inline_runner;
pub mod mock_transport;
pub mod spy_cache;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use inline_runner::InlineRunner;
pub use mock_transport::RecordingTransport;
pub use spy_cache::SpyCache;
