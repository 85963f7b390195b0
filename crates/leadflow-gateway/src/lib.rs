// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Leadflow outreach engine.
//!
//! Exposes the engine's public operations as JSON endpoints. Every response
//! is a fail-soft envelope; the HTTP layer adds nothing but routing.

pub mod handlers;
pub mod server;

pub use server::{build_router, start_server, GatewayState, ServerConfig};
