// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. All endpoints return the
//! engine's fail-soft envelopes with HTTP 200; transport-level status codes
//! are reserved for malformed requests, which axum rejects before the
//! handlers run.

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use leadflow_core::LeadflowError;
use leadflow_engine::Engine;
use tower_http::cors::CorsLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub engine: Arc<Engine>,
    /// Process start time for uptime reporting.
    pub start_time: std::time::Instant,
}

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Builds the gateway router. Extracted from [`start_server`] so tests can
/// drive the routes without binding a socket.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/emails/generate", post(handlers::post_generate))
        .route("/v1/emails/test", post(handlers::post_test_email))
        .route("/v1/emails/send", post(handlers::post_send))
        .route("/v1/bulk-jobs", post(handlers::post_bulk_jobs))
        .route("/v1/bulk-jobs", get(handlers::get_bulk_jobs))
        .route("/v1/bulk-jobs/{job_id}", get(handlers::get_bulk_job_status))
        .route(
            "/v1/bulk-jobs/{job_id}/debug",
            get(handlers::get_bulk_job_debug),
        )
        .route(
            "/v1/settings/email-preference",
            get(handlers::get_email_preference),
        )
        .route(
            "/v1/settings/email-preference",
            put(handlers::put_email_preference),
        )
        .route("/v1/status", get(handlers::get_api_status))
        .route(
            "/v1/leads/{lead_id}/structure",
            get(handlers::get_lead_structure),
        )
        .route(
            "/v1/templates/{template_id}/default",
            post(handlers::post_default_template),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway HTTP server and serve until the process exits.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
) -> Result<(), LeadflowError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LeadflowError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| LeadflowError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
