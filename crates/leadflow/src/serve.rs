// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadflow serve` command implementation.
//!
//! Wires the engine from configuration: in-process host adapters (document
//! store with optional seed data, TTL cache, tokio job runner), the SMTP
//! transport when configured, the legacy cache-key migration pass, and the
//! HTTP gateway.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use leadflow_config::model::LeadflowConfig;
use leadflow_core::{LeadflowError, MailTransport};
use leadflow_engine::{migrate_legacy_job_keys, Engine};
use leadflow_gateway::{start_server, GatewayState, ServerConfig};
use leadflow_host::{MemoryCache, MemoryStore, SmtpMailer, TokioRunner, UnconfiguredMailer};
use tracing::{info, warn};

/// Runs the `leadflow serve` command.
pub async fn run_serve(config: LeadflowConfig) -> Result<(), LeadflowError> {
    info!("starting leadflow serve");

    let store = Arc::new(MemoryStore::new());
    if let Some(seed_path) = config.engine.seed_path.as_deref().filter(|p| !p.is_empty()) {
        store.load_seed(Path::new(seed_path)).await?;
    }

    let cache = Arc::new(MemoryCache::new());
    let runner = Arc::new(TokioRunner::new());

    let host_mail: Arc<dyn MailTransport> = if config.smtp.is_configured() {
        Arc::new(SmtpMailer::new(&config.smtp)?)
    } else {
        warn!("no SMTP account configured; host-transport sends will fail until one is set up");
        Arc::new(UnconfiguredMailer)
    };

    // One-time conversion of snapshot keys written by earlier releases.
    let migrated = migrate_legacy_job_keys(
        cache.as_ref(),
        Duration::from_secs(config.jobs.snapshot_ttl_secs),
    )
    .await?;
    if migrated > 0 {
        info!(migrated, "legacy job snapshots converted to the canonical key scheme");
    }

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    let engine = Arc::new(Engine::new(config, store, cache, runner, host_mail)?);

    let state = GatewayState {
        engine,
        start_time: Instant::now(),
    };
    start_server(&server_config, state).await
}
