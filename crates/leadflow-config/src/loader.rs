// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./leadflow.toml` > `~/.config/leadflow/leadflow.toml`
//! > `/etc/leadflow/leadflow.toml` with environment variable overrides via
//! the `LEADFLOW_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LeadflowConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/leadflow/leadflow.toml` (system-wide)
/// 3. `~/.config/leadflow/leadflow.toml` (user XDG config)
/// 4. `./leadflow.toml` (local directory)
/// 5. `LEADFLOW_*` environment variables
pub fn load_config() -> Result<LeadflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadflowConfig::default()))
        .merge(Toml::file("/etc/leadflow/leadflow.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("leadflow/leadflow.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("leadflow.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<LeadflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadflowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LeadflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadflowConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `LEADFLOW_COMPLETION_API_KEY` must map
/// to `completion.api_key`, not `completion.api.key`.
fn env_provider() -> Env {
    Env::prefixed("LEADFLOW_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: LEADFLOW_RESEND_API_KEY -> "resend_api_key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("engine_", "engine.", 1)
            .replacen("completion_", "completion.", 1)
            .replacen("resend_", "resend.", 1)
            .replacen("smtp_", "smtp.", 1)
            .replacen("jobs_", "jobs.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
