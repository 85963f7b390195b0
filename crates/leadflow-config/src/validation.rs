// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of the configuration object.
//!
//! Figment guarantees shape and types; this module checks value ranges and
//! cross-field consistency and returns plain human-readable messages.

use crate::model::LeadflowConfig;

/// Validate a loaded configuration. Returns all problems found, not just
/// the first one.
pub fn validate_config(config: &LeadflowConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if !(0.0..=2.0).contains(&config.completion.temperature) {
        errors.push(format!(
            "completion.temperature must be between 0.0 and 2.0 (got {})",
            config.completion.temperature
        ));
    }

    if config.completion.max_tokens == 0 {
        errors.push("completion.max_tokens must be greater than zero".to_string());
    }

    if config.jobs.filter_limit == 0 {
        errors.push("jobs.filter_limit must be greater than zero".to_string());
    }

    if config.jobs.snapshot_ttl_secs == 0 {
        errors.push("jobs.snapshot_ttl_secs must be greater than zero".to_string());
    }

    if config.gateway.port == 0 {
        errors.push("gateway.port must be a valid TCP port".to_string());
    }

    // SMTP is all-or-nothing: a partially filled section is a config mistake,
    // not a disabled transport.
    let smtp = &config.smtp;
    let any_smtp =
        smtp.host.is_some() || smtp.username.is_some() || smtp.password.is_some();
    if any_smtp && !smtp.is_configured() {
        errors.push(
            "smtp section is partially configured; set host, username, and password together"
                .to_string(),
        );
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.engine.log_level.as_str()) {
        errors.push(format!(
            "engine.log_level must be one of {valid_levels:?} (got '{}')",
            config.engine.log_level
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
