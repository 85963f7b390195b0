// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Leadflow outreach engine.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides. The resulting [`LeadflowConfig`] is constructed once
//! at startup and injected into every component.
//!
//! # Usage
//!
//! ```no_run
//! let config = leadflow_config::load_and_validate().expect("config errors");
//! println!("sender: {}", config.engine.sender_name);
//! ```

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::LeadflowConfig;
pub use validation::validate_config;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid [`LeadflowConfig`] or a list of plain error
/// messages suitable for printing to stderr.
pub fn load_and_validate() -> Result<LeadflowConfig, Vec<String>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(err.into_iter().map(|e| e.to_string()).collect()),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<LeadflowConfig, Vec<String>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(err.into_iter().map(|e| e.to_string()).collect()),
    }
}
