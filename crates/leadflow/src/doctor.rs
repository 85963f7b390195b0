// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadflow doctor` command implementation.
//!
//! Quick configuration diagnostics: which external integrations are usable
//! and which operations they gate. Purely local; no network calls.

use leadflow_config::model::LeadflowConfig;
use leadflow_core::LeadflowError;

struct Check {
    name: &'static str,
    ok: bool,
    detail: String,
}

/// Runs the `leadflow doctor` command.
pub async fn run_doctor(config: &LeadflowConfig) -> Result<(), LeadflowError> {
    let seed_ok = match config.engine.seed_path.as_deref() {
        Some(path) => std::path::Path::new(path).exists(),
        None => true,
    };

    let checks = [
        Check {
            name: "completion API key",
            ok: config.completion.api_key.is_some(),
            detail: if config.completion.api_key.is_some() {
                format!("set (default model: {})", config.completion.default_model)
            } else {
                "missing -- AI generation is disabled".to_string()
            },
        },
        Check {
            name: "direct email provider",
            ok: config.resend.is_configured(),
            detail: if config.resend.is_configured() {
                format!(
                    "configured (from: {})",
                    config.resend.from_address.as_deref().unwrap_or_default()
                )
            } else {
                "not configured -- direct transport and test sends unavailable".to_string()
            },
        },
        Check {
            name: "SMTP account",
            ok: config.smtp.is_configured(),
            detail: if config.smtp.is_configured() {
                format!(
                    "configured ({}:{})",
                    config.smtp.host.as_deref().unwrap_or_default(),
                    config.smtp.port
                )
            } else {
                "not configured -- host transport unavailable".to_string()
            },
        },
        Check {
            name: "test recipient",
            ok: config.engine.test_recipient.is_some(),
            detail: match &config.engine.test_recipient {
                Some(r) => r.clone(),
                None => "not set -- test mode relies on the acting user's email".to_string(),
            },
        },
        Check {
            name: "seed data",
            ok: seed_ok,
            detail: match config.engine.seed_path.as_deref() {
                Some(path) if seed_ok => path.to_string(),
                Some(path) => format!("{path} does not exist"),
                None => "none configured".to_string(),
            },
        },
    ];

    println!();
    println!("  leadflow doctor");
    println!("  {}", "-".repeat(56));
    let mut warnings = 0;
    for check in &checks {
        let marker = if check.ok { "[OK]" } else { "[!!]" };
        if !check.ok {
            warnings += 1;
        }
        println!("    {marker} {:<24} {}", check.name, check.detail);
    }
    println!();
    if warnings == 0 {
        println!("  all checks passed");
    } else {
        println!("  {warnings} check(s) need attention");
    }
    println!();
    Ok(())
}
