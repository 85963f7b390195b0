// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for configuration loading and validation.

use leadflow_config::{load_and_validate_str, load_config_from_str, validate_config};

#[test]
fn empty_config_uses_defaults() {
    let config = load_config_from_str("").unwrap();
    assert_eq!(config.engine.sender_name, "Leadflow");
    assert_eq!(config.engine.log_level, "info");
    assert_eq!(config.completion.default_model, "openai/gpt-4o");
    assert_eq!(config.completion.base_url, "https://openrouter.ai/api/v1");
    assert_eq!(config.completion.max_tokens, 2048);
    assert_eq!(config.jobs.queue, "long");
    assert_eq!(config.jobs.send_delay_ms, 200);
    assert_eq!(config.jobs.filter_limit, 1000);
    assert_eq!(config.jobs.snapshot_ttl_secs, 86_400);
    assert_eq!(config.gateway.port, 8330);
    assert!(config.completion.api_key.is_none());
    assert!(!config.resend.is_configured());
    assert!(!config.smtp.is_configured());
}

#[test]
fn sections_override_defaults() {
    let toml = r#"
        [engine]
        sender_name = "Acme Outreach"
        test_recipient = "qa@acme.test"

        [completion]
        api_key = "sk-test"
        default_model = "anthropic/claude-sonnet-4"
        temperature = 0.3

        [resend]
        api_key = "re_test"
        from_address = "hello@acme.test"

        [jobs]
        send_delay_ms = 50
    "#;
    let config = load_config_from_str(toml).unwrap();
    assert_eq!(config.engine.sender_name, "Acme Outreach");
    assert_eq!(config.engine.test_recipient.as_deref(), Some("qa@acme.test"));
    assert_eq!(config.completion.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.completion.default_model, "anthropic/claude-sonnet-4");
    assert!(config.resend.is_configured());
    assert_eq!(config.jobs.send_delay_ms, 50);
    // Untouched sections keep their defaults.
    assert_eq!(config.gateway.host, "127.0.0.1");
}

#[test]
fn unknown_keys_are_rejected() {
    let toml = r#"
        [engine]
        sender_nmae = "typo"
    "#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn unknown_sections_are_rejected() {
    let toml = r#"
        [telemetry]
        enabled = true
    "#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn validation_rejects_out_of_range_temperature() {
    let toml = r#"
        [completion]
        temperature = 3.5
    "#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors.iter().any(|e| e.contains("temperature")));
}

#[test]
fn validation_rejects_partial_smtp() {
    let toml = r#"
        [smtp]
        host = "smtp.acme.test"
    "#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors.iter().any(|e| e.contains("smtp")));
}

#[test]
fn validation_collects_multiple_errors() {
    let toml = r#"
        [engine]
        log_level = "loud"

        [completion]
        max_tokens = 0

        [jobs]
        filter_limit = 0
    "#;
    let config = load_config_from_str(toml).unwrap();
    let errors = validate_config(&config).unwrap_err();
    assert!(errors.len() >= 3, "got: {errors:?}");
}

#[test]
fn default_config_passes_validation() {
    let config = load_config_from_str("").unwrap();
    assert!(validate_config(&config).is_ok());
}

#[test]
fn smtp_fully_configured_is_accepted() {
    let toml = r#"
        [smtp]
        host = "smtp.acme.test"
        username = "mailer"
        password = "hunter2"
    "#;
    let config = load_and_validate_str(toml).unwrap();
    assert!(config.smtp.is_configured());
    assert_eq!(config.smtp.port, 587);
}
