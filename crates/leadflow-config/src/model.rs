// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Leadflow outreach engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. The configuration object is built once at process
//! start and injected into every component; nothing self-initializes lazily.

use serde::{Deserialize, Serialize};

/// Top-level Leadflow configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeadflowConfig {
    /// Engine identity and behavior settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// LLM completion API settings.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Transactional email provider settings (direct transport).
    #[serde(default)]
    pub resend: ResendConfig,

    /// SMTP settings for the host mail transport.
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Bulk job settings.
    #[serde(default)]
    pub jobs: JobsConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Engine identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Display name used in signatures when the acting user has none.
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional site label. Callers sometimes present job ids scoped as
    /// `<site>||<id>`; the status reader uses this to try that encoding.
    #[serde(default)]
    pub site: Option<String>,

    /// Fallback recipient for test-mode sends when the acting user has no
    /// email address on record.
    #[serde(default)]
    pub test_recipient: Option<String>,

    /// Optional JSON seed file loaded into the in-process document store
    /// at startup (leads, templates, users).
    #[serde(default)]
    pub seed_path: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sender_name: default_sender_name(),
            log_level: default_log_level(),
            site: None,
            test_recipient: None,
            seed_path: None,
        }
    }
}

fn default_sender_name() -> String {
    "Leadflow".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// LLM completion API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionConfig {
    /// API key. `None` disables the AI generation path.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the chat-completions endpoint.
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,

    /// Model used when the stored prompt template names none.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Sampling temperature for drafts.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Token ceiling, sized generously for HTML email bodies.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Optional referer URL sent with completion requests.
    #[serde(default)]
    pub referer: Option<String>,

    /// Application title sent with completion requests.
    #[serde(default = "default_app_title")]
    pub app_title: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_completion_base_url(),
            default_model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            referer: None,
            app_title: default_app_title(),
        }
    }
}

fn default_completion_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "openai/gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_app_title() -> String {
    "Leadflow AI Email".to_string()
}

/// Transactional email provider configuration (direct transport).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResendConfig {
    /// Provider API key. `None` disables the direct transport.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Verified from-address for the direct transport.
    #[serde(default)]
    pub from_address: Option<String>,

    /// Provider API base URL.
    #[serde(default = "default_resend_base_url")]
    pub base_url: String,
}

impl Default for ResendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from_address: None,
            base_url: default_resend_base_url(),
        }
    }
}

fn default_resend_base_url() -> String {
    "https://api.resend.com".to_string()
}

impl ResendConfig {
    /// True when both the key and the from-address are present.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
            && self.from_address.as_deref().is_some_and(|f| !f.is_empty())
    }
}

/// SMTP configuration for the host mail transport.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmtpConfig {
    /// SMTP relay hostname. `None` leaves the host transport unconfigured.
    #[serde(default)]
    pub host: Option<String>,

    /// SMTP port (587 for STARTTLS).
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_smtp_port(),
            username: None,
            password: None,
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

impl SmtpConfig {
    /// True when enough is present to build the transport.
    pub fn is_configured(&self) -> bool {
        self.host.as_deref().is_some_and(|h| !h.is_empty())
            && self.username.is_some()
            && self.password.is_some()
    }
}

/// Bulk job configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JobsConfig {
    /// Runner queue bulk workers are enqueued on.
    #[serde(default = "default_queue")]
    pub queue: String,

    /// Fixed delay between leads in a bulk run, in milliseconds. This is an
    /// explicit throttle toward the mail transport, not an accident of
    /// implementation.
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,

    /// Safety cap on filter-driven lead resolution.
    #[serde(default = "default_filter_limit")]
    pub filter_limit: usize,

    /// TTL for persisted job snapshots, in seconds.
    #[serde(default = "default_snapshot_ttl_secs")]
    pub snapshot_ttl_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            queue: default_queue(),
            send_delay_ms: default_send_delay_ms(),
            filter_limit: default_filter_limit(),
            snapshot_ttl_secs: default_snapshot_ttl_secs(),
        }
    }
}

fn default_queue() -> String {
    "long".to_string()
}

fn default_send_delay_ms() -> u64 {
    200
}

fn default_filter_limit() -> usize {
    1000
}

fn default_snapshot_ttl_secs() -> u64 {
    86_400
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8330
}
