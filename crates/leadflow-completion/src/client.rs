// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the chat-completions API.
//!
//! Provides [`CompletionClient`] which issues one synchronous draft request
//! per call and validates the model's structured output. Every outcome --
//! transport failure, API error, malformed JSON, missing fields -- is
//! returned as a [`CompletionOutcome`], never an `Err`.

use std::time::Duration;

use leadflow_config::model::CompletionConfig;
use leadflow_core::LeadflowError;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{
    ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse, CompletionOutcome, ResponseFormat,
};

/// System instruction sent with every draft request.
const SYSTEM_INSTRUCTION: &str = "You are an AI assistant. Follow the user's instructions \
carefully and precisely, especially regarding output format.";

/// How much of a faulty upstream body to quote back in failure messages.
const EXCERPT_LEN: usize = 200;

/// HTTP client for chat-completion draft generation.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    base_url: String,
    default_model: String,
    temperature: f32,
    max_tokens: u32,
}

impl CompletionClient {
    /// Creates a client from configuration and an API key.
    pub fn new(api_key: &str, config: &CompletionConfig) -> Result<Self, LeadflowError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {api_key}");
        headers.insert(
            reqwest::header::AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|e| LeadflowError::Config(format!("invalid API key value: {e}")))?,
        );
        if let Some(referer) = &config.referer {
            headers.insert(
                "HTTP-Referer",
                HeaderValue::from_str(referer).map_err(|e| {
                    LeadflowError::Config(format!("invalid completion.referer value: {e}"))
                })?,
            );
        }
        headers.insert(
            "X-Title",
            HeaderValue::from_str(&config.app_title).map_err(|e| {
                LeadflowError::Config(format!("invalid completion.app_title value: {e}"))
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| LeadflowError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_model: config.default_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// The model used when a draft request names none.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Requests one email draft for the assembled prompt.
    ///
    /// A blank or absent `model_identifier` falls back to the configured
    /// default model. The model's reply must be a JSON object with non-null
    /// `subject` and `content` string fields.
    pub async fn draft_email(
        &self,
        prompt: &str,
        model_identifier: Option<&str>,
    ) -> CompletionOutcome {
        let model = model_identifier
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_model);

        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: SYSTEM_INSTRUCTION.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat::json_object(),
        };

        debug!(model, prompt_len = prompt.len(), "requesting email draft");

        let url = format!("{}/chat/completions", self.base_url);
        let response = match self.client.post(&url).json(&request).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "completion request failed at transport level");
                return CompletionOutcome::Failure {
                    message: format!("completion request failed ({model}): {e}"),
                };
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                return CompletionOutcome::Failure {
                    message: format!("failed to read completion response body: {e}"),
                };
            }
        };

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "completion API error ({status}): {}",
                    api_err.error.message
                ),
                Err(_) => format!(
                    "completion API returned {status}: {}",
                    excerpt(&body, EXCERPT_LEN)
                ),
            };
            warn!(status = %status, "completion API error");
            return CompletionOutcome::Failure { message };
        }

        let parsed: ChatResponse = match serde_json::from_str(&body) {
            Ok(p) => p,
            Err(e) => {
                return CompletionOutcome::Failure {
                    message: format!(
                        "unexpected completion response shape: {e}. Body was: '{}'",
                        excerpt(&body, EXCERPT_LEN)
                    ),
                };
            }
        };

        let Some(choice) = parsed.choices.into_iter().next() else {
            return CompletionOutcome::Failure {
                message: "completion response contained no choices".into(),
            };
        };

        validate_draft(&choice.message.content)
    }
}

/// Parses and validates the model's reply text into a draft outcome.
fn validate_draft(reply: &str) -> CompletionOutcome {
    let parsed: Value = match serde_json::from_str(reply) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "model returned malformed JSON");
            return CompletionOutcome::Failure {
                message: format!(
                    "model returned malformed JSON. Response was: '{}...'. Error: {e}",
                    excerpt(reply, EXCERPT_LEN)
                ),
            };
        }
    };

    let subject = parsed.get("subject").filter(|v| !v.is_null());
    let content = parsed.get("content").filter(|v| !v.is_null());

    let missing: Vec<&str> = [("subject", &subject), ("content", &content)]
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return CompletionOutcome::Failure {
            message: format!(
                "model response was valid JSON but missing required field(s): {}",
                missing.join(", ")
            ),
        };
    }

    match (subject.and_then(Value::as_str), content.and_then(Value::as_str)) {
        (Some(subject), Some(content)) => CompletionOutcome::Success {
            subject: subject.to_string(),
            content: content.to_string(),
        },
        _ => CompletionOutcome::Failure {
            message: "model response fields 'subject' and 'content' must both be strings".into(),
        },
    }
}

/// First `max` characters of `s`, respecting char boundaries.
fn excerpt(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
