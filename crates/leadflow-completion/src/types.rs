// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-completions API request/response types and the tagged draft outcome.

use serde::{Deserialize, Serialize};

// --- Request types ---

/// A chat-completions request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier (e.g. "openai/gpt-4o").
    pub model: String,

    /// Conversation messages: one system instruction plus the user prompt.
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature.
    pub temperature: f32,

    /// Token ceiling, sized for HTML email bodies.
    pub max_tokens: u32,

    /// Requested response container type.
    pub response_format: ResponseFormat,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant".
    pub role: String,
    pub content: String,
}

/// Response container request. Only `json_object` is used.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

// --- Response types ---

/// A chat-completions response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

/// One completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// API error envelope returned on non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail within an API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
}

// --- Draft outcome ---

/// The tagged result of one draft request.
///
/// All outcomes, including transport failures and malformed model output,
/// come back through this type so callers can branch uniformly. The client
/// never returns `Err` and never panics past its boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The model produced a valid `{subject, content}` object.
    Success { subject: String, content: String },
    /// Anything else: transport error, API error, malformed or incomplete
    /// JSON. The message is user-facing and carries a raw excerpt where
    /// relevant.
    Failure { message: String },
}

impl CompletionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The failure message, if this is a failure.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failure { message } => Some(message),
            Self::Success { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_serializes_expected_shape() {
        let req = ChatRequest {
            model: "openai/gpt-4o".into(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: "Follow the format.".into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: "Write an email.".into(),
                },
            ],
            temperature: 0.7,
            max_tokens: 2048,
            response_format: ResponseFormat::json_object(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "openai/gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Write an email.");
        assert_eq!(json["max_tokens"], 2048);
        assert_eq!(json["response_format"]["type"], "json_object");
    }

    #[test]
    fn chat_response_deserializes() {
        let json = r#"{
            "id": "gen-123",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{}"}}]
        }"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.choices.len(), 1);
        assert_eq!(resp.choices[0].message.content, "{}");
    }

    #[test]
    fn outcome_accessors() {
        let ok = CompletionOutcome::Success {
            subject: "Hi".into(),
            content: "<p>Hi</p>".into(),
        };
        assert!(ok.is_success());
        assert!(ok.failure_message().is_none());

        let fail = CompletionOutcome::Failure {
            message: "boom".into(),
        };
        assert!(!fail.is_success());
        assert_eq!(fail.failure_message(), Some("boom"));
    }
}
