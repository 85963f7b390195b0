// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Direct transactional email transport.
//!
//! Speaks the Resend-style REST API: one POST per email, a response body
//! containing an `id` means the provider accepted the send, anything else
//! is a failure carrying the provider's message.

use std::time::Duration;

use leadflow_core::LeadflowError;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};
use tracing::debug;

/// Client for the direct transactional email API.
#[derive(Debug, Clone)]
pub struct ResendClient {
    client: reqwest::Client,
    base_url: String,
    from_address: String,
}

impl ResendClient {
    pub fn new(
        api_key: &str,
        from_address: &str,
        base_url: &str,
    ) -> Result<Self, LeadflowError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {api_key}");
        headers.insert(
            reqwest::header::AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|e| LeadflowError::Config(format!("invalid resend API key: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LeadflowError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            from_address: from_address.to_string(),
        })
    }

    /// The configured from-address.
    pub fn from_address(&self) -> &str {
        &self.from_address
    }

    /// Sends one email and returns the provider's message id.
    pub async fn send(
        &self,
        to: &[String],
        subject: &str,
        html: &str,
    ) -> Result<String, LeadflowError> {
        let payload = json!({
            "from": self.from_address,
            "to": to,
            "subject": subject,
            "html": html,
        });

        let url = format!("{}/emails", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LeadflowError::Delivery {
                message: format!("email provider request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        // An id in the response means the provider accepted the send;
        // any other shape is a failure.
        if let Some(id) = body.get("id").and_then(Value::as_str) {
            debug!(provider_id = id, "email accepted by provider");
            return Ok(id.to_string());
        }

        let provider_message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        Err(LeadflowError::Delivery {
            message: format!("email provider rejected the send ({status}): {provider_message}"),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> ResendClient {
        ResendClient::new("re_test", "hello@acme.test", base_url).unwrap()
    }

    #[tokio::test]
    async fn accepted_send_returns_provider_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test"))
            .and(body_partial_json(serde_json::json!({
                "from": "hello@acme.test",
                "to": ["ana@x.com"],
                "subject": "Hi",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "email-abc123"})),
            )
            .mount(&server)
            .await;

        let id = client(&server.uri())
            .send(&["ana@x.com".into()], "Hi", "<p>Hi</p>")
            .await
            .unwrap();
        assert_eq!(id, "email-abc123");
    }

    #[tokio::test]
    async fn response_without_id_is_a_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "message": "The from address is not verified"
            })))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .send(&["ana@x.com".into()], "Hi", "<p>Hi</p>")
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("not verified"), "got: {msg}");
    }

    #[tokio::test]
    async fn empty_error_body_still_fails_cleanly() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .send(&["ana@x.com".into()], "Hi", "<p>Hi</p>")
            .await
            .unwrap_err();
        assert!(matches!(err, LeadflowError::Delivery { .. }));
    }
}
