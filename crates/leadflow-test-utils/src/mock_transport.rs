// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording mail transport for deterministic testing.
//!
//! Captures every outbound email instead of sending it, and can be told to
//! reject specific recipients to exercise delivery-failure paths.

use std::collections::HashSet;

use async_trait::async_trait;
use leadflow_core::types::OutboundEmail;
use leadflow_core::{LeadflowError, MailTransport};
use tokio::sync::Mutex;

/// A [`MailTransport`] that records sends in memory.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundEmail>>,
    fail_recipients: Mutex<HashSet<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every email handed to the transport so far.
    pub async fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().await.clone()
    }

    /// Makes future sends addressed to `recipient` fail.
    pub async fn fail_for(&self, recipient: &str) {
        self.fail_recipients.lock().await.insert(recipient.to_string());
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), LeadflowError> {
        let failures = self.fail_recipients.lock().await;
        if let Some(bad) = email.recipients.iter().find(|r| failures.contains(*r)) {
            return Err(LeadflowError::Delivery {
                message: format!("transport rejected recipient '{bad}'"),
                source: None,
            });
        }
        drop(failures);
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_sends_in_order() {
        let transport = RecordingTransport::new();
        for addr in ["a@x.com", "b@x.com"] {
            transport
                .send(&OutboundEmail {
                    recipients: vec![addr.to_string()],
                    ..OutboundEmail::default()
                })
                .await
                .unwrap();
        }
        let sent = transport.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].recipients, vec!["a@x.com".to_string()]);
        assert_eq!(sent[1].recipients, vec!["b@x.com".to_string()]);
    }

    #[tokio::test]
    async fn configured_failures_reject_the_send() {
        let transport = RecordingTransport::new();
        transport.fail_for("bad@x.com").await;
        let err = transport
            .send(&OutboundEmail {
                recipients: vec!["bad@x.com".to_string()],
                ..OutboundEmail::default()
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("bad@x.com"));
        assert!(transport.sent().await.is_empty());
    }
}
