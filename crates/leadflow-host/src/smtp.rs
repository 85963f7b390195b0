// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP mail transport backed by lettre.

use async_trait::async_trait;
use leadflow_config::model::SmtpConfig;
use leadflow_core::types::OutboundEmail;
use leadflow_core::{LeadflowError, MailTransport};
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

/// [`MailTransport`] that relays through an SMTP account with STARTTLS.
#[derive(Debug)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Builds the transport from configuration.
    ///
    /// Fails with [`LeadflowError::Config`] when the section is incomplete.
    pub fn new(config: &SmtpConfig) -> Result<Self, LeadflowError> {
        let host = config
            .host
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| LeadflowError::Config("smtp.host is not set".into()))?;
        let username = config
            .username
            .clone()
            .ok_or_else(|| LeadflowError::Config("smtp.username is not set".into()))?;
        let password = config
            .password
            .clone()
            .ok_or_else(|| LeadflowError::Config("smtp.password is not set".into()))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| LeadflowError::Config(format!("invalid SMTP relay '{host}': {e}")))?
            .port(config.port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self { transport })
    }
}

fn mailbox(address: &str, display_name: Option<&str>) -> Result<Mailbox, LeadflowError> {
    let spec = match display_name.filter(|n| !n.is_empty()) {
        Some(name) => format!("{name} <{address}>"),
        None => address.to_string(),
    };
    spec.parse().map_err(|e| LeadflowError::Delivery {
        message: format!("invalid email address '{address}': {e}"),
        source: Some(Box::new(e)),
    })
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), LeadflowError> {
        let mut builder = Message::builder()
            .from(mailbox(&email.sender, Some(&email.sender_name))?)
            .subject(&email.subject)
            .header(ContentType::TEXT_HTML);

        for to in &email.recipients {
            builder = builder.to(mailbox(to, None)?);
        }
        for cc in &email.cc {
            builder = builder.cc(mailbox(cc, None)?);
        }
        for bcc in &email.bcc {
            builder = builder.bcc(mailbox(bcc, None)?);
        }

        let message = builder
            .body(email.html.clone())
            .map_err(|e| LeadflowError::Delivery {
                message: format!("failed to build SMTP message: {e}"),
                source: Some(Box::new(e)),
            })?;

        self.transport
            .send(message)
            .await
            .map_err(|e| LeadflowError::Delivery {
                message: format!("SMTP send failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!(
            recipients = email.recipients.len(),
            communication = ?email.communication_id,
            "email relayed via SMTP"
        );
        Ok(())
    }
}

/// Stand-in transport for deployments with no outgoing mail account.
///
/// Every send fails with a configuration error naming the problem, which
/// surfaces on the communication record rather than panicking the worker.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredMailer;

#[async_trait]
impl MailTransport for UnconfiguredMailer {
    async fn send(&self, _email: &OutboundEmail) -> Result<(), LeadflowError> {
        Err(LeadflowError::Config(
            "no outgoing mail account is configured".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailer_requires_complete_config() {
        let err = SmtpMailer::new(&SmtpConfig::default()).unwrap_err();
        assert!(matches!(err, LeadflowError::Config(_)));

        let partial = SmtpConfig {
            host: Some("smtp.acme.test".into()),
            ..SmtpConfig::default()
        };
        assert!(SmtpMailer::new(&partial).is_err());
    }

    #[test]
    fn mailbox_formats_display_name() {
        let mb = mailbox("ops@acme.test", Some("Acme Ops")).unwrap();
        let rendered = mb.to_string();
        assert!(rendered.contains("Acme Ops"), "got: {rendered}");
        assert!(rendered.contains("ops@acme.test"), "got: {rendered}");
        assert!(mailbox("not-an-address", None).is_err());
    }

    #[tokio::test]
    async fn unconfigured_mailer_fails_with_config_error() {
        let err = UnconfiguredMailer
            .send(&OutboundEmail::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no outgoing mail account"));
    }
}
