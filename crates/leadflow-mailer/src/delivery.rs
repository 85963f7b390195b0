// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery adapter: transport selection and communication record patching.
//!
//! Two interchangeable transports -- the direct provider API and the host
//! mail transport -- selected by a persisted system-wide preference. The
//! communication record is created (status `Open`) before any dispatch and
//! patched to `Sent` or `Error` here, so a successful return always leaves
//! a consistent record behind.

use std::str::FromStr;
use std::sync::Arc;

use leadflow_core::types::{doctype, CommunicationRecord, OutboundEmail};
use leadflow_core::{DocumentStore, LeadflowError, MailTransport};
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::{info, warn};

use crate::resend::ResendClient;

/// Settings field holding the transport preference.
const PREFERENCE_FIELD: &str = "email_preference";

/// Which transport outbound email goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EmailPreference {
    /// Direct transactional provider API.
    #[default]
    Resend,
    /// The host's own outbound mail path.
    Host,
}

/// Routes finished emails through the preferred transport and keeps the
/// communication record's status truthful.
pub struct DeliveryAdapter {
    store: Arc<dyn DocumentStore>,
    resend: Option<ResendClient>,
    host_mail: Arc<dyn MailTransport>,
}

impl DeliveryAdapter {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        resend: Option<ResendClient>,
        host_mail: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            store,
            resend,
            host_mail,
        }
    }

    /// True when the direct provider transport can be used.
    pub fn is_resend_configured(&self) -> bool {
        self.resend.is_some()
    }

    /// The direct transport client, for sends that bypass record keeping
    /// (test emails).
    pub fn resend(&self) -> Option<&ResendClient> {
        self.resend.as_ref()
    }

    /// The current transport preference, defaulting to the direct provider.
    pub async fn preference(&self) -> EmailPreference {
        match self
            .store
            .get_single_value(doctype::SETTINGS, PREFERENCE_FIELD)
            .await
        {
            Ok(Some(Value::String(s))) => EmailPreference::from_str(&s).unwrap_or_default(),
            Ok(_) => EmailPreference::default(),
            Err(e) => {
                warn!(error = %e, "failed to read email preference; using default");
                EmailPreference::default()
            }
        }
    }

    /// Persists the transport preference.
    pub async fn set_preference(&self, pref: EmailPreference) -> Result<(), LeadflowError> {
        self.store
            .set_single_value(
                doctype::SETTINGS,
                PREFERENCE_FIELD,
                Value::String(pref.to_string()),
            )
            .await
    }

    /// Dispatches a recorded email through the preferred transport.
    ///
    /// On success the record is patched to `Sent`; on failure to `Error`
    /// with `error_details`, and the failure is returned to the caller.
    pub async fn deliver(
        &self,
        comm_id: &str,
        record: &CommunicationRecord,
    ) -> Result<(), LeadflowError> {
        let pref = self.preference().await;
        let result = match pref {
            EmailPreference::Resend => self.deliver_via_resend(record).await,
            EmailPreference::Host => self.host_mail.send(&outbound_of(record, comm_id)).await,
        };

        match result {
            Ok(()) => {
                self.mark_sent(comm_id).await?;
                info!(communication = comm_id, transport = %pref, "email dispatched");
                Ok(())
            }
            Err(e) => {
                self.mark_error(comm_id, &e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn deliver_via_resend(&self, record: &CommunicationRecord) -> Result<(), LeadflowError> {
        let client = self.resend.as_ref().ok_or_else(|| {
            LeadflowError::Config(
                "direct email transport selected but the provider API key is not configured"
                    .into(),
            )
        })?;
        let to = split_addresses(&record.recipients);
        client.send(&to, &record.subject, &record.html_content).await?;
        Ok(())
    }

    async fn mark_sent(&self, comm_id: &str) -> Result<(), LeadflowError> {
        self.store
            .update_field(
                doctype::COMMUNICATION,
                comm_id,
                "status",
                Value::String("Sent".into()),
            )
            .await
    }

    /// Patches the record to `Error`. Patch failures are logged, not
    /// propagated -- the original delivery error is the one that matters.
    pub async fn mark_error(&self, comm_id: &str, details: &str) {
        let patch = async {
            self.store
                .update_field(
                    doctype::COMMUNICATION,
                    comm_id,
                    "status",
                    Value::String("Error".into()),
                )
                .await?;
            self.store
                .update_field(
                    doctype::COMMUNICATION,
                    comm_id,
                    "error_details",
                    Value::String(details.to_string()),
                )
                .await
        };
        if let Err(e) = patch.await {
            warn!(communication = comm_id, error = %e, "failed to mark communication as errored");
        }
    }
}

/// Splits a comma-separated address list, trimming blanks.
pub fn split_addresses(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn outbound_of(record: &CommunicationRecord, comm_id: &str) -> OutboundEmail {
    OutboundEmail {
        recipients: split_addresses(&record.recipients),
        cc: split_addresses(&record.cc),
        bcc: split_addresses(&record.bcc),
        sender: record.sender.clone(),
        sender_name: record.sender_name.clone(),
        subject: record.subject.clone(),
        html: record.html_content.clone(),
        communication_id: Some(comm_id.to_string()),
        reference_doctype: Some(record.reference_doctype.clone()),
        reference_name: Some(record.reference_name.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_parses_and_displays() {
        assert_eq!(
            EmailPreference::from_str("resend").unwrap(),
            EmailPreference::Resend
        );
        assert_eq!(EmailPreference::from_str("host").unwrap(), EmailPreference::Host);
        assert!(EmailPreference::from_str("pigeon").is_err());
        assert_eq!(EmailPreference::Resend.to_string(), "resend");
        assert_eq!(EmailPreference::Host.to_string(), "host");
    }

    #[test]
    fn split_addresses_trims_and_drops_blanks() {
        assert_eq!(
            split_addresses(" a@x.com, b@y.com ,, "),
            vec!["a@x.com".to_string(), "b@y.com".to_string()]
        );
        assert!(split_addresses("").is_empty());
    }

    #[test]
    fn outbound_carries_linkage() {
        let record = CommunicationRecord {
            subject: "Hi".into(),
            html_content: "<p>Hi</p>".into(),
            plain_text_content: "Hi".into(),
            sender: "ops@acme.test".into(),
            sender_name: "Ops".into(),
            recipients: "ana@x.com".into(),
            cc: "copy@x.com".into(),
            bcc: String::new(),
            actual_recipient: None,
            reference_doctype: "Lead".into(),
            reference_name: "L1".into(),
            status: leadflow_core::types::DeliveryStatus::Open,
            is_ai_generated: true,
            error_details: None,
        };
        let outbound = outbound_of(&record, "communication-00001");
        assert_eq!(outbound.recipients, vec!["ana@x.com".to_string()]);
        assert_eq!(outbound.cc, vec!["copy@x.com".to_string()]);
        assert_eq!(
            outbound.communication_id.as_deref(),
            Some("communication-00001")
        );
        assert_eq!(outbound.reference_name.as_deref(), Some("L1"));
    }
}
