// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The public operations layer.
//!
//! Every operation returns a serde-serializable envelope with a `success`
//! flag and an optional `message`. No operation lets an error escape: the
//! boundary catches everything and converts it, so callers branch on the
//! envelope, never on exceptions.

use std::str::FromStr;
use std::sync::Arc;

use leadflow_core::types::{doctype, BulkJob, BulkJobSummary};
use leadflow_core::LeadflowError;
use leadflow_mailer::{render_shell, split_addresses, EmailPreference};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::bulk::BulkRequest;
use crate::send_one::render_doc_template;
use crate::status::JobDebugInfo;
use crate::Engine;

/// Fallback acting user when a request names none.
pub const DEFAULT_ACTING_USER: &str = "Administrator";

// --- Envelopes ---

/// Generic `{success, message}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

impl AckResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Envelope for a single-shot AI draft (not sent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Envelope for a bulk submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSubmitResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

/// Envelope for a job status read. Always succeeds; an unknown id carries
/// a `not_found` snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub success: bool,
    pub job: BulkJob,
}

/// Envelope for the job listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub success: bool,
    pub jobs: Vec<BulkJobSummary>,
}

/// Envelope for an ad-hoc send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication: Option<String>,
}

/// Envelope for the transport preference read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceResponse {
    pub success: bool,
    pub email_preference: String,
    pub resend_configured: bool,
    pub host_mail_configured: bool,
}

/// Envelope reporting which external API keys are present. Never carries
/// key values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStatusResponse {
    pub success: bool,
    pub completion_configured: bool,
    pub resend_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
}

/// Envelope for lead field inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadStructureResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead: Option<Map<String, Value>>,
}

/// Envelope for runner-level job diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDebugResponse {
    pub success: bool,
    pub debug: JobDebugInfo,
}

// --- Requests ---

/// An ad-hoc send, optionally template-rendered server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailRequest {
    pub recipients: String,
    pub subject: String,
    pub content: String,
    #[serde(default = "default_reference_doctype")]
    pub reference_doctype: String,
    #[serde(default)]
    pub reference_name: Option<String>,
    #[serde(default)]
    pub cc: Option<String>,
    #[serde(default)]
    pub bcc: Option<String>,
    /// When set, the named template is rendered against the reference
    /// document and overrides the client-supplied subject and content.
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(default)]
    pub acting_user: Option<String>,
}

fn default_reference_doctype() -> String {
    doctype::LEAD.to_string()
}

// --- Operations ---

impl Engine {
    /// Single-shot AI draft for one lead; nothing is sent or recorded.
    pub async fn generate_email_content(
        &self,
        lead_id: &str,
        tone: &str,
        additional_context: &str,
        acting_user: &str,
    ) -> DraftResponse {
        match self
            .draft_for_lead(lead_id, tone, additional_context, acting_user)
            .await
        {
            Ok((subject, content, model_used)) => DraftResponse {
                success: true,
                subject: Some(subject),
                content: Some(content),
                model_used: Some(model_used),
                message: None,
            },
            Err(e) => DraftResponse {
                success: false,
                subject: None,
                content: None,
                model_used: None,
                message: Some(e.to_string()),
            },
        }
    }

    async fn draft_for_lead(
        &self,
        lead_id: &str,
        tone: &str,
        additional_context: &str,
        acting_user: &str,
    ) -> Result<(String, String, String), LeadflowError> {
        let lead = self.fetch_lead(lead_id).await?;
        let client = self.completion.as_ref().ok_or_else(|| {
            LeadflowError::Config("completion API key is not configured".into())
        })?;

        let assembled = self
            .assembler
            .assemble(&lead, tone, additional_context, acting_user)
            .await?;
        let model_used = if assembled.model_identifier.trim().is_empty() {
            client.default_model().to_string()
        } else {
            assembled.model_identifier.clone()
        };

        match client
            .draft_email(&assembled.prompt, Some(&assembled.model_identifier))
            .await
        {
            leadflow_completion::CompletionOutcome::Success { subject, content } => {
                Ok((subject, content, model_used))
            }
            leadflow_completion::CompletionOutcome::Failure { message } => {
                Err(LeadflowError::Upstream { message })
            }
        }
    }

    /// Sends drafted content to a single recipient through the direct
    /// transport, without creating a communication record.
    pub async fn send_test_email(
        &self,
        lead_id: &str,
        subject: &str,
        content: &str,
        recipient: Option<&str>,
        acting_user: &str,
    ) -> AckResponse {
        let result: Result<String, LeadflowError> = async {
            // The lead must exist even though the send is redirected.
            self.fetch_lead(lead_id).await?;

            let client = self.delivery.resend().ok_or_else(|| {
                LeadflowError::Config("transactional email API key is not configured".into())
            })?;

            let recipient = match recipient.filter(|r| !r.is_empty()) {
                Some(r) => r.to_string(),
                None => self.test_recipient(acting_user).await?,
            };

            let (_, sender_name) = self.sender_identity(acting_user).await;
            let html = render_shell(subject, content, &sender_name);
            client.send(&[recipient.clone()], subject, &html).await?;
            Ok(recipient)
        }
        .await;

        match result {
            Ok(recipient) => AckResponse::ok(format!("Test email sent to {recipient}")),
            Err(e) => AckResponse::fail(e.to_string()),
        }
    }

    /// Submission entry point for bulk sends.
    pub async fn generate_bulk_emails(self: Arc<Self>, req: BulkRequest) -> BulkSubmitResponse {
        match self.submit_bulk(req).await {
            Ok(job) => BulkSubmitResponse {
                success: true,
                message: format!(
                    "Bulk email job for {} leads using template '{}' has been started.",
                    job.leads_count, job.template_name
                ),
                job_id: Some(job.job_id),
            },
            Err(e) => BulkSubmitResponse {
                success: false,
                message: e.to_string(),
                job_id: None,
            },
        }
    }

    /// Best-effort job status; never a failure envelope.
    pub async fn get_bulk_email_job_status(&self, job_id: &str) -> JobStatusResponse {
        JobStatusResponse {
            success: true,
            job: self.job_status(job_id).await,
        }
    }

    /// All persisted jobs, newest first.
    pub async fn list_bulk_email_jobs(&self) -> JobListResponse {
        JobListResponse {
            success: true,
            jobs: self.list_jobs().await,
        }
    }

    /// Ad-hoc send with optional server-side template override.
    pub async fn send_ai_email(&self, req: SendEmailRequest) -> SendEmailResponse {
        match self.drive_ad_hoc_send(&req).await {
            Ok(comm_id) => SendEmailResponse {
                success: true,
                message: format!("Email sent to {}", req.recipients),
                communication: Some(comm_id),
            },
            Err(e) => SendEmailResponse {
                success: false,
                message: e.to_string(),
                communication: None,
            },
        }
    }

    async fn drive_ad_hoc_send(&self, req: &SendEmailRequest) -> Result<String, LeadflowError> {
        let acting_user = req.acting_user.as_deref().unwrap_or(DEFAULT_ACTING_USER);
        let (sender_email, sender_name) = self.sender_identity(acting_user).await;

        // Template override: render server-side against the reference
        // document. Render trouble falls back to the client-supplied
        // subject and content rather than failing the send.
        let (subject, content) = match (&req.template_name, &req.reference_name) {
            (Some(template_name), Some(reference_name)) if !template_name.is_empty() => {
                match self
                    .render_override(template_name, &req.reference_doctype, reference_name)
                    .await
                {
                    Ok(rendered) => rendered,
                    Err(e) => {
                        warn!(
                            template = %template_name,
                            error = %e,
                            "template override failed; using client-supplied content"
                        );
                        (req.subject.clone(), req.content.clone())
                    }
                }
            }
            _ => (req.subject.clone(), req.content.clone()),
        };

        let recipients = split_addresses(&req.recipients);
        if recipients.is_empty() {
            return Err(LeadflowError::Config("no recipients specified".into()));
        }

        let record = leadflow_core::types::CommunicationRecord {
            subject,
            plain_text_content: leadflow_mailer::plain_text_of(&content),
            html_content: content,
            sender: sender_email,
            sender_name,
            recipients: recipients.join(", "),
            cc: req
                .cc
                .as_deref()
                .map(|cc| split_addresses(cc).join(", "))
                .unwrap_or_default(),
            bcc: req
                .bcc
                .as_deref()
                .map(|bcc| split_addresses(bcc).join(", "))
                .unwrap_or_default(),
            actual_recipient: None,
            reference_doctype: req.reference_doctype.clone(),
            reference_name: req.reference_name.clone().unwrap_or_default(),
            status: leadflow_core::types::DeliveryStatus::Open,
            is_ai_generated: false,
            error_details: None,
        };
        let record_value = serde_json::to_value(&record)
            .map_err(|e| LeadflowError::Internal(format!("record serialization failed: {e}")))?;
        let comm_id = self
            .store()
            .create(doctype::COMMUNICATION, record_value)
            .await?;

        self.delivery.deliver(&comm_id, &record).await?;
        Ok(comm_id)
    }

    async fn render_override(
        &self,
        template_name: &str,
        reference_doctype: &str,
        reference_name: &str,
    ) -> Result<(String, String), LeadflowError> {
        let reference = self.store().fetch(reference_doctype, reference_name).await?;
        let lead = match reference {
            Value::Object(fields) => leadflow_core::types::LeadRecord::from_fields(fields),
            _ => {
                return Err(LeadflowError::Internal(format!(
                    "reference '{reference_name}' is not an object document"
                )))
            }
        };

        let doc = self
            .store()
            .fetch(doctype::EMAIL_TEMPLATE, template_name)
            .await?;
        let template: leadflow_core::types::EmailTemplate = serde_json::from_value(doc)
            .map_err(|e| LeadflowError::Internal(format!("malformed email template: {e}")))?;

        Ok((
            render_doc_template(&template.subject, &lead)?,
            render_doc_template(&template.body, &lead)?,
        ))
    }

    /// The current transport preference plus which transports are usable.
    pub async fn get_email_preference(&self) -> PreferenceResponse {
        PreferenceResponse {
            success: true,
            email_preference: self.delivery.preference().await.to_string(),
            resend_configured: self.delivery.is_resend_configured(),
            host_mail_configured: self.config.smtp.is_configured(),
        }
    }

    /// Persists the transport preference.
    pub async fn set_email_preference(&self, preference: &str) -> AckResponse {
        let Ok(pref) = EmailPreference::from_str(preference) else {
            return AckResponse::fail("Invalid preference. Use 'resend' or 'host'.");
        };
        match self.delivery.set_preference(pref).await {
            Ok(()) => AckResponse::ok(format!("Email preference set to {pref}")),
            Err(e) => AckResponse::fail(e.to_string()),
        }
    }

    /// Reports whether the two external API keys are present. Values are
    /// never included.
    pub async fn get_api_status(&self) -> ApiStatusResponse {
        ApiStatusResponse {
            success: true,
            completion_configured: self.completion.is_some(),
            resend_configured: self.delivery.is_resend_configured(),
            from_address: self.config.resend.from_address.clone(),
        }
    }

    /// The lead's field mapping with internal bookkeeping fields stripped,
    /// for operator inspection.
    pub async fn get_lead_structure(&self, lead_id: &str) -> LeadStructureResponse {
        match self.fetch_lead(lead_id).await {
            Ok(lead) => LeadStructureResponse {
                success: true,
                message: None,
                lead: Some(leadflow_prompt::relevant_fields(&lead)),
            },
            Err(e) => LeadStructureResponse {
                success: false,
                message: Some(e.to_string()),
                lead: None,
            },
        }
    }

    /// Runner execution detail plus the persisted snapshot for a job id.
    pub async fn debug_failed_job(&self, job_id: &str) -> JobDebugResponse {
        JobDebugResponse {
            success: true,
            debug: self.debug_job(job_id).await,
        }
    }

    /// Makes the named prompt template the default, atomically clearing the
    /// flag everywhere else.
    pub async fn set_default_template(&self, template_id: &str) -> AckResponse {
        match self
            .store()
            .set_exclusive_flag(doctype::PROMPT_TEMPLATE, template_id, "is_default")
            .await
        {
            Ok(()) => AckResponse::ok(format!("'{template_id}' is now the default template")),
            Err(e) => AckResponse::fail(e.to_string()),
        }
    }
}
