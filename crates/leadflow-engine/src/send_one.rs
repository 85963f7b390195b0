// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-lead send orchestration.
//!
//! Drives one lead through content resolution, rendering, recording,
//! and delivery. Content comes from a stored email template (no AI call)
//! when one is named, else from the AI path when a tone is given. Any
//! failure patches the communication record (if one was created) and comes
//! back as a structured outcome; the raw error never escapes to callers.

use leadflow_completion::CompletionOutcome;
use leadflow_core::types::{
    doctype, CommunicationRecord, DeliveryStatus, EmailTemplate, GeneratedEmail, LeadRecord,
};
use leadflow_core::LeadflowError;
use leadflow_mailer::{plain_text_of, render_shell};
use minijinja::{context, Environment, UndefinedBehavior};
use tracing::{debug, info, warn};

use crate::Engine;

/// Everything needed to process one lead.
#[derive(Debug, Clone)]
pub struct LeadSendRequest {
    pub lead_id: String,
    /// Stored email template to render; takes precedence over the AI path.
    pub template_name: Option<String>,
    /// Tone for AI generation when no template is named.
    pub tone: Option<String>,
    pub additional_context: String,
    pub test_mode: bool,
    pub acting_user: String,
}

/// Structured outcome of one lead's processing.
#[derive(Debug, Clone)]
pub struct LeadSendOutcome {
    pub success: bool,
    pub message: String,
    pub communication_id: Option<String>,
}

impl Engine {
    /// Generates and sends one email for one lead.
    ///
    /// Never returns an error: every failure is captured into the outcome,
    /// and the communication record -- if one was created by then -- is
    /// patched to `Error` with details.
    pub async fn send_to_lead(&self, req: &LeadSendRequest) -> LeadSendOutcome {
        let mut comm_id = None;
        match self.drive_send(req, &mut comm_id).await {
            Ok(()) => {
                info!(lead = %req.lead_id, communication = ?comm_id, "lead processed");
                LeadSendOutcome {
                    success: true,
                    message: format!("email processed for lead '{}'", req.lead_id),
                    communication_id: comm_id,
                }
            }
            Err(e) => {
                let message = e.to_string();
                if let Some(id) = &comm_id {
                    self.delivery.mark_error(id, &message).await;
                }
                warn!(lead = %req.lead_id, error = %message, "lead processing failed");
                LeadSendOutcome {
                    success: false,
                    message,
                    communication_id: comm_id,
                }
            }
        }
    }

    async fn drive_send(
        &self,
        req: &LeadSendRequest,
        comm_id: &mut Option<String>,
    ) -> Result<(), LeadflowError> {
        let lead = self.fetch_lead(&req.lead_id).await?;
        let real_recipient = lead
            .email()
            .ok_or_else(|| LeadflowError::Delivery {
                message: format!("lead '{}' has no email address", req.lead_id),
                source: None,
            })?
            .to_string();

        let (sender_email, sender_name) = self.sender_identity(&req.acting_user).await;

        // Content resolution: stored template first, AI second.
        let generated = match (
            req.template_name.as_deref().filter(|t| !t.is_empty()),
            req.tone.as_deref().filter(|t| !t.is_empty()),
        ) {
            (Some(template_name), _) => self.render_email_template(template_name, &lead).await?,
            (None, Some(tone)) => {
                self.generate_with_ai(&lead, tone, &req.additional_context, &req.acting_user)
                    .await?
            }
            (None, None) => {
                return Err(LeadflowError::Config(
                    "email generation method unclear: no template selected and no tone specified"
                        .into(),
                ));
            }
        };

        // AI fragments get the branded shell; template output is already a
        // complete document.
        let html = if generated.is_ai_generated {
            render_shell(&generated.subject, &generated.content, &sender_name)
        } else {
            generated.content.clone()
        };

        // Test mode redirects the transport recipient only; the record keeps
        // referencing the real lead, with the real address retained for
        // audit.
        let recipient = if req.test_mode {
            let test_recipient = self.test_recipient(&req.acting_user).await?;
            debug!(
                lead = %req.lead_id,
                actual = %real_recipient,
                redirected_to = %test_recipient,
                "test mode recipient substitution"
            );
            test_recipient
        } else {
            real_recipient.clone()
        };
        let actual_recipient =
            (req.test_mode && recipient != real_recipient).then(|| real_recipient.clone());

        let record = CommunicationRecord {
            subject: generated.subject.clone(),
            plain_text_content: plain_text_of(&html),
            html_content: html,
            sender: sender_email,
            sender_name,
            recipients: recipient,
            cc: String::new(),
            bcc: String::new(),
            actual_recipient,
            reference_doctype: doctype::LEAD.to_string(),
            reference_name: lead.name().to_string(),
            status: DeliveryStatus::Open,
            is_ai_generated: generated.is_ai_generated,
            error_details: None,
        };
        let record_value = serde_json::to_value(&record)
            .map_err(|e| LeadflowError::Internal(format!("record serialization failed: {e}")))?;
        let id = self.store().create(doctype::COMMUNICATION, record_value).await?;
        *comm_id = Some(id.clone());

        // Dispatch; the adapter patches the record to Sent or Error.
        self.delivery.deliver(&id, &record).await
    }

    /// Renders a stored email template against the lead. Template errors
    /// propagate: a named template that cannot render is this lead's
    /// failure, not something to paper over.
    async fn render_email_template(
        &self,
        template_name: &str,
        lead: &LeadRecord,
    ) -> Result<GeneratedEmail, LeadflowError> {
        let doc = self
            .store()
            .fetch(doctype::EMAIL_TEMPLATE, template_name)
            .await?;
        let template: EmailTemplate = serde_json::from_value(doc)
            .map_err(|e| LeadflowError::Internal(format!("malformed email template: {e}")))?;

        let subject = render_doc_template(&template.subject, lead)?;
        let content = render_doc_template(&template.body, lead)?;
        Ok(GeneratedEmail {
            subject,
            content,
            is_ai_generated: false,
        })
    }

    /// AI path: assemble the prompt, call the completion API, and lift the
    /// tagged outcome into the error flow.
    async fn generate_with_ai(
        &self,
        lead: &LeadRecord,
        tone: &str,
        additional_context: &str,
        acting_user: &str,
    ) -> Result<GeneratedEmail, LeadflowError> {
        let client = self.completion.as_ref().ok_or_else(|| {
            LeadflowError::Config("completion API key is not configured".into())
        })?;

        let assembled = self
            .assembler
            .assemble(lead, tone, additional_context, acting_user)
            .await?;

        match client
            .draft_email(&assembled.prompt, Some(&assembled.model_identifier))
            .await
        {
            CompletionOutcome::Success { subject, content } => Ok(GeneratedEmail {
                subject,
                content,
                is_ai_generated: true,
            }),
            CompletionOutcome::Failure { message } => Err(LeadflowError::Upstream { message }),
        }
    }
}

/// Renders one stored-template text against `{doc: lead}`, tolerating
/// absent variables.
pub(crate) fn render_doc_template(
    text: &str,
    lead: &LeadRecord,
) -> Result<String, LeadflowError> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Lenient);
    let template = env
        .template_from_str(text)
        .map_err(|e| LeadflowError::Template(format!("email template parse failed: {e}")))?;
    template
        .render(context! {
            doc => minijinja::Value::from_serialize(&lead.fields),
        })
        .map_err(|e| LeadflowError::Template(format!("email template render failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn lead() -> LeadRecord {
        let mut fields = Map::new();
        fields.insert("name".into(), json!("L1"));
        fields.insert("first_name".into(), json!("Ana"));
        fields.insert("organization".into(), json!("Xylo Corp"));
        LeadRecord::from_fields(fields)
    }

    #[test]
    fn doc_template_substitutes_lead_fields() {
        let out = render_doc_template("Intro for {{ doc.first_name }} at {{ doc.organization }}", &lead())
            .unwrap();
        assert_eq!(out, "Intro for Ana at Xylo Corp");
    }

    #[test]
    fn doc_template_tolerates_missing_fields() {
        let out = render_doc_template("Hi {{ doc.nickname }}!", &lead()).unwrap();
        assert_eq!(out, "Hi !");
    }

    #[test]
    fn doc_template_parse_error_is_a_template_error() {
        let err = render_doc_template("{% if x", &lead()).unwrap_err();
        assert!(matches!(err, LeadflowError::Template(_)));
    }
}
