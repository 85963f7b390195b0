// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Leadflow workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Document type names used with the host document store.
pub mod doctype {
    pub const LEAD: &str = "Lead";
    pub const PROMPT_TEMPLATE: &str = "Prompt Template";
    pub const EMAIL_TEMPLATE: &str = "Email Template";
    pub const COMMUNICATION: &str = "Communication";
    pub const USER: &str = "User";
    pub const SETTINGS: &str = "Settings";
}

// --- Leads ---

/// A sales prospect record fetched from the host document store.
///
/// The engine treats a lead as an opaque mapping from field name to JSON
/// value; only a handful of well-known fields have accessors. Everything
/// else (custom fields included) flows through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadRecord {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LeadRecord {
    /// Wraps a raw document mapping.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// The unique record id (the `name` field).
    pub fn name(&self) -> &str {
        self.text("name").unwrap_or_default()
    }

    /// A string-typed field value, if present and non-empty.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// The lead's email address (`email_id` preferred, `email` accepted).
    pub fn email(&self) -> Option<&str> {
        self.text("email_id").or_else(|| self.text("email"))
    }

    /// Human-facing display name: first + last name, falling back to the
    /// record id, then a generic salutation.
    pub fn display_name(&self) -> String {
        let full = format!(
            "{} {}",
            self.text("first_name").unwrap_or_default(),
            self.text("last_name").unwrap_or_default()
        );
        let full = full.trim();
        if !full.is_empty() {
            return full.to_string();
        }
        if !self.name().is_empty() {
            return self.name().to_string();
        }
        "Valued Contact".to_string()
    }
}

/// Minimal per-lead payload carried into a bulk worker: id and email only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkLead {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

// --- Generated content ---

/// An email draft produced by either the AI path or the template path.
/// Ephemeral; always converted into a [`CommunicationRecord`] before send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedEmail {
    pub subject: String,
    /// HTML body. AI-path content is a fragment that still needs the branded
    /// shell; template-path content is assumed to be complete HTML.
    pub content: String,
    pub is_ai_generated: bool,
}

// --- Communication records ---

/// Delivery status of a communication record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
pub enum DeliveryStatus {
    Open,
    Sent,
    Error,
}

/// Durable record of one email send attempt, owned by the host document
/// store. Created once with status `Open`, then patched to `Sent` or `Error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunicationRecord {
    pub subject: String,
    pub html_content: String,
    pub plain_text_content: String,
    pub sender: String,
    pub sender_name: String,
    /// Comma-separated recipient list actually handed to the transport.
    pub recipients: String,
    #[serde(default)]
    pub cc: String,
    #[serde(default)]
    pub bcc: String,
    /// The lead's real address when test mode redirected the send.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_recipient: Option<String>,
    pub reference_doctype: String,
    pub reference_name: String,
    pub status: DeliveryStatus,
    pub is_ai_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

// --- Stored templates ---

/// A stored master prompt template. At most one record is the default;
/// the store enforces the singleton via an atomic flag swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub model_identifier: String,
    #[serde(default)]
    pub is_default: bool,
}

/// A stored email template with a templated subject and HTML body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

// --- Bulk jobs ---

/// Lifecycle status of a bulk send job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BulkJobStatus {
    Queued,
    Running,
    Completed,
    CompletedWithErrors,
    Failed,
    NotFound,
    Error,
}

impl BulkJobStatus {
    /// Terminal states reached by a worker that ran to completion.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::CompletedWithErrors)
    }
}

/// A lead processed successfully within a bulk job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentLead {
    pub name: String,
    #[serde(default)]
    pub communication_id: Option<String>,
}

/// A lead that failed within a bulk job, with the captured error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedLead {
    pub name: String,
    pub error: String,
}

/// Persisted snapshot of an asynchronous bulk send job.
///
/// The worker is the only writer for a given job id; status readers observe
/// last-write-wins snapshots. Progress never decreases and reaches exactly
/// 100 at completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkJob {
    pub job_id: String,
    pub status: BulkJobStatus,
    pub leads_count: usize,
    #[serde(default)]
    pub template_name: String,
    #[serde(default)]
    pub test_mode: bool,
    /// Percent complete, 0-100.
    pub progress: u8,
    #[serde(default)]
    pub successful_leads: Vec<SentLead>,
    #[serde(default)]
    pub failed_leads: Vec<FailedLead>,
    #[serde(default)]
    pub submitted_by: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl BulkJob {
    /// A fresh snapshot for a just-submitted job.
    pub fn queued(
        job_id: impl Into<String>,
        leads_count: usize,
        template_name: impl Into<String>,
        test_mode: bool,
        submitted_by: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            status: BulkJobStatus::Queued,
            leads_count,
            template_name: template_name.into(),
            test_mode,
            progress: 0,
            successful_leads: Vec::new(),
            failed_leads: Vec::new(),
            submitted_by: submitted_by.into(),
            timestamp: Utc::now(),
            completed_at: None,
        }
    }

    /// Placeholder snapshot for an id with no persisted state.
    pub fn not_found(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: BulkJobStatus::NotFound,
            leads_count: 0,
            template_name: String::new(),
            test_mode: false,
            progress: 0,
            successful_leads: Vec::new(),
            failed_leads: Vec::new(),
            submitted_by: String::new(),
            timestamp: Utc::now(),
            completed_at: None,
        }
    }
}

/// One line of the job listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkJobSummary {
    pub job_id: String,
    pub status: BulkJobStatus,
    pub progress: u8,
    pub timestamp: DateTime<Utc>,
    pub leads_count: usize,
    pub success_count: usize,
    pub error_count: usize,
    #[serde(default)]
    pub submitted_by: String,
}

impl From<&BulkJob> for BulkJobSummary {
    fn from(job: &BulkJob) -> Self {
        Self {
            job_id: job.job_id.clone(),
            status: job.status,
            progress: job.progress,
            timestamp: job.timestamp,
            leads_count: job.leads_count,
            success_count: job.successful_leads.len(),
            error_count: job.failed_leads.len(),
            submitted_by: job.submitted_by.clone(),
        }
    }
}

// --- Test mode flag ---

/// Test-mode flag normalized from the heterogeneous encodings clients send:
/// booleans, numbers, and the strings "true"/"1" (case-insensitive).
///
/// Defaults to on -- a misconfigured client should reach the test recipient,
/// not real leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TestModeValue")]
pub struct TestMode(pub bool);

impl Default for TestMode {
    fn default() -> Self {
        TestMode(true)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TestModeValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<TestModeValue> for TestMode {
    fn from(value: TestModeValue) -> Self {
        match value {
            TestModeValue::Bool(b) => TestMode(b),
            TestModeValue::Number(n) => TestMode(n != 0.0),
            TestModeValue::Text(s) => {
                let s = s.trim().to_ascii_lowercase();
                TestMode(s == "true" || s == "1")
            }
        }
    }
}

// --- Outbound mail ---

/// A finished email handed to a [`crate::traits::MailTransport`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub recipients: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    pub sender: String,
    pub sender_name: String,
    pub subject: String,
    pub html: String,
    /// Communication record this send is linked to, if any.
    #[serde(default)]
    pub communication_id: Option<String>,
    #[serde(default)]
    pub reference_doctype: Option<String>,
    #[serde(default)]
    pub reference_name: Option<String>,
}

// --- Job runner ---

/// Execution status reported by the external job runner.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RunnerStatus {
    Queued,
    Started,
    Finished,
    Failed,
}

/// A job as seen by the runner: execution status plus failure detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedJob {
    pub id: String,
    pub queue: String,
    pub status: RunnerStatus,
    #[serde(default)]
    pub error_info: Option<String>,
}

/// Handle returned when a job is enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: String,
}

// --- Document store filters ---

/// Filter expression for [`crate::traits::DocumentStore::query`].
#[derive(Debug, Clone, PartialEq)]
pub enum DocFilter {
    /// Every document of the doctype.
    All,
    /// Documents whose id is in the given list; results preserve list order.
    Ids(Vec<String>),
    /// Conjunction of field equality constraints.
    Fields(Map<String, Value>),
}
