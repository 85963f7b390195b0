// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulk send coordination.
//!
//! Submission resolves the lead set, writes the initial job snapshot, and
//! enqueues the worker; the worker then processes leads strictly one at a
//! time with a fixed inter-item delay (an explicit throttle toward the mail
//! transport) and persists the snapshot after every single lead, so a
//! mid-run crash loses at most one item's progress. One failing lead never
//! aborts the rest of the batch.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use leadflow_core::traits::runner::JobFuture;
use leadflow_core::types::{
    doctype, BulkJob, BulkJobStatus, BulkLead, DocFilter, FailedLead, SentLead, TestMode,
};
use leadflow_core::LeadflowError;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::send_one::LeadSendRequest;
use crate::status::job_key;
use crate::Engine;

/// A bulk send submission.
#[derive(Debug, Clone, Default)]
pub struct BulkRequest {
    /// Explicit lead ids. Takes precedence over `filter`.
    pub lead_ids: Option<Vec<String>>,
    /// Field-equality filter resolving the lead set, capped by
    /// `jobs.filter_limit`.
    pub filter: Option<Map<String, Value>>,
    /// Stored email template to use. Required: the bulk path is
    /// template-only.
    pub template_name: Option<String>,
    pub test_mode: TestMode,
    pub submitted_by: String,
}

impl Engine {
    /// Serializes and persists a job snapshot under its canonical key.
    pub(crate) async fn persist_job(&self, job: &BulkJob) -> Result<(), LeadflowError> {
        let json = serde_json::to_string(job)
            .map_err(|e| LeadflowError::Cache(format!("job snapshot serialization failed: {e}")))?;
        self.cache
            .set(
                &job_key(&job.job_id),
                &json,
                Duration::from_secs(self.config.jobs.snapshot_ttl_secs),
            )
            .await
    }

    /// Validates a bulk submission, snapshots it as `queued`, and enqueues
    /// the worker. Returns the initial snapshot; the job id inside it is
    /// what callers poll with.
    pub async fn submit_bulk(self: Arc<Self>, req: BulkRequest) -> Result<BulkJob, LeadflowError> {
        let template_name = req
            .template_name
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LeadflowError::Config("please select an email template".into()))?
            .to_string();

        // The template must exist before we commit to a job.
        self.store()
            .fetch(doctype::EMAIL_TEMPLATE, &template_name)
            .await?;

        let leads = self.resolve_leads(&req).await?;
        if leads.is_empty() {
            return Err(LeadflowError::Config(
                "no leads found to send emails to".into(),
            ));
        }

        let job_id = uuid::Uuid::new_v4().to_string();
        let job = BulkJob::queued(
            &job_id,
            leads.len(),
            &template_name,
            req.test_mode.0,
            &req.submitted_by,
        );
        // Snapshot first, enqueue second: the id is ours, so the tracking
        // entry exists before the worker can possibly run.
        self.persist_job(&job).await?;

        let engine = Arc::clone(&self);
        let worker_job_id = job_id.clone();
        let test_mode = req.test_mode.0;
        let submitted_by = req.submitted_by.clone();
        let worker_template = template_name.clone();
        let work: JobFuture = Box::pin(async move {
            run_bulk_worker(
                engine,
                worker_job_id,
                leads,
                worker_template,
                test_mode,
                submitted_by,
            )
            .await
        });
        self.runner
            .enqueue(&self.config.jobs.queue, &job_id, work)
            .await?;

        info!(
            job = %job_id,
            leads = job.leads_count,
            template = %template_name,
            test_mode,
            "bulk email job enqueued"
        );
        Ok(job)
    }

    /// Resolves the lead set as minimal `{name, email}` payloads, in
    /// submission order.
    async fn resolve_leads(&self, req: &BulkRequest) -> Result<Vec<BulkLead>, LeadflowError> {
        let docs = if let Some(ids) = &req.lead_ids {
            if ids.is_empty() {
                return Err(LeadflowError::Config(
                    "no leads specified for bulk email".into(),
                ));
            }
            self.store()
                .query(
                    doctype::LEAD,
                    &DocFilter::Ids(ids.clone()),
                    &["name", "email"],
                    ids.len() + 10,
                )
                .await?
        } else if let Some(filter) = &req.filter {
            self.store()
                .query(
                    doctype::LEAD,
                    &DocFilter::Fields(filter.clone()),
                    &["name", "email"],
                    self.config.jobs.filter_limit,
                )
                .await?
        } else {
            return Err(LeadflowError::Config(
                "no leads specified for bulk email".into(),
            ));
        };

        Ok(docs
            .into_iter()
            .map(|doc| BulkLead {
                name: doc
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                email: doc
                    .get("email")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
            .collect())
    }
}

/// The worker phase: sequential iteration with per-item snapshot flushes.
pub(crate) async fn run_bulk_worker(
    engine: Arc<Engine>,
    job_id: String,
    leads: Vec<BulkLead>,
    template_name: String,
    test_mode: bool,
    submitted_by: String,
) -> Result<(), LeadflowError> {
    let mut job = engine.load_job_snapshot(&job_id).await.unwrap_or_else(|| {
        BulkJob::queued(&job_id, leads.len(), &template_name, test_mode, &submitted_by)
    });
    job.status = BulkJobStatus::Running;
    job.leads_count = leads.len();
    engine.persist_job(&job).await?;

    let total = leads.len();
    let delay = Duration::from_millis(engine.config.jobs.send_delay_ms);

    for (index, lead) in leads.iter().enumerate() {
        job.progress = (((index + 1) as f64) * 100.0 / total as f64).round() as u8;

        if lead.name.is_empty() {
            warn!(job = %job_id, index, "skipping lead with missing identifier");
            job.failed_leads.push(FailedLead {
                name: "Unknown".to_string(),
                error: "missing lead identifier in payload".to_string(),
            });
        } else {
            info!(job = %job_id, lead = %lead.name, position = index + 1, total, "processing lead");
            let outcome = engine
                .send_to_lead(&LeadSendRequest {
                    lead_id: lead.name.clone(),
                    template_name: Some(template_name.clone()),
                    tone: None,
                    additional_context: String::new(),
                    test_mode,
                    acting_user: submitted_by.clone(),
                })
                .await;

            if outcome.success {
                job.successful_leads.push(SentLead {
                    name: lead.name.clone(),
                    communication_id: outcome.communication_id,
                });
            } else {
                job.failed_leads.push(FailedLead {
                    name: lead.name.clone(),
                    error: outcome.message,
                });
            }
        }

        engine.persist_job(&job).await?;
        if index + 1 < total && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    job.status = if job.failed_leads.is_empty() {
        BulkJobStatus::Completed
    } else {
        BulkJobStatus::CompletedWithErrors
    };
    job.progress = 100;
    job.completed_at = Some(Utc::now());
    engine.persist_job(&job).await?;

    info!(
        job = %job_id,
        succeeded = job.successful_leads.len(),
        failed = job.failed_leads.len(),
        "bulk email job finished"
    );
    Ok(())
}
