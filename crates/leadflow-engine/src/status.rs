// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job status reading and snapshot key management.
//!
//! Status reads never fail the caller: an unresolvable id yields a
//! `not_found` snapshot rather than an error. Execution status comes from
//! the runner; progress and per-lead outcomes come from the persisted
//! snapshot; the two are merged here.
//!
//! Snapshots live under one canonical key scheme. Keys written by earlier
//! releases are converted by [`migrate_legacy_job_keys`] once at startup
//! instead of being consulted on every read.

use std::time::Duration;

use leadflow_core::types::{BulkJob, BulkJobStatus, BulkJobSummary, QueuedJob, RunnerStatus};
use leadflow_core::{KvCache, LeadflowError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::Engine;

/// Canonical snapshot key prefix.
pub(crate) const JOB_KEY_PREFIX: &str = "bulk-email-job:";

/// Key prefix used by earlier releases; handled only by the migration pass.
const LEGACY_KEY_PREFIX: &str = "bulk_email_job_";

/// Separator in site-scoped job ids (`<site>||<id>`).
const SITE_SEPARATOR: &str = "||";

/// The canonical cache key for a job id.
pub(crate) fn job_key(job_id: &str) -> String {
    format!("{JOB_KEY_PREFIX}{job_id}")
}

/// Runner-level execution detail for diagnosing failed jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDebugInfo {
    pub job_id: String,
    /// The job as the runner sees it, if it still knows the id.
    pub runner: Option<QueuedJob>,
    /// The persisted snapshot, if one exists.
    pub snapshot: Option<BulkJob>,
}

impl Engine {
    /// Loads the persisted snapshot for a job id, tolerating site-scoped
    /// id encodings.
    pub(crate) async fn load_job_snapshot(&self, job_id: &str) -> Option<BulkJob> {
        for candidate in id_candidates(job_id, self.config.engine.site.as_deref()) {
            match self.cache.get(&job_key(&candidate)).await {
                Ok(Some(raw)) => match serde_json::from_str(&raw) {
                    Ok(job) => return Some(job),
                    Err(e) => {
                        warn!(job = %candidate, error = %e, "unparseable job snapshot");
                    }
                },
                Ok(None) => {}
                Err(e) => {
                    warn!(job = %candidate, error = %e, "job snapshot read failed");
                }
            }
        }
        None
    }

    /// Best-effort status for a job id. Never fails; unknown ids come back
    /// as `not_found` with empty lists and zero progress.
    pub async fn job_status(&self, job_id: &str) -> BulkJob {
        let runner_job = self.locate_runner_job(job_id).await;
        let snapshot = self.load_job_snapshot(job_id).await;

        let mut job = snapshot.unwrap_or_else(|| BulkJob::not_found(job_id));
        job.status = merged_status(runner_job.as_ref(), &job);
        // Echo the id in the caller's encoding, whatever matched internally.
        job.job_id = job_id.to_string();
        job
    }

    /// Locates the runner's view of a job: direct lookup, then the
    /// alternate id encoding, then a scan across known queues.
    async fn locate_runner_job(&self, job_id: &str) -> Option<QueuedJob> {
        let candidates = id_candidates(job_id, self.config.engine.site.as_deref());

        for candidate in &candidates {
            if let Some(job) = self.runner.fetch_job(candidate).await {
                return Some(job);
            }
        }

        for queue in self.runner.queue_names() {
            for candidate in &candidates {
                if let Some(job) = self.runner.fetch_from_queue(&queue, candidate).await {
                    return Some(job);
                }
            }
        }

        None
    }

    /// All persisted jobs, newest first.
    pub async fn list_jobs(&self) -> Vec<BulkJobSummary> {
        let keys = match self.cache.list_keys(JOB_KEY_PREFIX).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "job listing failed");
                return Vec::new();
            }
        };

        let mut jobs = Vec::new();
        for key in keys {
            if let Ok(Some(raw)) = self.cache.get(&key).await {
                match serde_json::from_str::<BulkJob>(&raw) {
                    Ok(job) => jobs.push(BulkJobSummary::from(&job)),
                    Err(e) => warn!(key = %key, error = %e, "skipping unparseable snapshot"),
                }
            }
        }
        jobs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        jobs
    }

    /// Runner execution detail plus the persisted snapshot, for operators
    /// diagnosing a failed worker.
    pub async fn debug_job(&self, job_id: &str) -> JobDebugInfo {
        JobDebugInfo {
            job_id: job_id.to_string(),
            runner: self.locate_runner_job(job_id).await,
            snapshot: self.load_job_snapshot(job_id).await,
        }
    }
}

/// The id as given, plus its alternate encoding: the bare part of a
/// site-scoped id, or the site-scoped form of a bare id.
fn id_candidates(job_id: &str, site: Option<&str>) -> Vec<String> {
    let mut candidates = vec![job_id.to_string()];
    if let Some((_, bare)) = job_id.split_once(SITE_SEPARATOR) {
        candidates.push(bare.to_string());
    } else if let Some(site) = site.filter(|s| !s.is_empty()) {
        candidates.push(format!("{site}{SITE_SEPARATOR}{job_id}"));
    }
    candidates
}

/// Execution status from the runner, falling back to the snapshot's own
/// terminal status once the runner reports the worker finished.
fn merged_status(runner: Option<&QueuedJob>, snapshot: &BulkJob) -> BulkJobStatus {
    match runner.map(|j| j.status) {
        Some(RunnerStatus::Queued) => BulkJobStatus::Queued,
        Some(RunnerStatus::Started) => BulkJobStatus::Running,
        Some(RunnerStatus::Failed) => BulkJobStatus::Failed,
        Some(RunnerStatus::Finished) => {
            if snapshot.status.is_terminal() {
                snapshot.status
            } else {
                BulkJobStatus::Completed
            }
        }
        None => BulkJobStatus::NotFound,
    }
}

/// One-time conversion of legacy snapshot keys to the canonical scheme.
///
/// Run at startup. Canonical entries win when both spellings exist; the
/// legacy key is removed either way. Returns how many keys were converted.
pub async fn migrate_legacy_job_keys(
    cache: &dyn KvCache,
    ttl: Duration,
) -> Result<usize, LeadflowError> {
    let legacy_keys = cache.list_keys(LEGACY_KEY_PREFIX).await?;
    let mut migrated = 0;

    for key in legacy_keys {
        let Some(raw) = cache.get(&key).await? else {
            continue;
        };
        let job_id = &key[LEGACY_KEY_PREFIX.len()..];
        let canonical = job_key(job_id);
        if cache.get(&canonical).await?.is_none() {
            cache.set(&canonical, &raw, ttl).await?;
        }
        cache.delete(&key).await?;
        migrated += 1;
    }

    if migrated > 0 {
        info!(migrated, "legacy job snapshot keys converted");
    }
    Ok(migrated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_candidates_for_bare_id() {
        assert_eq!(id_candidates("abc", None), vec!["abc"]);
        assert_eq!(
            id_candidates("abc", Some("crm.example.test")),
            vec!["abc", "crm.example.test||abc"]
        );
    }

    #[test]
    fn id_candidates_for_site_scoped_id() {
        assert_eq!(
            id_candidates("crm.example.test||abc", Some("crm.example.test")),
            vec!["crm.example.test||abc", "abc"]
        );
    }

    #[test]
    fn merged_status_prefers_runner_states() {
        let snapshot = BulkJob::not_found("j");
        let runner = |status| QueuedJob {
            id: "j".into(),
            queue: "long".into(),
            status,
            error_info: None,
        };
        assert_eq!(
            merged_status(Some(&runner(RunnerStatus::Queued)), &snapshot),
            BulkJobStatus::Queued
        );
        assert_eq!(
            merged_status(Some(&runner(RunnerStatus::Started)), &snapshot),
            BulkJobStatus::Running
        );
        assert_eq!(
            merged_status(Some(&runner(RunnerStatus::Failed)), &snapshot),
            BulkJobStatus::Failed
        );
    }

    #[test]
    fn merged_status_finished_defers_to_terminal_snapshot() {
        let mut snapshot = BulkJob::queued("j", 2, "Intro", true, "ops");
        snapshot.status = BulkJobStatus::CompletedWithErrors;
        let runner = QueuedJob {
            id: "j".into(),
            queue: "long".into(),
            status: RunnerStatus::Finished,
            error_info: None,
        };
        assert_eq!(
            merged_status(Some(&runner), &snapshot),
            BulkJobStatus::CompletedWithErrors
        );

        snapshot.status = BulkJobStatus::Running;
        assert_eq!(
            merged_status(Some(&runner), &snapshot),
            BulkJobStatus::Completed
        );
    }

    #[test]
    fn merged_status_without_runner_is_not_found() {
        let snapshot = BulkJob::queued("j", 2, "Intro", true, "ops");
        assert_eq!(merged_status(None, &snapshot), BulkJobStatus::NotFound);
    }

    #[test]
    fn job_key_uses_canonical_prefix() {
        assert_eq!(job_key("abc"), "bulk-email-job:abc");
    }
}
