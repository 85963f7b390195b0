// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tokio-backed job runner.
//!
//! Each enqueued job becomes one spawned task. Execution state lives in a
//! concurrent map so status readers can observe queued/started/finished
//! transitions and failure detail without touching the task itself.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use leadflow_core::traits::runner::JobFuture;
use leadflow_core::types::{JobHandle, QueuedJob, RunnerStatus};
use leadflow_core::{JobRunner, LeadflowError};
use tracing::{error, info};

/// Queues the runner reports for exhaustive scans.
const DEFAULT_QUEUES: [&str; 3] = ["default", "long", "short"];

/// In-process [`JobRunner`] running jobs as detached tokio tasks.
#[derive(Default)]
pub struct TokioRunner {
    jobs: Arc<DashMap<String, QueuedJob>>,
}

impl TokioRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Polls until the job leaves the queued/started states or the timeout
    /// elapses. Returns the final observed state.
    pub async fn wait_until_done(
        &self,
        job_id: &str,
        timeout: Duration,
    ) -> Option<QueuedJob> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let job = self.jobs.get(job_id).map(|j| j.clone());
            match &job {
                Some(j) if matches!(j.status, RunnerStatus::Finished | RunnerStatus::Failed) => {
                    return job;
                }
                _ if tokio::time::Instant::now() >= deadline => return job,
                _ => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
    }
}

#[async_trait]
impl JobRunner for TokioRunner {
    async fn enqueue(
        &self,
        queue: &str,
        job_id: &str,
        work: JobFuture,
    ) -> Result<JobHandle, LeadflowError> {
        if self.jobs.contains_key(job_id) {
            return Err(LeadflowError::Internal(format!(
                "job id '{job_id}' is already enqueued"
            )));
        }

        self.jobs.insert(
            job_id.to_string(),
            QueuedJob {
                id: job_id.to_string(),
                queue: queue.to_string(),
                status: RunnerStatus::Queued,
                error_info: None,
            },
        );

        let jobs = Arc::clone(&self.jobs);
        let id = job_id.to_string();
        let queue_name = queue.to_string();
        tokio::spawn(async move {
            if let Some(mut job) = jobs.get_mut(&id) {
                job.status = RunnerStatus::Started;
            }
            info!(job_id = %id, queue = %queue_name, "job started");

            match work.await {
                Ok(()) => {
                    if let Some(mut job) = jobs.get_mut(&id) {
                        job.status = RunnerStatus::Finished;
                    }
                    info!(job_id = %id, "job finished");
                }
                Err(e) => {
                    if let Some(mut job) = jobs.get_mut(&id) {
                        job.status = RunnerStatus::Failed;
                        job.error_info = Some(e.to_string());
                    }
                    error!(job_id = %id, error = %e, "job failed");
                }
            }
        });

        Ok(JobHandle {
            id: job_id.to_string(),
        })
    }

    async fn fetch_job(&self, job_id: &str) -> Option<QueuedJob> {
        self.jobs.get(job_id).map(|j| j.clone())
    }

    async fn fetch_from_queue(&self, queue: &str, job_id: &str) -> Option<QueuedJob> {
        self.jobs
            .get(job_id)
            .filter(|j| j.queue == queue)
            .map(|j| j.clone())
    }

    fn queue_names(&self) -> Vec<String> {
        DEFAULT_QUEUES.iter().map(|q| q.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn job_runs_to_finished() {
        let runner = TokioRunner::new();
        runner
            .enqueue("long", "j1", Box::pin(async { Ok(()) }))
            .await
            .unwrap();

        let job = runner
            .wait_until_done("j1", Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(job.status, RunnerStatus::Finished);
        assert!(job.error_info.is_none());
    }

    #[tokio::test]
    async fn failing_job_records_error_info() {
        let runner = TokioRunner::new();
        runner
            .enqueue(
                "long",
                "j2",
                Box::pin(async { Err(LeadflowError::Internal("worker exploded".into())) }),
            )
            .await
            .unwrap();

        let job = runner
            .wait_until_done("j2", Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(job.status, RunnerStatus::Failed);
        assert!(job.error_info.as_deref().unwrap().contains("worker exploded"));
    }

    #[tokio::test]
    async fn duplicate_job_id_is_rejected() {
        let runner = TokioRunner::new();
        runner
            .enqueue("long", "j3", Box::pin(async { Ok(()) }))
            .await
            .unwrap();
        let err = runner
            .enqueue("long", "j3", Box::pin(async { Ok(()) }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already enqueued"));
    }

    #[tokio::test]
    async fn fetch_from_queue_requires_matching_queue() {
        let runner = TokioRunner::new();
        runner
            .enqueue("long", "j4", Box::pin(async { Ok(()) }))
            .await
            .unwrap();
        assert!(runner.fetch_from_queue("long", "j4").await.is_some());
        assert!(runner.fetch_from_queue("short", "j4").await.is_none());
        assert!(runner.fetch_job("unknown").await.is_none());
    }
}
