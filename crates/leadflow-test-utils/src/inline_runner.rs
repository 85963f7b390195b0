// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inline job runner for deterministic testing.
//!
//! Runs each enqueued job to completion before `enqueue` returns, so tests
//! observe final job state without polling.

use async_trait::async_trait;
use dashmap::DashMap;
use leadflow_core::traits::runner::JobFuture;
use leadflow_core::types::{JobHandle, QueuedJob, RunnerStatus};
use leadflow_core::{JobRunner, LeadflowError};

/// A [`JobRunner`] that executes work inline on the caller's task.
#[derive(Default)]
pub struct InlineRunner {
    jobs: DashMap<String, QueuedJob>,
}

impl InlineRunner {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRunner for InlineRunner {
    async fn enqueue(
        &self,
        queue: &str,
        job_id: &str,
        work: JobFuture,
    ) -> Result<JobHandle, LeadflowError> {
        self.jobs.insert(
            job_id.to_string(),
            QueuedJob {
                id: job_id.to_string(),
                queue: queue.to_string(),
                status: RunnerStatus::Started,
                error_info: None,
            },
        );

        let result = work.await;

        if let Some(mut job) = self.jobs.get_mut(job_id) {
            match result {
                Ok(()) => job.status = RunnerStatus::Finished,
                Err(e) => {
                    job.status = RunnerStatus::Failed;
                    job.error_info = Some(e.to_string());
                }
            }
        }

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
        vec!["default".into(), "long".into(), "short".into()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn enqueue_runs_work_before_returning() {
        let runner = InlineRunner::new();
        runner
            .enqueue("long", "j1", Box::pin(async { Ok(()) }))
            .await
            .unwrap();
        let job = runner.fetch_job("j1").await.unwrap();
        assert_eq!(job.status, RunnerStatus::Finished);
    }

    #[tokio::test]
    async fn failures_are_recorded() {
        let runner = InlineRunner::new();
        runner
            .enqueue(
                "long",
                "j2",
                Box::pin(async { Err(LeadflowError::Internal("nope".into())) }),
            )
            .await
            .unwrap();
        let job = runner.fetch_job("j2").await.unwrap();
        assert_eq!(job.status, RunnerStatus::Failed);
        assert!(job.error_info.as_deref().unwrap().contains("nope"));
    }
}
