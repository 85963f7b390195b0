// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job runner trait for background execution of bulk work.

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::LeadflowError;
use crate::types::{JobHandle, QueuedJob};

/// A unit of background work driven to completion by the runner.
pub type JobFuture = BoxFuture<'static, Result<(), LeadflowError>>;

/// Dispatch of background jobs to an external execution context.
///
/// The caller supplies the job id so it can initialize tracking state under
/// that id before the worker starts; the runner only executes and reports.
/// There is no cancellation: once enqueued, a job runs until it finishes or
/// its process dies.
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Enqueues `work` on the named queue under the caller-chosen id.
    async fn enqueue(
        &self,
        queue: &str,
        job_id: &str,
        work: JobFuture,
    ) -> Result<JobHandle, LeadflowError>;

    /// Looks up a job by id across all queues.
    async fn fetch_job(&self, job_id: &str) -> Option<QueuedJob>;

    /// Looks up a job by id within one named queue.
    async fn fetch_from_queue(&self, queue: &str, job_id: &str) -> Option<QueuedJob>;

    /// The queue names this runner knows about, for exhaustive scans.
    fn queue_names(&self) -> Vec<String>;
}
