//! Background job scheduler: every submission runs as its own tokio task and writes its
//! outcome back into the job store.

use crate::error::{BoxError, SchedulerError};
use crate::hub::{Subscription, SubscriptionHub};
use crate::store::JobStore;
use docgen_types::{Job, JobEvent, JobId};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, Semaphore};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Upper bound on jobs executing at once. `None` runs every job immediately.
    pub max_concurrent_jobs: Option<usize>,
    /// Buffered events per job topic before slow subscribers start lagging.
    pub event_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: None,
            event_capacity: 16,
        }
    }
}

/// Owned scheduler service. Clones share the same store.
#[derive(Clone)]
pub struct Scheduler {
    store: JobStore,
    limiter: Option<Arc<Semaphore>>,
}

impl Scheduler {
    /// Empty scheduler; `config` fixes the concurrency bound and topic buffer size.
    pub fn new(config: SchedulerConfig) -> Self {
        let hub = SubscriptionHub::new(config.event_capacity);
        let limiter = config
            .max_concurrent_jobs
            .map(|n| Arc::new(Semaphore::new(n.max(1))));
        Self {
            store: JobStore::new(hub),
            limiter,
        }
    }

    /// Underlying job store, shared by every clone of this scheduler.
    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// Creates the job and starts `generation_fn(payload)` in the background.
    ///
    /// Returns as soon as the job is recorded; the job is `Running` on return when
    /// no concurrency bound is set, otherwise `Pending` until a slot frees up.
    /// Must be called from within a tokio runtime.
    pub async fn submit<F, Fut>(
        &self,
        job_type: impl Into<String>,
        payload: serde_json::Value,
        generation_fn: F,
    ) -> JobId
    where
        F: FnOnce(serde_json::Value) -> Fut + Send + 'static,
        Fut: Future<Output = Result<serde_json::Value, BoxError>> + Send + 'static,
    {
        let job = Job::new(job_type, payload.clone());
        let job_id = job.id().clone();
        tracing::info!(job_id = %job_id, job_type = job.job_type(), "job submitted");
        self.store.insert(job).await;

        if self.limiter.is_none() {
            self.store.mark_running(&job_id).await;
        }

        let store = self.store.clone();
        let limiter = self.limiter.clone();
        let id = job_id.clone();
        tokio::spawn(async move {
            let _permit = match limiter {
                Some(sem) => {
                    let Ok(permit) = sem.acquire_owned().await else {
                        return;
                    };
                    if !store.mark_running(&id).await {
                        tracing::info!(job_id = %id, "job cancelled or cleared while queued, not started");
                        return;
                    }
                    Some(permit)
                }
                None => None,
            };
            let outcome = run_to_completion(async move { generation_fn(payload).await }).await;
            if let Err(ref message) = outcome {
                tracing::warn!(job_id = %id, error = %message, "job failed");
            }
            store.settle(&id, outcome).await;
        });

        job_id
    }

    /// Snapshot of the job, or `None` for an unknown id.
    pub async fn get(&self, job_id: &JobId) -> Option<Job> {
        self.store.get(job_id).await
    }

    /// Advisory cancel: flips the status of a non-terminal job but does not stop its work.
    pub async fn cancel(&self, job_id: &JobId) -> bool {
        let cancelled = self.store.cancel(job_id).await;
        if cancelled {
            tracing::info!(job_id = %job_id, "job cancelled");
        }
        cancelled
    }

    /// Removes the record; any work still running for it is unaffected.
    pub async fn clear(&self, job_id: &JobId) -> bool {
        self.store.remove(job_id).await
    }

    /// Removes every terminal job; returns how many were removed.
    pub async fn clear_completed(&self) -> usize {
        let removed = self.store.remove_terminal().await.len();
        tracing::debug!(removed, "cleared finished jobs");
        removed
    }

    /// Pending and running jobs, oldest first, optionally of one `job_type`.
    pub async fn list_active(&self, job_type: Option<&str>) -> Vec<Job> {
        self.store
            .list(|j| !j.is_terminal() && job_type.map_or(true, |t| j.job_type() == t))
            .await
    }

    /// Jobs in any terminal status, oldest first, optionally of one `job_type`.
    pub async fn list_completed(&self, job_type: Option<&str>) -> Vec<Job> {
        self.store
            .list(|j| j.is_terminal() && job_type.map_or(true, |t| j.job_type() == t))
            .await
    }

    /// Invokes `callback` on every status change of the job. A job that is already
    /// terminal replays its final snapshot once. `JobNotFound` for an unknown id.
    pub async fn subscribe<F>(&self, job_id: &JobId, callback: F) -> Result<Subscription, SchedulerError>
    where
        F: Fn(JobEvent) + Send + Sync + 'static,
    {
        self.store
            .subscribe(job_id, callback)
            .await
            .ok_or_else(|| SchedulerError::JobNotFound(job_id.clone()))
    }

    /// Raw event receiver for push consumers; closed when the job is cleared.
    pub async fn watch(&self, job_id: &JobId) -> Result<broadcast::Receiver<JobEvent>, SchedulerError> {
        self.store
            .watch(job_id)
            .await
            .ok_or_else(|| SchedulerError::JobNotFound(job_id.clone()))
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

/// Runs the work on its own task so a panic is reported as a failure instead of leaving
/// the job running forever. `work` must also cover the call that builds the future.
async fn run_to_completion<Fut>(work: Fut) -> Result<serde_json::Value, String>
where
    Fut: Future<Output = Result<serde_json::Value, BoxError>> + Send + 'static,
{
    match tokio::spawn(work).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(join_err) if join_err.is_panic() => {
            let panic = join_err.into_panic();
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(format!("job panicked: {}", message))
        }
        Err(join_err) => Err(format!("job aborted: {}", join_err)),
    }
}
