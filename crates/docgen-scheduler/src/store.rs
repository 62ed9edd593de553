//! In-memory job store: records keyed by id, lifecycle transitions, notifications.

use crate::hub::{Subscription, SubscriptionHub};
use chrono::Utc;
use docgen_types::{Job, JobEvent, JobEventKind, JobId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Owned job store. Every applied transition is published to the hub while the write
/// lock is still held, so listeners see events in transition order.
#[derive(Clone)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
    hub: SubscriptionHub,
}

impl JobStore {
    /// Empty store publishing through `hub`.
    pub fn new(hub: SubscriptionHub) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            hub,
        }
    }

    /// Adds a new record. No event is published for insertion.
    pub async fn insert(&self, job: Job) {
        let mut guard = self.jobs.write().await;
        guard.insert(job.id().clone(), job);
    }

    /// Snapshot clone of the record, or `None` if unknown.
    pub async fn get(&self, job_id: &JobId) -> Option<Job> {
        let guard = self.jobs.read().await;
        guard.get(job_id).cloned()
    }

    /// Number of records, terminal or not.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// True when the store holds no record.
    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Pending -> Running. Returns false if the job is gone or no longer pending.
    pub async fn mark_running(&self, job_id: &JobId) -> bool {
        let mut guard = self.jobs.write().await;
        let Some(job) = guard.get_mut(job_id) else {
            return false;
        };
        let now = Utc::now();
        if !job.mark_running(now) {
            return false;
        }
        tracing::debug!(job_id = %job_id, "job running");
        self.hub
            .publish(JobEvent::new(JobEventKind::Transition, job, now))
            .await;
        true
    }

    /// Writes the outcome of the job's work. See [`Job::settle`].
    pub async fn settle(
        &self,
        job_id: &JobId,
        outcome: Result<serde_json::Value, String>,
    ) -> Option<JobEventKind> {
        let mut guard = self.jobs.write().await;
        let Some(job) = guard.get_mut(job_id) else {
            tracing::debug!(job_id = %job_id, "job cleared before it settled, outcome dropped");
            return None;
        };
        let now = Utc::now();
        let kind = job.settle(outcome, now)?;
        match kind {
            JobEventKind::Transition => tracing::debug!(
                job_id = %job_id,
                status = %job.status(),
                duration_ms = job.duration_ms().unwrap_or_default(),
                "job settled"
            ),
            JobEventKind::LateOutcome => {
                tracing::debug!(job_id = %job_id, "cancelled job settled late")
            }
        }
        self.hub.publish(JobEvent::new(kind, job, now)).await;
        Some(kind)
    }

    /// Marks a non-terminal job cancelled. Returns false if missing or already terminal.
    pub async fn cancel(&self, job_id: &JobId) -> bool {
        let mut guard = self.jobs.write().await;
        let Some(job) = guard.get_mut(job_id) else {
            return false;
        };
        let now = Utc::now();
        if !job.cancel(now) {
            return false;
        }
        self.hub
            .publish(JobEvent::new(JobEventKind::Transition, job, now))
            .await;
        true
    }

    /// Removes one record and closes its topic.
    pub async fn remove(&self, job_id: &JobId) -> bool {
        let mut guard = self.jobs.write().await;
        let removed = guard.remove(job_id).is_some();
        if removed {
            self.hub.close(job_id).await;
        }
        removed
    }

    /// Removes every terminal record; returns the removed ids.
    pub async fn remove_terminal(&self) -> Vec<JobId> {
        let mut guard = self.jobs.write().await;
        let ids: Vec<JobId> = guard
            .values()
            .filter(|j| j.is_terminal())
            .map(|j| j.id().clone())
            .collect();
        for id in &ids {
            guard.remove(id);
            self.hub.close(id).await;
        }
        ids
    }

    /// Snapshots matching `filter`, oldest first.
    pub async fn list<P>(&self, filter: P) -> Vec<Job>
    where
        P: Fn(&Job) -> bool,
    {
        let guard = self.jobs.read().await;
        let mut out: Vec<Job> = guard.values().filter(|j| filter(*j)).cloned().collect();
        out.sort_by_key(|j| j.created_at());
        out
    }

    /// Callback subscription. A job that is already terminal replays its final snapshot
    /// so late subscribers still observe the terminal state. `None` if the job is unknown.
    pub async fn subscribe<F>(&self, job_id: &JobId, callback: F) -> Option<Subscription>
    where
        F: Fn(JobEvent) + Send + Sync + 'static,
    {
        let guard = self.jobs.read().await;
        let job = guard.get(job_id)?;
        let replay = job
            .is_terminal()
            .then(|| JobEvent::new(JobEventKind::Transition, job, Utc::now()));
        Some(self.hub.subscribe(job_id, replay, callback).await)
    }

    /// Raw receiver for push consumers. `None` if the job is unknown.
    pub async fn watch(&self, job_id: &JobId) -> Option<broadcast::Receiver<JobEvent>> {
        let guard = self.jobs.read().await;
        if !guard.contains_key(job_id) {
            return None;
        }
        Some(self.hub.receiver(job_id).await)
    }
}
