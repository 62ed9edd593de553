//! Per-job notification topics.

use docgen_types::{JobEvent, JobId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

/// One broadcast topic per job id. Topics are created on first subscription and closed
/// when the job record is cleared, which ends every listener on that topic.
#[derive(Clone)]
pub struct SubscriptionHub {
    topics: Arc<RwLock<HashMap<JobId, broadcast::Sender<JobEvent>>>>,
    capacity: usize,
}

impl SubscriptionHub {
    /// Hub whose topics buffer `capacity` events (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Raw receiver for push consumers.
    pub async fn receiver(&self, job_id: &JobId) -> broadcast::Receiver<JobEvent> {
        let mut guard = self.topics.write().await;
        guard
            .entry(job_id.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Runs `callback` for every event on the job's topic, in publish order.
    /// `replay` is delivered first, before anything published later.
    pub async fn subscribe<F>(
        &self,
        job_id: &JobId,
        replay: Option<JobEvent>,
        callback: F,
    ) -> Subscription
    where
        F: Fn(JobEvent) + Send + Sync + 'static,
    {
        let mut rx = self.receiver(job_id).await;
        let id = job_id.clone();
        let handle = tokio::spawn(async move {
            if let Some(event) = replay {
                callback(event);
            }
            loop {
                match rx.recv().await {
                    Ok(event) => callback(event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(job_id = %id, skipped, "subscriber lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Subscription {
            job_id: job_id.clone(),
            handle,
        }
    }

    /// Sends to current listeners; a job nobody listens to has no topic and this is a no-op.
    pub async fn publish(&self, event: JobEvent) {
        let guard = self.topics.read().await;
        if let Some(tx) = guard.get(&event.job_id) {
            let _ = tx.send(event);
        }
    }

    /// Drops the job's topic; its listeners see `Closed` and stop.
    pub async fn close(&self, job_id: &JobId) {
        self.topics.write().await.remove(job_id);
    }

    /// Live receivers on the job's topic; 0 when it has none.
    pub async fn subscriber_count(&self, job_id: &JobId) -> usize {
        let guard = self.topics.read().await;
        guard.get(job_id).map(|tx| tx.receiver_count()).unwrap_or(0)
    }
}

/// Handle of a callback subscription. Dropping it keeps the listener alive until the
/// job's topic closes; call [`Subscription::unsubscribe`] to stop it earlier.
pub struct Subscription {
    job_id: JobId,
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn unsubscribe(self) {
        self.handle.abort();
    }
}
