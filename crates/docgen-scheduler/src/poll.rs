//! Polling consumer: re-read a job on a fixed interval until it is terminal.

use crate::error::LostJobError;
use crate::scheduler::Scheduler;
use docgen_types::{Job, JobId};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 150,
        }
    }
}

/// Returns the job once it is terminal, whatever the terminal status.
///
/// A job that disappears from the store (cleared) is `Missing`; one that is still
/// running after `max_attempts` reads is `Stalled`. Neither means the job failed.
pub async fn poll_until_terminal(
    scheduler: &Scheduler,
    job_id: &JobId,
    config: &PollConfig,
) -> Result<Job, LostJobError> {
    let max_attempts = config.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        match scheduler.get(job_id).await {
            None => {
                return Err(LostJobError::Missing {
                    job_id: job_id.clone(),
                    attempts: attempt,
                })
            }
            Some(job) if job.is_terminal() => return Ok(job),
            Some(_) => {}
        }
        if attempt < max_attempts {
            tokio::time::sleep(config.interval).await;
        }
    }
    tracing::warn!(job_id = %job_id, attempts = max_attempts, "gave up polling job");
    Err(LostJobError::Stalled {
        job_id: job_id.clone(),
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use docgen_types::JobStatus;
    use serde_json::json;
    use tokio::sync::oneshot;

    fn fast() -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(5),
            max_attempts: 200,
        }
    }

    #[tokio::test]
    async fn scenario_ok_completes() {
        let s = Scheduler::default();
        let id = s.submit("demo", json!({}), |_| async { Ok(json!("ok")) }).await;
        let job = poll_until_terminal(&s, &id, &fast()).await.unwrap();
        assert_eq!(job.status(), JobStatus::Completed);
        assert_eq!(job.result(), Some(&json!("ok")));
    }

    #[tokio::test]
    async fn scenario_boom_is_failed_not_lost() {
        let s = Scheduler::default();
        let id = s
            .submit("demo", json!({}), |_| async {
                Err::<serde_json::Value, BoxError>("boom".into())
            })
            .await;
        let job = poll_until_terminal(&s, &id, &fast()).await.unwrap();
        assert_eq!(job.status(), JobStatus::Failed);
        assert!(job.error().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn cleared_job_is_missing() {
        let s = Scheduler::default();
        let err = poll_until_terminal(&s, &JobId::from("gone"), &fast())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LostJobError::Missing {
                job_id: JobId::from("gone"),
                attempts: 1
            }
        );
    }

    #[tokio::test]
    async fn never_finishing_job_is_stalled() {
        let s = Scheduler::default();
        let (_tx, rx) = oneshot::channel::<()>();
        let id = s
            .submit("demo", json!({}), |_| async move {
                let _ = rx.await;
                Ok(json!(null))
            })
            .await;
        let cfg = PollConfig {
            interval: Duration::from_millis(1),
            max_attempts: 3,
        };
        let err = poll_until_terminal(&s, &id, &cfg).await.unwrap_err();
        assert!(matches!(err, LostJobError::Stalled { attempts: 3, .. }));
    }
}
