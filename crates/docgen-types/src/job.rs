//! Job record, lifecycle status, and the events emitted on every transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque job identifier (UUID v4 string), assigned at submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle status. Transitions only move forward: Pending -> Running -> terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a cancelled job's work eventually produced. Cancellation is advisory, so the
/// work keeps running; its outcome is kept here instead of in `result`/`error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LateOutcome {
    pub settled_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A tracked unit of asynchronous work.
///
/// `result` is present iff the status is `Completed`; `error` iff it is `Failed`.
/// The fields are private so only the transition methods below can change them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    job_type: String,
    status: JobStatus,
    payload: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    late_outcome: Option<LateOutcome>,
}

impl Job {
    /// New job in `Pending`.
    pub fn new(job_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: JobId::new(),
            job_type: job_type.into(),
            status: JobStatus::Pending,
            payload,
            result: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            late_outcome: None,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    pub fn result(&self) -> Option<&serde_json::Value> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn late_outcome(&self) -> Option<&LateOutcome> {
        self.late_outcome.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Milliseconds between start and completion, once both are known.
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }

    /// Pending -> Running. Returns false for any other starting status.
    pub fn mark_running(&mut self, at: DateTime<Utc>) -> bool {
        if self.status != JobStatus::Pending {
            return false;
        }
        self.status = JobStatus::Running;
        self.started_at = Some(at);
        true
    }

    /// Records the outcome of the job's work.
    ///
    /// Running jobs move to `Completed` or `Failed`. A cancelled job keeps its status and
    /// gets a `LateOutcome` (once). Anything else is ignored and returns `None`.
    pub fn settle(
        &mut self,
        outcome: Result<serde_json::Value, String>,
        at: DateTime<Utc>,
    ) -> Option<JobEventKind> {
        match self.status {
            JobStatus::Running => {
                match outcome {
                    Ok(value) => {
                        self.status = JobStatus::Completed;
                        self.result = Some(value);
                    }
                    Err(message) => {
                        self.status = JobStatus::Failed;
                        self.error = Some(message);
                    }
                }
                self.completed_at = Some(at);
                Some(JobEventKind::Transition)
            }
            JobStatus::Cancelled if self.late_outcome.is_none() => {
                let (result, error) = match outcome {
                    Ok(value) => (Some(value), None),
                    Err(message) => (None, Some(message)),
                };
                self.late_outcome = Some(LateOutcome {
                    settled_at: at,
                    result,
                    error,
                });
                Some(JobEventKind::LateOutcome)
            }
            _ => None,
        }
    }

    /// Any non-terminal status -> Cancelled. Returns false if already terminal.
    pub fn cancel(&mut self, at: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = JobStatus::Cancelled;
        self.completed_at = Some(at);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobEventKind {
    /// The job's status changed.
    Transition,
    /// A cancelled job's work settled after the cancel.
    LateOutcome,
}

/// Notification published for a job; carries the snapshot taken right after the change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEvent {
    pub kind: JobEventKind,
    pub job_id: JobId,
    pub job_type: String,
    pub status: JobStatus,
    pub at: DateTime<Utc>,
    pub job: Job,
}

impl JobEvent {
    pub fn new(kind: JobEventKind, job: &Job, at: DateTime<Utc>) -> Self {
        Self {
            kind,
            job_id: job.id.clone(),
            job_type: job.job_type.clone(),
            status: job.status,
            at,
            job: job.clone(),
        }
    }
}
