//! Scheduler and poll-consumer errors.

use docgen_types::JobId;

/// Boxed error returned by a job's generation function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("job not found: {0}")]
    JobNotFound(JobId),
    #[error("job {job_id}: cannot decode {what}: {message}")]
    Decode {
        job_id: JobId,
        what: &'static str,
        message: String,
    },
    #[error("cannot encode job payload: {0}")]
    Encode(String),
}

/// A polling consumer gave up on a job. Distinct from a job that ran and failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LostJobError {
    #[error("job {job_id} not found after {attempts} poll attempt(s)")]
    Missing { job_id: JobId, attempts: u32 },
    #[error("job {job_id} still not finished after {attempts} poll attempts")]
    Stalled { job_id: JobId, attempts: u32 },
}
