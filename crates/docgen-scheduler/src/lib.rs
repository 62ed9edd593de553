//! In-memory background job scheduler.
//!
//! - [`Scheduler`]: submit work, read snapshots, cancel (advisory), clear, list.
//! - [`JobStore`]: records and lifecycle transitions; the only shared mutable state.
//! - [`SubscriptionHub`]: one broadcast topic per job for push consumers.
//! - [`poll_until_terminal`]: the polling side of the same contract.

mod error;
mod family;
mod hub;
mod poll;
mod scheduler;
mod store;

pub use docgen_types::{Job, JobEvent, JobEventKind, JobId, JobStatus, LateOutcome};
pub use error::{BoxError, LostJobError, SchedulerError};
pub use family::{JobFamily, TypedJob, TypedJobId};
pub use hub::{Subscription, SubscriptionHub};
pub use poll::{poll_until_terminal, PollConfig};
pub use scheduler::{Scheduler, SchedulerConfig};
pub use store::JobStore;
