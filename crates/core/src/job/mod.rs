//! Training jobs and the in-process registry that owns them.

mod error;
mod registry;
mod retention;
mod types;

pub use error::JobError;
pub use registry::{JobLease, JobRegistry};
pub use retention::spawn_retention_sweeper;
pub use types::{
    ErrorPayload, Job, JobSnapshot, JobStatus, StepUpdate, StreamPayload, QUEUED_MESSAGE,
    START_MESSAGE,
};
