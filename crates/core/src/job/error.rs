use thiserror::Error;

use super::JobStatus;

/// Error type for job registry operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobError {
    /// No job with this identifier exists.
    #[error("Job not found: {0}")]
    NotFound(String),

    /// Another streaming session already holds the job.
    #[error("Job {0} is already being streamed")]
    AlreadyStreaming(String),

    /// The requested status change would break the QUEUED → RUNNING → COMPLETED order.
    #[error("Cannot move job {job_id} from {from} to {to}")]
    InvalidTransition {
        job_id: String,
        from: JobStatus,
        to: JobStatus,
    },
}

impl JobError {
    /// Short message used in the `error` field of stream payloads.
    pub fn payload_message(&self) -> &'static str {
        match self {
            JobError::NotFound(_) => "Job not found",
            JobError::AlreadyStreaming(_) => "Job already streaming",
            JobError::InvalidTransition { .. } => "Invalid job state",
        }
    }
}
