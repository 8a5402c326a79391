//! Core job data types and wire payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::JobError;

/// Log message of a freshly created job.
pub const QUEUED_MESSAGE: &str = "Training job queued and ready to start";

/// Log message sent when a streaming session starts the run.
pub const START_MESSAGE: &str = "Training started - initializing model...";

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Running => "RUNNING",
            JobStatus::Completed => "COMPLETED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }

    /// Whether a job in this status may be moved to `next`.
    ///
    /// Staying in `Running` is allowed so that each step can be recorded.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A simulated training job.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub progress: f64,
    pub loss: f64,
    pub log_message: String,
    /// Number of training steps already applied. A resumed stream continues after this.
    pub steps_completed: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a job in its initial queued state.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            status: JobStatus::Queued,
            progress: 0.0,
            loss: 0.0,
            log_message: QUEUED_MESSAGE.to_string(),
            steps_completed: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            job_id: self.id.clone(),
            status: self.status,
            progress: self.progress,
            loss: self.loss,
            log_message: self.log_message.clone(),
        }
    }

    /// Mark the run as started.
    ///
    /// A job interrupted mid-run is already `Running` and keeps its progress.
    pub fn start(&mut self) -> Result<(), JobError> {
        self.transition(JobStatus::Running)?;
        self.log_message = START_MESSAGE.to_string();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Record the outcome of one training step.
    pub fn apply_step(&mut self, update: StepUpdate) -> Result<(), JobError> {
        self.transition(update.status)?;
        self.progress = update.progress;
        self.loss = update.loss;
        self.log_message = update.log_message;
        self.steps_completed = update.step;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn transition(&mut self, next: JobStatus) -> Result<(), JobError> {
        if !self.status.can_transition_to(next) {
            return Err(JobError::InvalidTransition {
                job_id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// New field values produced by one training step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepUpdate {
    /// 1-based step index.
    pub step: u32,
    pub status: JobStatus,
    pub progress: f64,
    pub loss: f64,
    pub log_message: String,
}

/// Full job state as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: String,
    pub status: JobStatus,
    pub progress: f64,
    pub loss: f64,
    pub log_message: String,
}

/// Structured error pushed to a stream before it is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub job_id: String,
}

impl ErrorPayload {
    pub fn new(error: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            job_id: job_id.into(),
        }
    }
}

/// One message on a progress stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamPayload {
    Snapshot(JobSnapshot),
    Error(ErrorPayload),
}

impl StreamPayload {
    pub fn as_snapshot(&self) -> Option<&JobSnapshot> {
        match self {
            StreamPayload::Snapshot(snapshot) => Some(snapshot),
            StreamPayload::Error(_) => None,
        }
    }

    /// Label used for logging and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamPayload::Snapshot(_) => "snapshot",
            StreamPayload::Error(_) => "error",
        }
    }
}

impl From<JobSnapshot> for StreamPayload {
    fn from(snapshot: JobSnapshot) -> Self {
        StreamPayload::Snapshot(snapshot)
    }
}

impl From<ErrorPayload> for StreamPayload {
    fn from(error: ErrorPayload) -> Self {
        StreamPayload::Error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(step: u32, status: JobStatus, progress: f64) -> StepUpdate {
        StepUpdate {
            step,
            status,
            progress,
            loss: 1.0,
            log_message: format!("step {}", step),
        }
    }

    #[test]
    fn test_new_job_is_queued() {
        let job = Job::new("abc");
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0.0);
        assert_eq!(job.loss, 0.0);
        assert_eq!(job.steps_completed, 0);
        assert!(!job.log_message.is_empty());
    }

    #[test]
    fn test_status_transitions() {
        use JobStatus::*;

        assert!(Queued.can_transition_to(Running));
        assert!(Running.can_transition_to(Running));
        assert!(Running.can_transition_to(Completed));

        assert!(!Queued.can_transition_to(Completed));
        assert!(!Queued.can_transition_to(Queued));
        assert!(!Running.can_transition_to(Queued));
        assert!(!Completed.can_transition_to(Running));
        assert!(!Completed.can_transition_to(Queued));
        assert!(!Completed.can_transition_to(Completed));

        assert!(Completed.is_terminal());
        assert!(!Running.is_terminal());
    }

    #[test]
    fn test_apply_step_requires_start() {
        let mut job = Job::new("abc");
        let err = job
            .apply_step(step(1, JobStatus::Running, 0.1))
            .unwrap_err();
        assert!(matches!(err, JobError::InvalidTransition { .. }));
        assert_eq!(job.status, JobStatus::Queued);
    }

    #[test]
    fn test_completed_job_cannot_restart() {
        let mut job = Job::new("abc");
        job.start().unwrap();
        job.apply_step(step(1, JobStatus::Completed, 1.0)).unwrap();

        assert!(job.start().is_err());
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 1.0);
    }

    #[test]
    fn test_restart_keeps_progress() {
        let mut job = Job::new("abc");
        job.start().unwrap();
        job.apply_step(step(3, JobStatus::Running, 0.1)).unwrap();

        job.start().unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.progress, 0.1);
        assert_eq!(job.steps_completed, 3);
        assert_eq!(job.log_message, START_MESSAGE);
    }

    #[test]
    fn test_snapshot_wire_format() {
        let job = Job::new("job-1");
        let value = serde_json::to_value(job.snapshot()).unwrap();
        assert_eq!(
            value,
            json!({
                "job_id": "job-1",
                "status": "QUEUED",
                "progress": 0.0,
                "loss": 0.0,
                "log_message": QUEUED_MESSAGE,
            })
        );
    }

    #[test]
    fn test_error_payload_wire_format() {
        let payload = StreamPayload::from(ErrorPayload::new("Job not found", "unknown-id"));
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({"error": "Job not found", "job_id": "unknown-id"}));
        assert_eq!(payload.kind(), "error");
        assert!(payload.as_snapshot().is_none());
    }

    #[test]
    fn test_stream_payload_deserializes_either_shape() {
        let snapshot: StreamPayload = serde_json::from_value(json!({
            "job_id": "x",
            "status": "RUNNING",
            "progress": 0.5,
            "loss": 1.2,
            "log_message": "hi",
        }))
        .unwrap();
        assert_eq!(snapshot.as_snapshot().unwrap().status, JobStatus::Running);

        let error: StreamPayload =
            serde_json::from_value(json!({"error": "Job not found", "job_id": "x"})).unwrap();
        assert!(matches!(error, StreamPayload::Error(_)));
    }
}
