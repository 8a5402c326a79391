//! Drives one job through its simulated run and streams every transition.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{schedule, NoiseSource, ProgressSink, StreamError};
use crate::config::TrainingConfig;
use crate::job::{ErrorPayload, JobError, JobLease, JobRegistry, StreamPayload};
use crate::metrics::{STREAMS_FINISHED_TOTAL, TRAINING_STEPS_TOTAL};

/// How a streaming session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// All steps were sent and the job is `COMPLETED`.
    Completed,
    /// The job had already finished; its final snapshot was sent once.
    AlreadyCompleted,
    /// No such job; an error payload was sent and the stream closed.
    NotFound,
    /// Another session holds the job; an error payload was sent and the stream closed.
    Rejected,
    /// The client went away mid-run. The job stays `RUNNING`.
    Disconnected,
    /// Unexpected fault; logged and the stream closed.
    Failed,
}

impl StreamOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamOutcome::Completed => "completed",
            StreamOutcome::AlreadyCompleted => "already_completed",
            StreamOutcome::NotFound => "not_found",
            StreamOutcome::Rejected => "rejected",
            StreamOutcome::Disconnected => "disconnected",
            StreamOutcome::Failed => "failed",
        }
    }
}

/// Runs simulated training for jobs held in a [`JobRegistry`].
#[derive(Clone)]
pub struct ProgressStreamer {
    registry: Arc<JobRegistry>,
    total_steps: u32,
    step_interval: Duration,
}

impl ProgressStreamer {
    pub fn new(registry: Arc<JobRegistry>, config: &TrainingConfig) -> Self {
        Self {
            registry,
            total_steps: config.total_steps.max(1),
            step_interval: config.step_interval(),
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    /// Stream the run of `job_id` to `sink`.
    ///
    /// Never returns an error: every failure is logged and reported through
    /// the returned [`StreamOutcome`]. On normal completion the sink is left
    /// open for the caller to close.
    pub async fn run<S, N>(&self, job_id: &str, sink: &mut S, noise: &mut N) -> StreamOutcome
    where
        S: ProgressSink + ?Sized,
        N: NoiseSource + ?Sized,
    {
        let outcome = match self.registry.acquire(job_id) {
            Ok(lease) => match self.drive(&lease, sink, noise).await {
                Ok(outcome) => outcome,
                Err(StreamError::Disconnected) => {
                    info!(job_id, "Client disconnected from job");
                    StreamOutcome::Disconnected
                }
                Err(e) => {
                    error!(job_id, error = %e, "Error while streaming job progress");
                    sink.close().await;
                    StreamOutcome::Failed
                }
            },
            Err(e) => reject(job_id, e, sink).await,
        };

        STREAMS_FINISHED_TOTAL
            .with_label_values(&[outcome.as_str()])
            .inc();
        outcome
    }

    async fn drive<S, N>(
        &self,
        lease: &JobLease,
        sink: &mut S,
        noise: &mut N,
    ) -> Result<StreamOutcome, StreamError>
    where
        S: ProgressSink + ?Sized,
        N: NoiseSource + ?Sized,
    {
        let current = lease.snapshot()?;
        if current.status.is_terminal() {
            debug!(job_id = lease.job_id(), "Job already completed, sending final state");
            sink.send(&StreamPayload::from(current)).await?;
            return Ok(StreamOutcome::AlreadyCompleted);
        }

        let resume_from = lease.steps_completed()? + 1;
        if resume_from > 1 {
            info!(
                job_id = lease.job_id(),
                step = resume_from,
                "Resuming interrupted training run"
            );
        } else {
            info!(job_id = lease.job_id(), "Training run started");
        }

        let snapshot = lease.start()?;
        sink.send(&StreamPayload::from(snapshot)).await?;

        for step in resume_from..=self.total_steps {
            tokio::select! {
                biased;
                _ = sink.closed() => return Err(StreamError::Disconnected),
                _ = tokio::time::sleep(self.step_interval) => {}
            }

            let update = schedule::step_update(step, self.total_steps, noise.sample());
            let snapshot = lease.apply_step(update)?;
            TRAINING_STEPS_TOTAL.inc();
            debug!(
                job_id = lease.job_id(),
                step,
                progress = snapshot.progress,
                loss = snapshot.loss,
                "Training step"
            );

            sink.send(&StreamPayload::from(snapshot)).await?;
        }

        info!(job_id = lease.job_id(), "Training run completed");
        Ok(StreamOutcome::Completed)
    }
}

/// Report a job that cannot be streamed and close the sink.
async fn reject<S>(job_id: &str, err: JobError, sink: &mut S) -> StreamOutcome
where
    S: ProgressSink + ?Sized,
{
    let outcome = match err {
        JobError::NotFound(_) => StreamOutcome::NotFound,
        _ => StreamOutcome::Rejected,
    };
    warn!(job_id, error = %err, "Refusing progress stream");

    let payload = StreamPayload::from(ErrorPayload::new(err.payload_message(), job_id));
    if let Err(e) = sink.send(&payload).await {
        debug!(job_id, error = %e, "Could not deliver error payload");
    }
    sink.close().await;
    outcome
}
