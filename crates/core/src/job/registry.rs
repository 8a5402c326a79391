//! In-process job registry.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;

use super::{Job, JobError, JobSnapshot, JobStatus, StepUpdate};
use crate::metrics::{JOBS_CREATED_TOTAL, JOBS_EVICTED_TOTAL};

struct Entry {
    job: Job,
    streaming: bool,
}

/// Owns every job, keyed by identifier.
///
/// Reads return point-in-time snapshots. Mutation only happens through a
/// [`JobLease`], and at most one lease exists per job at any time.
#[derive(Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<String, Entry>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new queued job and return its snapshot.
    pub fn create(&self) -> JobSnapshot {
        let job = Job::new(Uuid::new_v4().to_string());
        let snapshot = job.snapshot();

        self.entries().insert(
            job.id.clone(),
            Entry {
                job,
                streaming: false,
            },
        );
        JOBS_CREATED_TOTAL.inc();
        info!(job_id = %snapshot.job_id, "Training job created");

        snapshot
    }

    /// Get the current snapshot of a job.
    pub fn get(&self, id: &str) -> Result<JobSnapshot, JobError> {
        self.entries()
            .get(id)
            .map(|entry| entry.job.snapshot())
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    /// Take exclusive write access to a job for one streaming session.
    pub fn acquire(self: &Arc<Self>, id: &str) -> Result<JobLease, JobError> {
        let mut entries = self.entries();
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| JobError::NotFound(id.to_string()))?;

        if entry.streaming {
            return Err(JobError::AlreadyStreaming(id.to_string()));
        }
        entry.streaming = true;
        debug!(job_id = %id, "Job lease acquired");

        Ok(JobLease {
            registry: Arc::clone(self),
            job_id: id.to_string(),
        })
    }

    /// Remove completed jobs last updated before `cutoff`.
    ///
    /// Jobs held by a streaming session are never evicted.
    pub fn evict_completed_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| {
            entry.streaming
                || !entry.job.status.is_terminal()
                || entry.job.updated_at >= cutoff
        });
        let evicted = before - entries.len();

        if evicted > 0 {
            JOBS_EVICTED_TOTAL.inc_by(evicted as u64);
            info!(evicted, remaining = entries.len(), "Evicted completed jobs");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Number of jobs in each status.
    pub fn count_by_status(&self) -> HashMap<JobStatus, usize> {
        let mut counts = HashMap::new();
        for entry in self.entries().values() {
            *counts.entry(entry.job.status).or_insert(0) += 1;
        }
        counts
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the job under the registry lock.
    fn with_job<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Job) -> Result<T, JobError>,
    ) -> Result<T, JobError> {
        let mut entries = self.entries();
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| JobError::NotFound(id.to_string()))?;
        f(&mut entry.job)
    }

    fn release(&self, id: &str) {
        if let Some(entry) = self.entries().get_mut(id) {
            entry.streaming = false;
            debug!(job_id = %id, "Job lease released");
        }
    }
}

/// Exclusive write handle to one job.
///
/// The job is released when the lease is dropped, whether the stream
/// finished, disconnected, or failed.
pub struct JobLease {
    registry: Arc<JobRegistry>,
    job_id: String,
}

impl JobLease {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn snapshot(&self) -> Result<JobSnapshot, JobError> {
        self.registry.with_job(&self.job_id, |job| Ok(job.snapshot()))
    }

    pub fn steps_completed(&self) -> Result<u32, JobError> {
        self.registry
            .with_job(&self.job_id, |job| Ok(job.steps_completed))
    }

    /// Move the job to `RUNNING` and return the new snapshot.
    pub fn start(&self) -> Result<JobSnapshot, JobError> {
        self.registry.with_job(&self.job_id, |job| {
            job.start()?;
            Ok(job.snapshot())
        })
    }

    /// Record one training step and return the new snapshot.
    pub fn apply_step(&self, update: StepUpdate) -> Result<JobSnapshot, JobError> {
        self.registry.with_job(&self.job_id, |job| {
            job.apply_step(update)?;
            Ok(job.snapshot())
        })
    }
}

impl Drop for JobLease {
    fn drop(&mut self) {
        self.registry.release(&self.job_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn completed_step(step: u32) -> StepUpdate {
        StepUpdate {
            step,
            status: JobStatus::Completed,
            progress: 1.0,
            loss: 0.05,
            log_message: "done".to_string(),
        }
    }

    #[test]
    fn test_create_returns_queued_snapshot() {
        let registry = JobRegistry::new();
        let snapshot = registry.create();

        assert!(!snapshot.job_id.is_empty());
        assert_eq!(snapshot.status, JobStatus::Queued);
        assert_eq!(snapshot.progress, 0.0);
        assert_eq!(snapshot.loss, 0.0);
        assert!(!snapshot.log_message.is_empty());
    }

    #[test]
    fn test_created_job_is_immediately_visible() {
        let registry = JobRegistry::new();
        let snapshot = registry.create();

        assert_eq!(registry.get(&snapshot.job_id).unwrap(), snapshot);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_create_uses_unique_ids() {
        let registry = JobRegistry::new();
        let a = registry.create();
        let b = registry.create();
        assert_ne!(a.job_id, b.job_id);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_get_unknown_job() {
        let registry = JobRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.get("missing"),
            Err(JobError::NotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_acquire_unknown_job() {
        let registry = Arc::new(JobRegistry::new());
        let err = registry.acquire("missing").err().unwrap();
        assert_eq!(err, JobError::NotFound("missing".to_string()));
    }

    #[test]
    fn test_second_lease_is_rejected_until_release() {
        let registry = Arc::new(JobRegistry::new());
        let id = registry.create().job_id;

        let lease = registry.acquire(&id).unwrap();
        assert!(matches!(
            registry.acquire(&id),
            Err(JobError::AlreadyStreaming(_))
        ));

        drop(lease);
        assert!(registry.acquire(&id).is_ok());
    }

    #[test]
    fn test_lease_mutations_are_visible_to_readers() {
        let registry = Arc::new(JobRegistry::new());
        let id = registry.create().job_id;
        let lease = registry.acquire(&id).unwrap();

        let started = lease.start().unwrap();
        assert_eq!(started.status, JobStatus::Running);
        assert_eq!(registry.get(&id).unwrap(), started);

        let finished = lease.apply_step(completed_step(30)).unwrap();
        assert_eq!(finished.status, JobStatus::Completed);
        assert_eq!(lease.steps_completed().unwrap(), 30);
        assert_eq!(registry.get(&id).unwrap().progress, 1.0);
    }

    #[test]
    fn test_count_by_status() {
        let registry = Arc::new(JobRegistry::new());
        registry.create();
        let id = registry.create().job_id;
        registry.acquire(&id).unwrap().start().unwrap();

        let counts = registry.count_by_status();
        assert_eq!(counts.get(&JobStatus::Queued), Some(&1));
        assert_eq!(counts.get(&JobStatus::Running), Some(&1));
        assert_eq!(counts.get(&JobStatus::Completed), None);
    }

    #[test]
    fn test_evict_only_completed_jobs() {
        let registry = Arc::new(JobRegistry::new());
        let queued = registry.create().job_id;
        let running = registry.create().job_id;
        let completed = registry.create().job_id;

        registry.acquire(&running).unwrap().start().unwrap();
        {
            let lease = registry.acquire(&completed).unwrap();
            lease.start().unwrap();
            lease.apply_step(completed_step(30)).unwrap();
        }

        let evicted = registry.evict_completed_before(Utc::now() + Duration::seconds(1));
        assert_eq!(evicted, 1);
        assert!(registry.get(&completed).is_err());
        assert!(registry.get(&queued).is_ok());
        assert!(registry.get(&running).is_ok());
    }

    #[test]
    fn test_evict_respects_cutoff_and_active_leases() {
        let registry = Arc::new(JobRegistry::new());
        let id = registry.create().job_id;
        let lease = registry.acquire(&id).unwrap();
        lease.start().unwrap();
        lease.apply_step(completed_step(30)).unwrap();

        // Still leased
        assert_eq!(
            registry.evict_completed_before(Utc::now() + Duration::seconds(1)),
            0
        );
        drop(lease);

        // Finished after the cutoff
        assert_eq!(
            registry.evict_completed_before(Utc::now() - Duration::hours(1)),
            0
        );
        assert_eq!(
            registry.evict_completed_before(Utc::now() + Duration::seconds(1)),
            1
        );
        assert!(registry.is_empty());
    }
}
