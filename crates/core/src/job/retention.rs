//! Periodic eviction of finished jobs.

use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::JobRegistry;
use crate::config::JobsConfig;

/// Spawn the eviction sweep if retention is configured.
///
/// Returns `None` when jobs are kept for the lifetime of the process.
/// The first sweep runs immediately.
pub fn spawn_retention_sweeper(
    registry: Arc<JobRegistry>,
    config: &JobsConfig,
) -> Option<JoinHandle<()>> {
    let retention = config.retention()?;
    let retention = match chrono::Duration::from_std(retention) {
        Ok(retention) => retention,
        Err(e) => {
            warn!(error = %e, "Job retention out of range, eviction disabled");
            return None;
        }
    };
    let sweep_interval = config.sweep_interval();

    info!(
        retention_secs = retention.num_seconds(),
        sweep_interval_secs = sweep_interval.as_secs(),
        "Starting job retention sweeper"
    );

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            match Utc::now().checked_sub_signed(retention) {
                Some(cutoff) => {
                    registry.evict_completed_before(cutoff);
                }
                None => warn!(
                    retention_secs = retention.num_seconds(),
                    "Retention cutoff out of range, skipping sweep"
                ),
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobStatus, StepUpdate};
    use std::time::Duration;

    fn finish(registry: &Arc<JobRegistry>, id: &str) {
        let lease = registry.acquire(id).unwrap();
        lease.start().unwrap();
        lease
            .apply_step(StepUpdate {
                step: 1,
                status: JobStatus::Completed,
                progress: 1.0,
                loss: 0.01,
                log_message: "done".to_string(),
            })
            .unwrap();
    }

    #[test]
    fn test_no_sweeper_without_retention() {
        let registry = Arc::new(JobRegistry::new());
        // No runtime needed: nothing is spawned
        assert!(spawn_retention_sweeper(registry, &JobsConfig::default()).is_none());
    }

    #[tokio::test]
    async fn test_sweeper_evicts_completed_jobs() {
        let registry = Arc::new(JobRegistry::new());
        let done = registry.create().job_id;
        let pending = registry.create().job_id;
        finish(&registry, &done);
        tokio::time::sleep(Duration::from_millis(5)).await;

        let config = JobsConfig {
            retention_secs: Some(0),
            sweep_interval_secs: 60,
        };
        let handle = spawn_retention_sweeper(Arc::clone(&registry), &config).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert!(registry.get(&done).is_err());
        assert!(registry.get(&pending).is_ok());
    }

    #[tokio::test]
    async fn test_sweeper_survives_out_of_range_retention() {
        let registry = Arc::new(JobRegistry::new());
        let done = registry.create().job_id;
        finish(&registry, &done);

        let config = JobsConfig {
            retention_secs: Some(10_000_000_000_000),
            sweep_interval_secs: 60,
        };
        let handle = spawn_retention_sweeper(Arc::clone(&registry), &config).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // First tick ran and skipped instead of panicking
        assert!(!handle.is_finished());
        handle.abort();
        assert!(registry.get(&done).is_ok());
    }

    #[tokio::test]
    async fn test_sweeper_keeps_recent_jobs() {
        let registry = Arc::new(JobRegistry::new());
        let done = registry.create().job_id;
        finish(&registry, &done);

        let config = JobsConfig {
            retention_secs: Some(3600),
            sweep_interval_secs: 60,
        };
        let handle = spawn_retention_sweeper(Arc::clone(&registry), &config).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert!(registry.get(&done).is_ok());
    }
}
