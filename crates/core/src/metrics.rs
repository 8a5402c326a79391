//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Job registry (creation, eviction)
//! - Progress streaming (steps, session outcomes)

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

// =============================================================================
// Job Registry Metrics
// =============================================================================

/// Jobs created total.
pub static JOBS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "calaxis_jobs_created_total",
        "Total training jobs created since startup",
    )
    .unwrap()
});

/// Completed jobs removed by the retention sweep.
pub static JOBS_EVICTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "calaxis_jobs_evicted_total",
        "Total completed jobs evicted by retention",
    )
    .unwrap()
});

// =============================================================================
// Streaming Metrics
// =============================================================================

/// Training steps applied across all jobs.
pub static TRAINING_STEPS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "calaxis_training_steps_total",
        "Total simulated training steps applied",
    )
    .unwrap()
});

/// Streaming sessions by outcome.
pub static STREAMS_FINISHED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "calaxis_streams_finished_total",
            "Progress streaming sessions by outcome",
        ),
        &["outcome"], // "completed", "not_found", "disconnected", ...
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_CREATED_TOTAL.clone()),
        Box::new(JOBS_EVICTED_TOTAL.clone()),
        Box::new(TRAINING_STEPS_TOTAL.clone()),
        Box::new(STREAMS_FINISHED_TOTAL.clone()),
    ]
}
