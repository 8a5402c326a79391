//! Testing utilities for streaming without a real transport.
//!
//! # Example
//!
//! ```rust,ignore
//! use calaxis_core::testing::RecordingSink;
//!
//! let mut sink = RecordingSink::new().disconnect_after(5);
//! streamer.run(&job_id, &mut sink, &mut FixedNoise(0.0)).await;
//! assert_eq!(sink.payloads().len(), 5);
//! ```

mod recording_sink;

pub use recording_sink::RecordingSink;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::sync::Arc;

    use crate::config::TrainingConfig;
    use crate::job::JobRegistry;
    use crate::training::ProgressStreamer;

    /// Training config that runs `total_steps` steps without waiting between them.
    pub fn instant_training(total_steps: u32) -> TrainingConfig {
        TrainingConfig {
            total_steps,
            step_interval_ms: 0,
            ..Default::default()
        }
    }

    /// A streamer over a fresh registry with no step delay.
    pub fn instant_streamer(total_steps: u32) -> ProgressStreamer {
        ProgressStreamer::new(
            Arc::new(JobRegistry::new()),
            &instant_training(total_steps),
        )
    }
}
