use std::sync::Arc;

use calaxis_core::{Config, JobRegistry, ProgressStreamer};

/// Shared application state
pub struct AppState {
    config: Config,
    registry: Arc<JobRegistry>,
    streamer: ProgressStreamer,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_registry(config, Arc::new(JobRegistry::new()))
    }

    /// Build state around an existing registry (shared with background tasks or tests).
    pub fn with_registry(config: Config, registry: Arc<JobRegistry>) -> Self {
        let streamer = ProgressStreamer::new(Arc::clone(&registry), &config.training);
        Self {
            config,
            registry,
            streamer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn streamer(&self) -> &ProgressStreamer {
        &self.streamer
    }
}
