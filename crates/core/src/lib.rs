pub mod config;
pub mod job;
pub mod metrics;
pub mod testing;
pub mod training;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, CorsConfig, JobsConfig, ServerConfig, TrainingConfig,
};
pub use job::{
    spawn_retention_sweeper, ErrorPayload, Job, JobError, JobLease, JobRegistry, JobSnapshot,
    JobStatus, StepUpdate, StreamPayload,
};
pub use training::{
    FixedNoise, NoiseSource, ProgressSink, ProgressStreamer, SequenceNoise, StreamError,
    StreamOutcome, UniformNoise,
};
