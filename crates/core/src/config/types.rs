use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8000
}

/// Cross-origin access policy.
///
/// Origins are matched exactly. Methods and headers are mirrored from the
/// preflight request, so only the origin list needs tightening for production.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            allow_credentials: default_allow_credentials(),
        }
    }
}

/// Vite and CRA dev server ports.
fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

fn default_allow_credentials() -> bool {
    true
}

/// Simulated training run parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainingConfig {
    /// Number of progress steps in one run (default: 30)
    #[serde(default = "default_total_steps")]
    pub total_steps: u32,
    /// Delay before each step in milliseconds (default: 2000)
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
    /// Half-width of the uniform loss noise band (default: 0.1)
    #[serde(default = "default_noise_amplitude")]
    pub noise_amplitude: f64,
}

impl TrainingConfig {
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            total_steps: default_total_steps(),
            step_interval_ms: default_step_interval_ms(),
            noise_amplitude: default_noise_amplitude(),
        }
    }
}

fn default_total_steps() -> u32 {
    30
}

fn default_step_interval_ms() -> u64 {
    2000
}

fn default_noise_amplitude() -> f64 {
    0.1
}

/// Job retention configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobsConfig {
    /// Evict completed jobs this many seconds after they finish.
    /// Unset keeps every job for the lifetime of the process.
    #[serde(default)]
    pub retention_secs: Option<u64>,
    /// How often the eviction sweep runs (default: 60)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl JobsConfig {
    pub fn retention(&self) -> Option<Duration> {
        self.retention_secs.map(Duration::from_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            retention_secs: None,
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    60
}
