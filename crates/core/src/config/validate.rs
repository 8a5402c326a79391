use super::{types::Config, ConfigError};

/// Upper bound for `jobs.retention_secs` (100 years).
pub const MAX_RETENTION_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Training has at least one step and a finite, non-negative noise band
/// - Job retention stays within [`MAX_RETENTION_SECS`]
/// - CORS origins are well-formed and never wildcarded alongside credentials
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Training validation
    if config.training.total_steps == 0 {
        return Err(ConfigError::ValidationError(
            "training.total_steps must be at least 1".to_string(),
        ));
    }

    let amplitude = config.training.noise_amplitude;
    if !amplitude.is_finite() || amplitude < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "training.noise_amplitude must be a finite non-negative number, got {}",
            amplitude
        )));
    }

    // Jobs validation
    if let Some(retention) = config.jobs.retention_secs {
        if retention > MAX_RETENTION_SECS {
            return Err(ConfigError::ValidationError(format!(
                "jobs.retention_secs cannot exceed {}, got {}",
                MAX_RETENTION_SECS, retention
            )));
        }
    }

    if config.jobs.retention_secs.is_some() && config.jobs.sweep_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "jobs.sweep_interval_secs cannot be 0 when retention is enabled".to_string(),
        ));
    }

    // CORS validation
    for origin in &config.cors.allowed_origins {
        if origin == "*" {
            if config.cors.allow_credentials {
                return Err(ConfigError::ValidationError(
                    "cors.allowed_origins cannot contain \"*\" when allow_credentials is true"
                        .to_string(),
                ));
            }
            continue;
        }

        let well_formed = (origin.starts_with("http://") || origin.starts_with("https://"))
            && origin.chars().all(|c| c.is_ascii_graphic());
        if !well_formed {
            return Err(ConfigError::ValidationError(format!(
                "cors.allowed_origins contains an invalid origin: {:?}",
                origin
            )));
        }
    }

    Ok(())
}
