//! Pure step arithmetic for the simulated run.

use crate::job::{JobStatus, StepUpdate};

/// Loss never drops below this floor.
pub const MIN_LOSS: f64 = 0.01;

/// Loss at the start of a run, before noise.
pub const INITIAL_LOSS: f64 = 2.5;

pub const COMPLETION_MESSAGE: &str =
    "Training completed successfully! Model ready for deployment.";

/// Fraction of the run completed after `step`.
pub fn progress_for(step: u32, total_steps: u32) -> f64 {
    f64::from(step) / f64::from(total_steps)
}

pub fn loss_for(progress: f64, noise: f64) -> f64 {
    (INITIAL_LOSS * (1.0 - progress) + noise).max(MIN_LOSS)
}

/// Phase description for a step. The epoch denominator is always 30.
pub fn log_message_for(step: u32, progress: f64) -> String {
    let phase = if progress < 0.25 {
        "Loading BFSI training data..."
    } else if progress < 0.5 {
        "Training on financial documents..."
    } else if progress < 0.75 {
        "Fine-tuning Module 5 parameters..."
    } else {
        "Validating model performance..."
    };
    format!("Epoch {}/30 - {}", step, phase)
}

/// Field values for `step` of a `total_steps` run.
pub fn step_update(step: u32, total_steps: u32, noise: f64) -> StepUpdate {
    let progress = progress_for(step, total_steps);
    let loss = loss_for(progress, noise);

    if progress >= 1.0 {
        StepUpdate {
            step,
            status: JobStatus::Completed,
            progress: 1.0,
            loss,
            log_message: COMPLETION_MESSAGE.to_string(),
        }
    } else {
        StepUpdate {
            step,
            status: JobStatus::Running,
            progress,
            loss,
            log_message: log_message_for(step, progress),
        }
    }
}
