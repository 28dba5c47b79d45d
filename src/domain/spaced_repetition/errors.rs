//! Scheduler error types.

use thiserror::Error;

/// Errors raised by the spaced-repetition scheduler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    /// Quality rating outside the 0-5 scale.
    #[error("Invalid quality {0}: must be between 0 and 5")]
    InvalidQuality(i32),

    /// Stored review state violates the scheduler's preconditions.
    #[error("Invalid review state: {0}")]
    InvalidState(String),
}
