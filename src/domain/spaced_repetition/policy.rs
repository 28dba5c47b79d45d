//! Scheduling policy - thresholds consumed by the scheduler and mastery rules.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Longest interval any policy may schedule, about a century.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Thresholds that tune pass/fail and mastery classification.
///
/// Passed explicitly into every scheduling call; there is no global instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingPolicy {
    /// Interval (days) a card must reach to count as mastered.
    pub mastery_interval_days: u32,

    /// Consecutive successful recalls required for mastery.
    pub mastery_minimum_repetitions: u32,

    /// Interval (days) from which an unmastered card counts as near mastery.
    pub near_mastery_interval_days: u32,

    /// Lowest quality that counts as a successful recall.
    pub minimum_pass_quality: u8,

    /// Upper bound on any computed interval.
    pub maximum_interval_days: u32,
}

impl SchedulingPolicy {
    /// Low thresholds for demos and manual testing: one passed review masters a card.
    ///
    /// Not suitable for production use.
    pub fn demo() -> Self {
        Self {
            mastery_interval_days: 1,
            mastery_minimum_repetitions: 1,
            near_mastery_interval_days: 1,
            ..Self::default()
        }
    }

    /// Validates threshold consistency.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.minimum_pass_quality == 0 || self.minimum_pass_quality > 5 {
            return Err(ValidationError::out_of_range(
                "minimum_pass_quality",
                1,
                5,
                i64::from(self.minimum_pass_quality),
            ));
        }
        if self.mastery_interval_days == 0 {
            return Err(ValidationError::out_of_range(
                "mastery_interval_days",
                1,
                i64::from(self.maximum_interval_days),
                0,
            ));
        }
        if self.near_mastery_interval_days > self.mastery_interval_days {
            return Err(ValidationError::invalid_format(
                "near_mastery_interval_days",
                "must not exceed mastery_interval_days",
            ));
        }
        if self.maximum_interval_days > MAX_INTERVAL_DAYS {
            return Err(ValidationError::out_of_range(
                "maximum_interval_days",
                i64::from(self.mastery_interval_days),
                i64::from(MAX_INTERVAL_DAYS),
                i64::from(self.maximum_interval_days),
            ));
        }
        if self.maximum_interval_days < self.mastery_interval_days {
            return Err(ValidationError::invalid_format(
                "maximum_interval_days",
                "must be at least mastery_interval_days",
            ));
        }
        Ok(())
    }
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            mastery_interval_days: 21,
            mastery_minimum_repetitions: 4,
            near_mastery_interval_days: 7,
            minimum_pass_quality: 3,
            maximum_interval_days: MAX_INTERVAL_DAYS,
        }
    }
}
