//! Review quality value object (SM-2 0-5 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::SchedulerError;

/// Learner's self-assessed recall quality for a single review.
///
/// 0 is a total blackout, 5 is perfect recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
#[repr(u8)]
pub enum ReviewQuality {
    Blackout = 0,
    Incorrect = 1,
    IncorrectButFamiliar = 2,
    CorrectWithDifficulty = 3,
    CorrectAfterHesitation = 4,
    Perfect = 5,
}

impl ReviewQuality {
    /// All ratings in ascending order.
    pub const ALL: [ReviewQuality; 6] = [
        ReviewQuality::Blackout,
        ReviewQuality::Incorrect,
        ReviewQuality::IncorrectButFamiliar,
        ReviewQuality::CorrectWithDifficulty,
        ReviewQuality::CorrectAfterHesitation,
        ReviewQuality::Perfect,
    ];

    /// Creates a quality from an integer, rejecting anything outside 0..=5.
    pub fn try_from_i32(value: i32) -> Result<Self, SchedulerError> {
        match value {
            0 => Ok(ReviewQuality::Blackout),
            1 => Ok(ReviewQuality::Incorrect),
            2 => Ok(ReviewQuality::IncorrectButFamiliar),
            3 => Ok(ReviewQuality::CorrectWithDifficulty),
            4 => Ok(ReviewQuality::CorrectAfterHesitation),
            5 => Ok(ReviewQuality::Perfect),
            other => Err(SchedulerError::InvalidQuality(other)),
        }
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<i32> for ReviewQuality {
    type Error = SchedulerError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::try_from_i32(value)
    }
}

impl From<ReviewQuality> for i32 {
    fn from(quality: ReviewQuality) -> Self {
        i32::from(quality.value())
    }
}

impl fmt::Display for ReviewQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
