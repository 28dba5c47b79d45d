//! Spaced repetition scheduling configuration

use serde::Deserialize;

use crate::domain::spaced_repetition::SchedulingPolicy;

use super::error::ValidationError;

/// Scheduler thresholds.
///
/// With `demo = true` the low demo thresholds replace the mastery fields;
/// `minimum_pass_quality` and `maximum_interval_days` still apply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpacedRepetitionConfig {
    #[serde(default)]
    pub demo: bool,

    #[serde(default)]
    pub policy: SchedulingPolicy,
}

impl SpacedRepetitionConfig {
    pub fn scheduling_policy(&self) -> SchedulingPolicy {
        if self.demo {
            SchedulingPolicy {
                minimum_pass_quality: self.policy.minimum_pass_quality,
                maximum_interval_days: self.policy.maximum_interval_days,
                ..SchedulingPolicy::demo()
            }
        } else {
            self.policy
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.scheduling_policy()
            .validate()
            .map_err(|e| ValidationError::InvalidSchedulingPolicy(e.to_string()))
    }
}
