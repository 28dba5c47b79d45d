//! Retry scheduling and signature-failure handling for queue entries.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long a claim protects an entry from other workers.
pub const DEFAULT_CLAIM_LEASE: Duration = Duration::from_secs(300);

/// What to do with a delivery whose signature does not verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureFailurePolicy {
    /// Park the entry immediately, skipping retries.
    #[default]
    DeadLetter,

    /// Count it as an ordinary failure; it dead-letters once retries run out.
    Retry,
}

/// Exponential backoff between retries: `base * 2^(attempt - 1)`, capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBackoff {
    base: Duration,
    max: Duration,
}

impl RetryBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
        }
    }

    /// Delay before the next attempt after `attempt` failures (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base
            .checked_mul(1u32 << exponent)
            .map_or(self.max, |delay| delay.min(self.max))
    }
}

impl Default for RetryBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(30), Duration::from_secs(3600))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_per_attempt() {
        let backoff = RetryBackoff::new(Duration::from_secs(10), Duration::from_secs(1000));
        assert_eq!(backoff.delay_for(1), Duration::from_secs(10));
        assert_eq!(backoff.delay_for(2), Duration::from_secs(20));
        assert_eq!(backoff.delay_for(3), Duration::from_secs(40));
    }

    #[test]
    fn delay_is_capped() {
        let backoff = RetryBackoff::new(Duration::from_secs(10), Duration::from_secs(60));
        assert_eq!(backoff.delay_for(4), Duration::from_secs(60));
        assert_eq!(backoff.delay_for(200), Duration::from_secs(60));
    }

    #[test]
    fn zero_attempt_uses_base() {
        let backoff = RetryBackoff::default();
        assert_eq!(backoff.delay_for(0), Duration::from_secs(30));
    }

    #[test]
    fn signature_policy_defaults_to_dead_letter() {
        assert_eq!(
            SignatureFailurePolicy::default(),
            SignatureFailurePolicy::DeadLetter
        );
        let parsed: SignatureFailurePolicy = serde_json::from_str("\"retry\"").unwrap();
        assert_eq!(parsed, SignatureFailurePolicy::Retry);
    }
}
