//! Webhook queue processing configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::webhook::{RetryBackoff, SignatureFailurePolicy, DEFAULT_CLAIM_LEASE};

use super::error::ValidationError;

/// Upper bound for any delay or lease setting: one week.
pub const MAX_DELAY_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Failed attempts allowed before an entry is dead-lettered
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub signature_failure_policy: SignatureFailurePolicy,

    /// Seconds between sweeps of the queue
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Entries examined per sweep
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_backoff_base")]
    pub backoff_base_secs: u64,

    #[serde(default = "default_backoff_max")]
    pub backoff_max_secs: u64,

    /// Seconds a worker's claim holds before the entry can be reclaimed
    #[serde(default = "default_claim_timeout")]
    pub claim_timeout_secs: u64,
}

impl WebhookConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn backoff(&self) -> RetryBackoff {
        RetryBackoff::new(
            Duration::from_secs(self.backoff_base_secs),
            Duration::from_secs(self.backoff_max_secs),
        )
    }

    pub fn claim_lease(&self) -> Duration {
        Duration::from_secs(self.claim_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidWebhookSetting("sweep_interval_secs"));
        }
        if self.batch_size == 0 {
            return Err(ValidationError::InvalidWebhookSetting("batch_size"));
        }
        if self.backoff_base_secs == 0 {
            return Err(ValidationError::InvalidWebhookSetting("backoff_base_secs"));
        }
        if self.backoff_max_secs < self.backoff_base_secs || self.backoff_max_secs > MAX_DELAY_SECS
        {
            return Err(ValidationError::InvalidWebhookSetting("backoff_max_secs"));
        }
        if self.claim_timeout_secs == 0 || self.claim_timeout_secs > MAX_DELAY_SECS {
            return Err(ValidationError::InvalidWebhookSetting("claim_timeout_secs"));
        }
        Ok(())
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            signature_failure_policy: SignatureFailurePolicy::default(),
            sweep_interval_secs: default_sweep_interval(),
            batch_size: default_batch_size(),
            backoff_base_secs: default_backoff_base(),
            backoff_max_secs: default_backoff_max(),
            claim_timeout_secs: default_claim_timeout(),
        }
    }
}

fn default_max_retries() -> u32 {
    5
}

fn default_sweep_interval() -> u64 {
    30
}

fn default_batch_size() -> usize {
    50
}

fn default_backoff_base() -> u64 {
    30
}

fn default_backoff_max() -> u64 {
    3600
}

fn default_claim_timeout() -> u64 {
    DEFAULT_CLAIM_LEASE.as_secs()
}
