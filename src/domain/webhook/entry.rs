//! Payment webhook queue entry.
//!
//! One entry per inbound delivery. Entries are persisted before any
//! processing happens and are never deleted.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::foundation::{StateMachine, Timestamp, WebhookEntryId};
use crate::domain::payment::PaymentGateway;

use super::{RetryBackoff, WebhookError, WebhookQueueStatus};

/// Default retry budget for a delivery.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Queued webhook delivery.
///
/// # Invariants
///
/// - A `Failed` entry always has `retry_count <= max_retries`
/// - Once `retry_count > max_retries` the entry is `DeadLetter`
/// - `processed_at` is set only on `Processed`
/// - A `Processing` entry's `next_attempt_at` is the end of its claim lease
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentWebhookEntry {
    pub id: WebhookEntryId,
    pub gateway: PaymentGateway,

    /// Raw body exactly as received.
    pub payload: String,

    /// Signature supplied outside the body, if any.
    pub signature: Option<String>,

    pub status: WebhookQueueStatus,

    /// Failures recorded so far.
    pub retry_count: u32,
    pub max_retries: u32,

    pub last_error: Option<String>,
    pub received_at: Timestamp,
    pub processed_at: Option<Timestamp>,

    /// Earliest time the sweeper may pick this entry up again. While
    /// `Processing` this is when the claim lease runs out.
    pub next_attempt_at: Timestamp,

    pub updated_at: Timestamp,

    /// Concurrency token, bumped by the repository on every update.
    pub version: i64,
}

impl PaymentWebhookEntry {
    /// Creates a pending entry for a fresh delivery.
    pub fn receive(
        payload: impl Into<String>,
        signature: Option<String>,
        max_retries: u32,
        now: Timestamp,
    ) -> Self {
        Self {
            id: WebhookEntryId::new(),
            gateway: PaymentGateway::PayOs,
            payload: payload.into(),
            signature: signature.filter(|s| !s.trim().is_empty()),
            status: WebhookQueueStatus::Pending,
            retry_count: 0,
            max_retries,
            last_error: None,
            received_at: now,
            processed_at: None,
            next_attempt_at: now,
            updated_at: now,
            version: 1,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// True when the retry budget is used up.
    pub fn retries_exhausted(&self) -> bool {
        self.retry_count > self.max_retries
    }

    /// True when a sweep should attempt this entry at `now`.
    ///
    /// Covers `Pending` and `Failed` entries whose backoff has elapsed, and
    /// `Processing` entries whose claim lease has run out.
    pub fn is_due(&self, now: Timestamp) -> bool {
        let eligible = self.status.is_claimable() || self.status == WebhookQueueStatus::Processing;
        eligible && !self.next_attempt_at.is_after(&now)
    }

    /// True when another worker holds an unexpired claim.
    pub fn is_claim_held(&self, now: Timestamp) -> bool {
        self.status == WebhookQueueStatus::Processing && self.next_attempt_at.is_after(&now)
    }

    /// Claims the entry for processing until `now + lease`.
    ///
    /// A `Processing` entry whose lease expired is reclaimed; the abandoned
    /// attempt counts as a failure.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if the entry is terminal or its claim is still held
    /// - `MaxRetriesExceeded` if no retries are left; the entry is unchanged
    ///   apart from the counted abandoned attempt and should be parked with
    ///   [`abandon`](Self::abandon)
    pub fn begin_processing(&mut self, now: Timestamp, lease: Duration) -> Result<(), WebhookError> {
        if self.status == WebhookQueueStatus::Processing {
            if self.is_claim_held(now) {
                return Err(WebhookError::InvalidTransition(format!(
                    "Webhook entry {} is claimed until {}",
                    self.id,
                    self.next_attempt_at.as_datetime()
                )));
            }
            self.retry_count = self.retry_count.saturating_add(1);
            self.last_error = Some("processing lease expired before an outcome was recorded".into());
            if self.retries_exhausted() {
                return Err(WebhookError::MaxRetriesExceeded {
                    attempts: self.retry_count,
                });
            }
        } else {
            if self.status == WebhookQueueStatus::Failed && self.retries_exhausted() {
                return Err(WebhookError::MaxRetriesExceeded {
                    attempts: self.retry_count,
                });
            }
            self.transition_to(WebhookQueueStatus::Processing)?;
        }
        self.updated_at = now;
        self.next_attempt_at = now.plus_secs(lease.as_secs());
        Ok(())
    }

    /// Records a successful application.
    pub fn mark_processed(&mut self, now: Timestamp) -> Result<(), WebhookError> {
        self.transition_to(WebhookQueueStatus::Processed)?;
        self.last_error = None;
        self.processed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Records a failed attempt and schedules the next one.
    ///
    /// Returns the resulting status: `Failed` while retries remain,
    /// otherwise `DeadLetter`.
    pub fn record_failure(
        &mut self,
        error: impl Into<String>,
        backoff: &RetryBackoff,
        now: Timestamp,
    ) -> Result<WebhookQueueStatus, WebhookError> {
        self.retry_count = self.retry_count.saturating_add(1);
        self.last_error = Some(error.into());
        self.updated_at = now;

        if self.retries_exhausted() {
            self.transition_to(WebhookQueueStatus::DeadLetter)?;
        } else {
            self.transition_to(WebhookQueueStatus::Failed)?;
            let delay = backoff.delay_for(self.retry_count);
            self.next_attempt_at = now.plus_secs(delay.as_secs());
        }
        Ok(self.status)
    }

    /// Parks the entry without consuming further retries.
    pub fn dead_letter(
        &mut self,
        error: impl Into<String>,
        now: Timestamp,
    ) -> Result<(), WebhookError> {
        self.retry_count = self.retry_count.saturating_add(1);
        self.last_error = Some(error.into());
        self.transition_to(WebhookQueueStatus::DeadLetter)?;
        self.updated_at = now;
        Ok(())
    }

    /// Parks an entry whose retry budget is already spent, without
    /// counting another attempt.
    pub fn abandon(&mut self, error: impl Into<String>, now: Timestamp) -> Result<(), WebhookError> {
        self.last_error = Some(error.into());
        self.transition_to(WebhookQueueStatus::DeadLetter)?;
        self.updated_at = now;
        Ok(())
    }

    fn transition_to(&mut self, target: WebhookQueueStatus) -> Result<(), WebhookError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            WebhookError::InvalidTransition(format!(
                "Cannot transition webhook entry from {:?} to {:?}",
                self.status, target
            ))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry(max_retries: u32) -> PaymentWebhookEntry {
        PaymentWebhookEntry::receive("{}", None, max_retries, Timestamp::now())
    }

    const LEASE: Duration = Duration::from_secs(300);

    fn backoff() -> RetryBackoff {
        RetryBackoff::new(Duration::from_secs(10), Duration::from_secs(600))
    }

    #[test]
    fn receive_starts_pending_and_due() {
        let entry = entry(DEFAULT_MAX_RETRIES);
        assert_eq!(entry.status, WebhookQueueStatus::Pending);
        assert_eq!(entry.retry_count, 0);
        assert!(entry.is_due(entry.received_at));
    }

    #[test]
    fn blank_header_signature_is_dropped() {
        let entry = PaymentWebhookEntry::receive("{}", Some("  ".into()), 5, Timestamp::now());
        assert!(entry.signature.is_none());
    }

    #[test]
    fn successful_processing() {
        let mut entry = entry(5);
        let now = Timestamp::now();

        entry.begin_processing(now, LEASE).unwrap();
        entry.mark_processed(now).unwrap();

        assert_eq!(entry.status, WebhookQueueStatus::Processed);
        assert_eq!(entry.processed_at, Some(now));
        assert!(entry.is_terminal());
    }

    #[test]
    fn failure_schedules_backoff() {
        let mut entry = entry(5);
        let now = entry.received_at;

        entry.begin_processing(now, LEASE).unwrap();
        let status = entry.record_failure("db down", &backoff(), now).unwrap();

        assert_eq!(status, WebhookQueueStatus::Failed);
        assert_eq!(entry.retry_count, 1);
        assert_eq!(entry.last_error.as_deref(), Some("db down"));
        assert_eq!(entry.next_attempt_at, now.plus_secs(10));
        assert!(!entry.is_due(now));
        assert!(entry.is_due(now.plus_secs(10)));
    }

    #[test]
    fn dead_letters_after_max_retries_plus_one_failures() {
        let max_retries = 3;
        let mut entry = entry(max_retries);
        let now = Timestamp::now();

        for attempt in 1..=max_retries {
            entry.begin_processing(now, LEASE).unwrap();
            let status = entry.record_failure("boom", &backoff(), now).unwrap();
            assert_eq!(status, WebhookQueueStatus::Failed, "attempt {}", attempt);
        }

        entry.begin_processing(now, LEASE).unwrap();
        let status = entry.record_failure("boom", &backoff(), now).unwrap();

        assert_eq!(status, WebhookQueueStatus::DeadLetter);
        assert_eq!(entry.retry_count, max_retries + 1);
        assert!(entry.is_terminal());
        assert!(!entry.is_due(now.plus_secs(100_000)));
    }

    #[test]
    fn dead_letter_entry_cannot_be_claimed() {
        let mut entry = entry(0);
        let now = Timestamp::now();
        entry.begin_processing(now, LEASE).unwrap();
        entry.record_failure("boom", &backoff(), now).unwrap();

        let result = entry.begin_processing(now, LEASE);
        assert!(matches!(result, Err(WebhookError::InvalidTransition(_))));
    }

    #[test]
    fn processed_entry_cannot_be_claimed_again() {
        let mut entry = entry(5);
        let now = Timestamp::now();
        entry.begin_processing(now, LEASE).unwrap();
        entry.mark_processed(now).unwrap();

        assert!(entry.begin_processing(now, LEASE).is_err());
    }

    #[test]
    fn exhausted_failed_entry_reports_max_retries() {
        let mut entry = entry(2);
        entry.status = WebhookQueueStatus::Failed;
        entry.retry_count = 3;

        let result = entry.begin_processing(Timestamp::now(), LEASE);
        assert_eq!(result, Err(WebhookError::MaxRetriesExceeded { attempts: 3 }));
    }

    #[test]
    fn immediate_dead_letter() {
        let mut entry = entry(5);
        let now = Timestamp::now();
        entry.begin_processing(now, LEASE).unwrap();
        entry.dead_letter("Invalid signature", now).unwrap();

        assert_eq!(entry.status, WebhookQueueStatus::DeadLetter);
        assert_eq!(entry.retry_count, 1);
    }

    #[test]
    fn claim_sets_lease_and_hides_entry_until_it_expires() {
        let mut entry = entry(5);
        let now = entry.received_at;

        entry.begin_processing(now, LEASE).unwrap();

        assert_eq!(entry.next_attempt_at, now.plus_secs(300));
        assert!(entry.is_claim_held(now.plus_secs(299)));
        assert!(!entry.is_due(now.plus_secs(299)));
        assert!(entry.is_due(now.plus_secs(300)));
    }

    #[test]
    fn held_claim_cannot_be_taken() {
        let mut entry = entry(5);
        let now = entry.received_at;
        entry.begin_processing(now, LEASE).unwrap();

        let result = entry.begin_processing(now.plus_secs(10), LEASE);

        assert!(matches!(result, Err(WebhookError::InvalidTransition(_))));
        assert_eq!(entry.retry_count, 0);
    }

    #[test]
    fn expired_claim_is_reclaimed_as_failed_attempt() {
        let mut entry = entry(5);
        let now = entry.received_at;
        entry.begin_processing(now, LEASE).unwrap();

        let later = now.plus_secs(301);
        entry.begin_processing(later, LEASE).unwrap();

        assert_eq!(entry.status, WebhookQueueStatus::Processing);
        assert_eq!(entry.retry_count, 1);
        assert!(entry.last_error.is_some());
        assert_eq!(entry.next_attempt_at, later.plus_secs(300));
    }

    #[test]
    fn expired_claim_without_retries_left_must_be_abandoned() {
        let mut entry = entry(0);
        let now = entry.received_at;
        entry.begin_processing(now, LEASE).unwrap();

        let later = now.plus_secs(301);
        let result = entry.begin_processing(later, LEASE);
        assert_eq!(result, Err(WebhookError::MaxRetriesExceeded { attempts: 1 }));

        entry.abandon("retries exhausted", later).unwrap();
        assert_eq!(entry.status, WebhookQueueStatus::DeadLetter);
        assert_eq!(entry.retry_count, 1);
    }
}
