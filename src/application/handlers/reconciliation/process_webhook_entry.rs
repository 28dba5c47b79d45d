//! ProcessWebhookEntryHandler - applies one queued delivery at most once.
//!
//! ## Flow
//!
//! 1. Claim the entry (`Pending`/`Failed` -> `Processing`) under its version,
//!    leasing it until `now + claim_lease`
//! 2. Verify the signature and parse the PayOS body
//! 3. Settle or fail the payment the body refers to
//! 4. Write the outcome: `Processed`, `Failed` with backoff, or `DeadLetter`
//!
//! ## Race Condition Handling
//!
//! Two workers claiming the same entry both write `Processing` against the
//! version they read. The loser gets a concurrency conflict and reports
//! `AlreadyClaimed` without touching the payment.
//!
//! A worker that dies or fails to write its outcome leaves the entry in
//! `Processing`. Once the lease runs out the entry is due again; the next
//! claim counts the abandoned attempt against the retry budget. Settlement
//! is idempotent, so a reclaimed entry whose payment already completed
//! finishes as a duplicate delivery.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::domain::foundation::{Timestamp, WebhookEntryId};
use crate::domain::webhook::{
    PayOsSignatureVerifier, PaymentWebhookEntry, RetryBackoff, SignatureFailurePolicy,
    WebhookError, WebhookQueueStatus, DEFAULT_CLAIM_LEASE,
};
use crate::ports::WebhookQueueRepository;

use super::settlement::{ConfirmedPayment, PaymentSettlement, SettlementOutcome};

/// Result of a processing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Delivery applied to its payment.
    Processed,
    /// Payment was already Completed; nothing reapplied.
    DuplicateDelivery,
    /// Attempt failed; entry will be retried.
    RetryScheduled {
        retry_count: u32,
        next_attempt_at: Timestamp,
    },
    /// Entry parked for an operator.
    DeadLettered { retry_count: u32, reason: String },
    /// Another worker holds the entry.
    AlreadyClaimed,
    /// Entry already reached a terminal status.
    AlreadyTerminal(WebhookQueueStatus),
}

impl ProcessOutcome {
    /// True when the delivery is fully handled.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ProcessOutcome::Processed | ProcessOutcome::DuplicateDelivery
        )
    }
}

pub struct ProcessWebhookEntryHandler {
    queue: Arc<dyn WebhookQueueRepository>,
    settlement: Arc<PaymentSettlement>,
    verifier: PayOsSignatureVerifier,
    backoff: RetryBackoff,
    signature_policy: SignatureFailurePolicy,
    claim_lease: Duration,
}

impl ProcessWebhookEntryHandler {
    pub fn new(
        queue: Arc<dyn WebhookQueueRepository>,
        settlement: Arc<PaymentSettlement>,
        verifier: PayOsSignatureVerifier,
        backoff: RetryBackoff,
        signature_policy: SignatureFailurePolicy,
    ) -> Self {
        Self {
            queue,
            settlement,
            verifier,
            backoff,
            signature_policy,
            claim_lease: DEFAULT_CLAIM_LEASE,
        }
    }

    /// How long a claim keeps other workers away from an entry.
    pub fn with_claim_lease(mut self, lease: Duration) -> Self {
        self.claim_lease = lease;
        self
    }

    /// Loads an entry by id and processes it.
    pub async fn handle(&self, id: &WebhookEntryId) -> Result<ProcessOutcome, WebhookError> {
        let entry = self
            .queue
            .find_by_id(id)
            .await?
            .ok_or_else(|| WebhookError::EntryNotFound(id.to_string()))?;
        self.process(entry).await
    }

    /// Processes an entry that was already loaded.
    ///
    /// Errors are only returned for storage failures while claiming or
    /// writing the outcome; processing failures become a `RetryScheduled`
    /// or `DeadLettered` outcome. After a failed outcome write the entry
    /// stays claimed until its lease expires.
    pub async fn process(
        &self,
        mut entry: PaymentWebhookEntry,
    ) -> Result<ProcessOutcome, WebhookError> {
        if entry.is_terminal() {
            return Ok(ProcessOutcome::AlreadyTerminal(entry.status));
        }
        let now = Timestamp::now();
        if entry.is_claim_held(now) {
            return Ok(ProcessOutcome::AlreadyClaimed);
        }
        let reclaiming = entry.status == WebhookQueueStatus::Processing;

        match entry.begin_processing(now, self.claim_lease) {
            Ok(()) if reclaiming => warn!(
                entry_id = %entry.id,
                retry_count = entry.retry_count,
                "Reclaiming webhook entry whose processing lease expired"
            ),
            Ok(()) => {}
            Err(WebhookError::MaxRetriesExceeded { attempts }) => {
                let reason = WebhookError::MaxRetriesExceeded { attempts }.to_string();
                entry.abandon(reason.clone(), now)?;
                error!(
                    entry_id = %entry.id,
                    retry_count = attempts,
                    max_retries = entry.max_retries,
                    "Webhook entry dead-lettered, no retries left to claim it"
                );
                return self
                    .write_outcome(
                        entry,
                        ProcessOutcome::DeadLettered {
                            retry_count: attempts,
                            reason,
                        },
                    )
                    .await;
            }
            Err(e) => return Err(e),
        }

        match self.queue.update(&entry).await {
            Ok(version) => entry.version = version,
            Err(e) if e.is_conflict() => {
                debug!(entry_id = %entry.id, "Webhook entry claimed by another worker");
                return Ok(ProcessOutcome::AlreadyClaimed);
            }
            Err(e) => return Err(e.into()),
        }

        let result = self.apply(&entry).await;
        let now = Timestamp::now();

        let outcome = match result {
            Ok(outcome) => {
                entry.mark_processed(now)?;
                info!(
                    entry_id = %entry.id,
                    outcome = ?outcome,
                    "Webhook entry processed"
                );
                outcome
            }
            Err(WebhookError::SignatureInvalid)
                if self.signature_policy == SignatureFailurePolicy::DeadLetter =>
            {
                let reason = WebhookError::SignatureInvalid.to_string();
                entry.dead_letter(reason.clone(), now)?;
                warn!(
                    entry_id = %entry.id,
                    "Webhook signature invalid, dead-lettering without retry"
                );
                ProcessOutcome::DeadLettered {
                    retry_count: entry.retry_count,
                    reason,
                }
            }
            Err(err) => self.record_failure(&mut entry, &err, now)?,
        };

        self.write_outcome(entry, outcome).await
    }

    async fn apply(&self, entry: &PaymentWebhookEntry) -> Result<ProcessOutcome, WebhookError> {
        let webhook = self
            .verifier
            .verify_and_parse(entry.payload.as_bytes(), entry.signature.as_deref())?;

        let settlement = if webhook.is_paid() {
            self.settlement
                .settle_paid(ConfirmedPayment {
                    order_code: webhook.order_code(),
                    amount: webhook.data.amount,
                    reference: webhook.data.reference.clone(),
                })
                .await?
        } else {
            self.settlement
                .mark_failed(webhook.order_code(), webhook.failure_reason())
                .await?
        };

        Ok(match settlement {
            SettlementOutcome::AlreadyCompleted => ProcessOutcome::DuplicateDelivery,
            SettlementOutcome::Completed
            | SettlementOutcome::MarkedFailed
            | SettlementOutcome::AlreadyFailed => ProcessOutcome::Processed,
        })
    }

    fn record_failure(
        &self,
        entry: &mut PaymentWebhookEntry,
        err: &WebhookError,
        now: Timestamp,
    ) -> Result<ProcessOutcome, WebhookError> {
        let status = entry.record_failure(err.to_string(), &self.backoff, now)?;

        if status == WebhookQueueStatus::DeadLetter {
            error!(
                entry_id = %entry.id,
                retry_count = entry.retry_count,
                max_retries = entry.max_retries,
                error = %err,
                "Webhook entry dead-lettered after exhausting retries"
            );
            return Ok(ProcessOutcome::DeadLettered {
                retry_count: entry.retry_count,
                reason: err.to_string(),
            });
        }

        warn!(
            entry_id = %entry.id,
            retry_count = entry.retry_count,
            retryable = err.is_retryable(),
            error = %err,
            "Webhook processing failed, retry scheduled"
        );
        Ok(ProcessOutcome::RetryScheduled {
            retry_count: entry.retry_count,
            next_attempt_at: entry.next_attempt_at,
        })
    }

    async fn write_outcome(
        &self,
        entry: PaymentWebhookEntry,
        outcome: ProcessOutcome,
    ) -> Result<ProcessOutcome, WebhookError> {
        self.queue.update(&entry).await?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryPaymentRepository, InMemoryWebhookQueueRepository, RecordingPostPaymentStrategy,
    };
    use crate::domain::foundation::{PaymentId, ProductId, UserId};
    use crate::domain::foundation::DomainError;
    use crate::domain::payment::{Payment, PaymentStatus, ProductType};
    use crate::ports::{PaymentRepository, PostPaymentStrategyRegistry};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const KEY: &str = "checksum-key";
    const ORDER: i64 = 9001;
    const AMOUNT: i64 = 250_000;

    // ══════════════════════════════════════════════════════════════
    // Test Infrastructure
    // ══════════════════════════════════════════════════════════════

    struct Harness {
        handler: ProcessWebhookEntryHandler,
        queue: Arc<InMemoryWebhookQueueRepository>,
        payments: Arc<InMemoryPaymentRepository>,
        strategy: Arc<RecordingPostPaymentStrategy>,
        settlement: Arc<PaymentSettlement>,
    }

    impl Harness {
        /// A second handler over the same payments, writing through `queue`.
        fn handler_over(
            &self,
            queue: Arc<dyn WebhookQueueRepository>,
        ) -> ProcessWebhookEntryHandler {
            ProcessWebhookEntryHandler::new(
                queue,
                self.settlement.clone(),
                PayOsSignatureVerifier::new(KEY),
                RetryBackoff::new(Duration::from_secs(1), Duration::from_secs(8)),
                SignatureFailurePolicy::DeadLetter,
            )
        }
    }

    /// Queue whose `update` call number `fail_on` (1-based) loses its
    /// connection. Every other call reaches the in-memory queue.
    struct FlakyQueue {
        inner: Arc<InMemoryWebhookQueueRepository>,
        updates: AtomicUsize,
        fail_on: usize,
    }

    impl FlakyQueue {
        fn failing_update(inner: Arc<InMemoryWebhookQueueRepository>, fail_on: usize) -> Self {
            Self {
                inner,
                updates: AtomicUsize::new(0),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl WebhookQueueRepository for FlakyQueue {
        async fn insert(&self, entry: &PaymentWebhookEntry) -> Result<(), DomainError> {
            self.inner.insert(entry).await
        }

        async fn update(&self, entry: &PaymentWebhookEntry) -> Result<i64, DomainError> {
            if self.updates.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
                return Err(DomainError::database("connection reset"));
            }
            self.inner.update(entry).await
        }

        async fn find_by_id(
            &self,
            id: &WebhookEntryId,
        ) -> Result<Option<PaymentWebhookEntry>, DomainError> {
            self.inner.find_by_id(id).await
        }

        async fn list_due(
            &self,
            now: Timestamp,
            limit: usize,
        ) -> Result<Vec<PaymentWebhookEntry>, DomainError> {
            self.inner.list_due(now, limit).await
        }

        async fn list_by_status(
            &self,
            status: WebhookQueueStatus,
            limit: usize,
        ) -> Result<Vec<PaymentWebhookEntry>, DomainError> {
            self.inner.list_by_status(status, limit).await
        }
    }

    async fn harness(
        strategy: RecordingPostPaymentStrategy,
        policy: SignatureFailurePolicy,
    ) -> Harness {
        let payment = Payment::create(
            PaymentId::new(),
            ORDER,
            UserId::new("learner-1").unwrap(),
            ProductId::new(),
            ProductType::Course,
            AMOUNT,
            Timestamp::now(),
        )
        .unwrap();

        let queue = Arc::new(InMemoryWebhookQueueRepository::new());
        let payments = Arc::new(InMemoryPaymentRepository::with_payments([payment]).await);
        let strategy = Arc::new(strategy);
        let registry = PostPaymentStrategyRegistry::new().register(strategy.clone());
        let settlement = Arc::new(PaymentSettlement::new(payments.clone(), Arc::new(registry)));

        let handler = ProcessWebhookEntryHandler::new(
            queue.clone(),
            settlement.clone(),
            PayOsSignatureVerifier::new(KEY),
            RetryBackoff::new(Duration::from_secs(1), Duration::from_secs(8)),
            policy,
        );

        Harness {
            handler,
            queue,
            payments,
            strategy,
            settlement,
        }
    }

    fn body(code: &str, amount: i64, key: &str) -> String {
        let desc = if code == "00" { "success" } else { "cancelled" };
        let data = json!({
            "orderCode": ORDER,
            "amount": amount,
            "description": "LINGO",
            "reference": "FT777",
            "code": code,
            "desc": desc
        });
        let signature = PayOsSignatureVerifier::new(key).sign(&data).unwrap();
        json!({
            "code": "00",
            "desc": "success",
            "success": code == "00",
            "data": data,
            "signature": signature
        })
        .to_string()
    }

    async fn enqueue(h: &Harness, payload: String, max_retries: u32) -> PaymentWebhookEntry {
        let entry = PaymentWebhookEntry::receive(payload, None, max_retries, Timestamp::now());
        h.queue.insert(&entry).await.unwrap();
        entry
    }

    async fn payment_status(h: &Harness) -> PaymentStatus {
        h.payments
            .find_by_order_code(ORDER)
            .await
            .unwrap()
            .unwrap()
            .status
    }

    async fn stored(h: &Harness, id: &WebhookEntryId) -> PaymentWebhookEntry {
        h.queue.find_by_id(id).await.unwrap().unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Happy Path
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn paid_webhook_completes_payment() {
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course),
            SignatureFailurePolicy::DeadLetter,
        )
        .await;
        let entry = enqueue(&h, body("00", AMOUNT, KEY), 5).await;

        let outcome = h.handler.handle(&entry.id).await.unwrap();

        assert_eq!(outcome, ProcessOutcome::Processed);
        assert_eq!(payment_status(&h).await, PaymentStatus::Completed);
        assert_eq!(h.strategy.fulfilled().await.len(), 1);

        let stored = stored(&h, &entry.id).await;
        assert_eq!(stored.status, WebhookQueueStatus::Processed);
        assert!(stored.processed_at.is_some());
    }

    #[tokio::test]
    async fn cancelled_webhook_fails_payment() {
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course),
            SignatureFailurePolicy::DeadLetter,
        )
        .await;
        let entry = enqueue(&h, body("01", AMOUNT, KEY), 5).await;

        let outcome = h.handler.handle(&entry.id).await.unwrap();

        assert_eq!(outcome, ProcessOutcome::Processed);
        assert_eq!(payment_status(&h).await, PaymentStatus::Failed);
        assert!(h.strategy.fulfilled().await.is_empty());
    }

    // ══════════════════════════════════════════════════════════════
    // Idempotency
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn duplicate_delivery_is_reported_as_success() {
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course),
            SignatureFailurePolicy::DeadLetter,
        )
        .await;
        let first = enqueue(&h, body("00", AMOUNT, KEY), 5).await;
        let second = enqueue(&h, body("00", AMOUNT, KEY), 5).await;

        let first_outcome = h.handler.handle(&first.id).await.unwrap();
        let second_outcome = h.handler.handle(&second.id).await.unwrap();

        assert_eq!(first_outcome, ProcessOutcome::Processed);
        assert_eq!(second_outcome, ProcessOutcome::DuplicateDelivery);
        assert!(second_outcome.is_success());
        assert_eq!(h.strategy.fulfilled().await.len(), 1);
        assert_eq!(
            stored(&h, &second.id).await.status,
            WebhookQueueStatus::Processed
        );
    }

    #[tokio::test]
    async fn reprocessing_a_processed_entry_is_a_no_op() {
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course),
            SignatureFailurePolicy::DeadLetter,
        )
        .await;
        let entry = enqueue(&h, body("00", AMOUNT, KEY), 5).await;

        h.handler.handle(&entry.id).await.unwrap();
        let again = h.handler.handle(&entry.id).await.unwrap();

        assert_eq!(
            again,
            ProcessOutcome::AlreadyTerminal(WebhookQueueStatus::Processed)
        );
        assert_eq!(h.strategy.fulfilled().await.len(), 1);
    }

    #[tokio::test]
    async fn stale_copy_loses_the_claim() {
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course),
            SignatureFailurePolicy::DeadLetter,
        )
        .await;
        let entry = enqueue(&h, body("00", AMOUNT, KEY), 5).await;
        let stale = entry.clone();

        h.handler.process(entry).await.unwrap();
        let outcome = h.handler.process(stale).await.unwrap();

        assert_eq!(outcome, ProcessOutcome::AlreadyClaimed);
        assert_eq!(h.strategy.fulfilled().await.len(), 1);
    }

    #[tokio::test]
    async fn processing_entry_with_live_lease_is_left_alone() {
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course),
            SignatureFailurePolicy::DeadLetter,
        )
        .await;
        let mut entry = enqueue(&h, body("00", AMOUNT, KEY), 5).await;
        entry.begin_processing(Timestamp::now(), DEFAULT_CLAIM_LEASE).unwrap();
        entry.version = h.queue.update(&entry).await.unwrap();

        let outcome = h.handler.process(entry.clone()).await.unwrap();

        assert_eq!(outcome, ProcessOutcome::AlreadyClaimed);
        assert_eq!(payment_status(&h).await, PaymentStatus::Pending);
        assert_eq!(stored(&h, &entry.id).await.retry_count, 0);
    }

    // ══════════════════════════════════════════════════════════════
    // Claim Leases
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn lost_outcome_write_is_recovered_after_lease_expires() {
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course),
            SignatureFailurePolicy::DeadLetter,
        )
        .await;
        let entry = enqueue(&h, body("00", AMOUNT, KEY), 5).await;
        let flaky = Arc::new(FlakyQueue::failing_update(h.queue.clone(), 2));
        let crashing = h.handler_over(flaky).with_claim_lease(Duration::ZERO);

        let first = crashing.handle(&entry.id).await;

        assert!(matches!(first, Err(WebhookError::Database(_))));
        assert_eq!(payment_status(&h).await, PaymentStatus::Completed);
        let stuck = stored(&h, &entry.id).await;
        assert_eq!(stuck.status, WebhookQueueStatus::Processing);

        let due = h.queue.list_due(Timestamp::now(), 10).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, entry.id);

        let second = h.handler.handle(&entry.id).await.unwrap();

        assert_eq!(second, ProcessOutcome::DuplicateDelivery);
        assert_eq!(h.strategy.fulfilled().await.len(), 1);
        let recovered = stored(&h, &entry.id).await;
        assert_eq!(recovered.status, WebhookQueueStatus::Processed);
        assert_eq!(recovered.retry_count, 1);
        assert!(recovered.processed_at.is_some());
    }

    #[tokio::test]
    async fn expired_claim_without_retries_left_is_dead_lettered() {
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course),
            SignatureFailurePolicy::DeadLetter,
        )
        .await;
        let entry = enqueue(&h, body("00", AMOUNT, KEY), 0).await;
        let flaky = Arc::new(FlakyQueue::failing_update(h.queue.clone(), 2));
        let crashing = h.handler_over(flaky).with_claim_lease(Duration::ZERO);
        assert!(crashing.handle(&entry.id).await.is_err());

        let outcome = h.handler.handle(&entry.id).await.unwrap();

        assert!(matches!(
            outcome,
            ProcessOutcome::DeadLettered { retry_count: 1, .. }
        ));
        let parked = stored(&h, &entry.id).await;
        assert_eq!(parked.status, WebhookQueueStatus::DeadLetter);
        assert_eq!(parked.retry_count, 1);
    }

    // ══════════════════════════════════════════════════════════════
    // Signature Failures
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn invalid_signature_dead_letters_without_touching_payment() {
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course),
            SignatureFailurePolicy::DeadLetter,
        )
        .await;
        let entry = enqueue(&h, body("00", AMOUNT, "wrong-key"), 5).await;

        let outcome = h.handler.handle(&entry.id).await.unwrap();

        assert!(matches!(outcome, ProcessOutcome::DeadLettered { .. }));
        assert_eq!(payment_status(&h).await, PaymentStatus::Pending);
        assert_eq!(
            stored(&h, &entry.id).await.status,
            WebhookQueueStatus::DeadLetter
        );
    }

    #[tokio::test]
    async fn invalid_signature_can_be_retried_by_policy() {
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course),
            SignatureFailurePolicy::Retry,
        )
        .await;
        let entry = enqueue(&h, body("00", AMOUNT, "wrong-key"), 5).await;

        let outcome = h.handler.handle(&entry.id).await.unwrap();

        assert!(matches!(
            outcome,
            ProcessOutcome::RetryScheduled { retry_count: 1, .. }
        ));
        assert_eq!(payment_status(&h).await, PaymentStatus::Pending);
        let stored = stored(&h, &entry.id).await;
        assert_eq!(stored.status, WebhookQueueStatus::Failed);
        assert_eq!(stored.last_error.as_deref(), Some("Invalid signature"));
    }

    // ══════════════════════════════════════════════════════════════
    // Retries
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn transient_failure_then_success() {
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course).failing_times(1),
            SignatureFailurePolicy::DeadLetter,
        )
        .await;
        let entry = enqueue(&h, body("00", AMOUNT, KEY), 5).await;

        let first = h.handler.handle(&entry.id).await.unwrap();
        assert!(matches!(
            first,
            ProcessOutcome::RetryScheduled { retry_count: 1, .. }
        ));
        assert_eq!(payment_status(&h).await, PaymentStatus::Processing);

        let second = h.handler.handle(&entry.id).await.unwrap();
        assert_eq!(second, ProcessOutcome::Processed);
        assert_eq!(payment_status(&h).await, PaymentStatus::Completed);
        assert_eq!(stored(&h, &entry.id).await.retry_count, 1);
    }

    #[tokio::test]
    async fn dead_letters_after_max_retries_plus_one_failures() {
        let max_retries = 2;
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course).failing_times(100),
            SignatureFailurePolicy::DeadLetter,
        )
        .await;
        let entry = enqueue(&h, body("00", AMOUNT, KEY), max_retries).await;

        for attempt in 1..=max_retries {
            let outcome = h.handler.handle(&entry.id).await.unwrap();
            assert!(
                matches!(outcome, ProcessOutcome::RetryScheduled { retry_count, .. } if retry_count == attempt)
            );
        }

        let last = h.handler.handle(&entry.id).await.unwrap();
        assert!(matches!(
            last,
            ProcessOutcome::DeadLettered { retry_count: 3, .. }
        ));

        let stored = stored(&h, &entry.id).await;
        assert_eq!(stored.status, WebhookQueueStatus::DeadLetter);
        assert_eq!(stored.retry_count, max_retries + 1);

        let after = h.handler.handle(&entry.id).await.unwrap();
        assert_eq!(
            after,
            ProcessOutcome::AlreadyTerminal(WebhookQueueStatus::DeadLetter)
        );
    }

    #[tokio::test]
    async fn unparseable_payload_is_retried_then_dead_lettered() {
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course),
            SignatureFailurePolicy::DeadLetter,
        )
        .await;
        let entry = enqueue(&h, "not json".to_string(), 0).await;

        let outcome = h.handler.handle(&entry.id).await.unwrap();

        assert!(matches!(outcome, ProcessOutcome::DeadLettered { .. }));
        assert_eq!(payment_status(&h).await, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn amount_mismatch_never_completes_payment() {
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course),
            SignatureFailurePolicy::DeadLetter,
        )
        .await;
        let entry = enqueue(&h, body("00", 1_000, KEY), 5).await;

        let outcome = h.handler.handle(&entry.id).await.unwrap();

        assert!(matches!(outcome, ProcessOutcome::RetryScheduled { .. }));
        assert_eq!(payment_status(&h).await, PaymentStatus::Pending);
        let stored = stored(&h, &entry.id).await;
        assert_eq!(
            stored.last_error.as_deref(),
            Some("Amount mismatch: expected 250000, got 1000")
        );
    }

    #[tokio::test]
    async fn non_retryable_failure_still_spends_the_retry_budget() {
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course),
            SignatureFailurePolicy::DeadLetter,
        )
        .await;
        let entry = enqueue(&h, "not json".to_string(), 1).await;
        assert!(!WebhookError::ParseError("not json".into()).is_retryable());

        let first = h.handler.handle(&entry.id).await.unwrap();
        assert!(matches!(
            first,
            ProcessOutcome::RetryScheduled { retry_count: 1, .. }
        ));
        assert_eq!(
            stored(&h, &entry.id).await.status,
            WebhookQueueStatus::Failed
        );

        let second = h.handler.handle(&entry.id).await.unwrap();
        assert!(matches!(
            second,
            ProcessOutcome::DeadLettered { retry_count: 2, .. }
        ));
    }

    #[tokio::test]
    async fn unknown_entry_is_not_found() {
        let h = harness(
            RecordingPostPaymentStrategy::new(ProductType::Course),
            SignatureFailurePolicy::DeadLetter,
        )
        .await;

        let result = h.handler.handle(&WebhookEntryId::new()).await;

        assert!(matches!(result, Err(WebhookError::EntryNotFound(_))));
    }
}
