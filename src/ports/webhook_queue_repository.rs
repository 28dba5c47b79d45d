//! Webhook queue repository port.
//!
//! Durable store for inbound gateway deliveries. Rows are never deleted.
//! Claims and outcome writes are guarded by the row version, which is how
//! two workers racing on the same entry are kept apart.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, WebhookEntryId};
use crate::domain::webhook::{PaymentWebhookEntry, WebhookQueueStatus};

#[async_trait]
pub trait WebhookQueueRepository: Send + Sync {
    /// Persist a freshly received delivery.
    async fn insert(&self, entry: &PaymentWebhookEntry) -> Result<(), DomainError>;

    /// Write the entry back, returning its new version.
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if the stored version differs from `entry.version`
    /// - `WebhookEntryNotFound` if the entry doesn't exist
    async fn update(&self, entry: &PaymentWebhookEntry) -> Result<i64, DomainError>;

    async fn find_by_id(&self, id: &WebhookEntryId)
        -> Result<Option<PaymentWebhookEntry>, DomainError>;

    /// Entries a sweep should attempt, oldest first: `Pending` or `Failed`
    /// with `next_attempt_at <= now`, plus `Processing` entries whose claim
    /// lease has run out.
    async fn list_due(
        &self,
        now: Timestamp,
        limit: usize,
    ) -> Result<Vec<PaymentWebhookEntry>, DomainError>;

    /// Entries in a given status, most recently updated first.
    async fn list_by_status(
        &self,
        status: WebhookQueueStatus,
        limit: usize,
    ) -> Result<Vec<PaymentWebhookEntry>, DomainError>;
}
