//! ListDeadLettersHandler - operator view of parked webhook deliveries.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{Timestamp, WebhookEntryId};
use crate::domain::webhook::{PaymentWebhookEntry, WebhookError, WebhookQueueStatus};
use crate::ports::WebhookQueueRepository;

/// Upper bound on a single report.
pub const MAX_DEAD_LETTER_REPORT: usize = 500;

/// Summary of one dead-lettered delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadLetterView {
    pub id: WebhookEntryId,
    pub retry_count: u32,
    pub max_retries: u32,
    pub last_error: Option<String>,
    pub received_at: Timestamp,
    pub updated_at: Timestamp,
    /// Raw body, for manual replay.
    pub payload: String,
}

impl From<PaymentWebhookEntry> for DeadLetterView {
    fn from(entry: PaymentWebhookEntry) -> Self {
        Self {
            id: entry.id,
            retry_count: entry.retry_count,
            max_retries: entry.max_retries,
            last_error: entry.last_error,
            received_at: entry.received_at,
            updated_at: entry.updated_at,
            payload: entry.payload,
        }
    }
}

pub struct ListDeadLettersHandler {
    queue: Arc<dyn WebhookQueueRepository>,
}

impl ListDeadLettersHandler {
    pub fn new(queue: Arc<dyn WebhookQueueRepository>) -> Self {
        Self { queue }
    }

    /// Most recently dead-lettered entries first.
    pub async fn handle(&self, limit: usize) -> Result<Vec<DeadLetterView>, WebhookError> {
        let limit = limit.clamp(1, MAX_DEAD_LETTER_REPORT);
        let entries = self
            .queue
            .list_by_status(WebhookQueueStatus::DeadLetter, limit)
            .await?;
        Ok(entries.into_iter().map(DeadLetterView::from).collect())
    }
}
