//! EnqueueWebhookHandler - persists an inbound delivery before any processing.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::Timestamp;
use crate::domain::webhook::{PaymentWebhookEntry, WebhookError};
use crate::ports::WebhookQueueRepository;

/// Command carrying a raw webhook delivery.
#[derive(Debug, Clone)]
pub struct EnqueueWebhookCommand {
    /// Body exactly as received.
    pub payload: Vec<u8>,
    /// Signature supplied in a header, if any.
    pub signature: Option<String>,
}

pub struct EnqueueWebhookHandler {
    queue: Arc<dyn WebhookQueueRepository>,
    max_retries: u32,
}

impl EnqueueWebhookHandler {
    pub fn new(queue: Arc<dyn WebhookQueueRepository>, max_retries: u32) -> Self {
        Self { queue, max_retries }
    }

    /// Stores the delivery as a `Pending` entry.
    ///
    /// Nothing about the payload is validated here; a body that is not even
    /// UTF-8 is still stored (lossily) so the delivery is never dropped.
    pub async fn handle(
        &self,
        cmd: EnqueueWebhookCommand,
    ) -> Result<PaymentWebhookEntry, WebhookError> {
        let payload = String::from_utf8_lossy(&cmd.payload).into_owned();
        let entry =
            PaymentWebhookEntry::receive(payload, cmd.signature, self.max_retries, Timestamp::now());

        self.queue.insert(&entry).await?;

        info!(
            entry_id = %entry.id,
            gateway = %entry.gateway,
            payload_bytes = cmd.payload.len(),
            "Webhook delivery enqueued"
        );

        Ok(entry)
    }
}
