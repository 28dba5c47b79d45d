//! In-memory WebhookQueueRepository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, WebhookEntryId};
use crate::domain::webhook::{PaymentWebhookEntry, WebhookQueueStatus};
use crate::ports::WebhookQueueRepository;

#[derive(Default)]
pub struct InMemoryWebhookQueueRepository {
    entries: RwLock<HashMap<WebhookEntryId, PaymentWebhookEntry>>,
}

impl InMemoryWebhookQueueRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, oldest first.
    pub async fn all(&self) -> Vec<PaymentWebhookEntry> {
        let mut entries: Vec<_> = self.entries.read().await.values().cloned().collect();
        entries.sort_by_key(|e| e.received_at);
        entries
    }
}

#[async_trait]
impl WebhookQueueRepository for InMemoryWebhookQueueRepository {
    async fn insert(&self, entry: &PaymentWebhookEntry) -> Result<(), DomainError> {
        self.entries.write().await.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn update(&self, entry: &PaymentWebhookEntry) -> Result<i64, DomainError> {
        let mut entries = self.entries.write().await;
        let stored = entries.get_mut(&entry.id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::WebhookEntryNotFound,
                format!("Webhook entry {} not found", entry.id),
            )
        })?;

        if stored.version != entry.version {
            return Err(DomainError::conflict(format!(
                "Webhook entry {} is at version {}, update was based on {}",
                entry.id, stored.version, entry.version
            )));
        }

        let next_version = entry.version + 1;
        *stored = PaymentWebhookEntry {
            version: next_version,
            ..entry.clone()
        };
        Ok(next_version)
    }

    async fn find_by_id(
        &self,
        id: &WebhookEntryId,
    ) -> Result<Option<PaymentWebhookEntry>, DomainError> {
        Ok(self.entries.read().await.get(id).cloned())
    }

    async fn list_due(
        &self,
        now: Timestamp,
        limit: usize,
    ) -> Result<Vec<PaymentWebhookEntry>, DomainError> {
        let mut due: Vec<_> = self
            .entries
            .read()
            .await
            .values()
            .filter(|e| e.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|e| e.received_at);
        due.truncate(limit);
        Ok(due)
    }

    async fn list_by_status(
        &self,
        status: WebhookQueueStatus,
        limit: usize,
    ) -> Result<Vec<PaymentWebhookEntry>, DomainError> {
        let mut matching: Vec<_> = self
            .entries
            .read()
            .await
            .values()
            .filter(|e| e.status == status)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        matching.truncate(limit);
        Ok(matching)
    }
}
