//! PostgreSQL implementation of WebhookQueueRepository.
//!
//! Claims race on `version`: the UPDATE only matches the version the caller
//! read, so exactly one of two concurrent claimers sees a row come back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, WebhookEntryId};
use crate::domain::payment::PaymentGateway;
use crate::domain::webhook::{PaymentWebhookEntry, WebhookQueueStatus};
use crate::ports::WebhookQueueRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, gateway, payload, signature, status, retry_count, max_retries, last_error,
           received_at, processed_at, next_attempt_at, updated_at, version
    FROM payment_webhook_queue
"#;

pub struct PostgresWebhookQueueRepository {
    pool: PgPool,
}

impl PostgresWebhookQueueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookEntryRow {
    id: Uuid,
    gateway: String,
    payload: String,
    signature: Option<String>,
    status: String,
    retry_count: i32,
    max_retries: i32,
    last_error: Option<String>,
    received_at: DateTime<Utc>,
    processed_at: Option<DateTime<Utc>>,
    next_attempt_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

impl TryFrom<WebhookEntryRow> for PaymentWebhookEntry {
    type Error = DomainError;

    fn try_from(row: WebhookEntryRow) -> Result<Self, Self::Error> {
        Ok(PaymentWebhookEntry {
            id: WebhookEntryId::from_uuid(row.id),
            gateway: PaymentGateway::parse(&row.gateway).ok_or_else(|| {
                DomainError::database(format!("Invalid gateway value: {}", row.gateway))
            })?,
            payload: row.payload,
            signature: row.signature,
            status: WebhookQueueStatus::parse(&row.status).ok_or_else(|| {
                DomainError::database(format!("Invalid status value: {}", row.status))
            })?,
            retry_count: to_u32("retry_count", row.retry_count)?,
            max_retries: to_u32("max_retries", row.max_retries)?,
            last_error: row.last_error,
            received_at: Timestamp::from_datetime(row.received_at),
            processed_at: row.processed_at.map(Timestamp::from_datetime),
            next_attempt_at: Timestamp::from_datetime(row.next_attempt_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            version: row.version,
        })
    }
}

fn to_u32(column: &str, value: i32) -> Result<u32, DomainError> {
    u32::try_from(value)
        .map_err(|_| DomainError::database(format!("Negative {} value: {}", column, value)))
}

fn to_i32(column: &str, value: u32) -> Result<i32, DomainError> {
    i32::try_from(value)
        .map_err(|_| DomainError::database(format!("{} out of range: {}", column, value)))
}

fn to_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn query_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl WebhookQueueRepository for PostgresWebhookQueueRepository {
    async fn insert(&self, entry: &PaymentWebhookEntry) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payment_webhook_queue (
                id, gateway, payload, signature, status, retry_count, max_retries, last_error,
                received_at, processed_at, next_attempt_at, updated_at, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.gateway.as_str())
        .bind(&entry.payload)
        .bind(&entry.signature)
        .bind(entry.status.as_str())
        .bind(to_i32("retry_count", entry.retry_count)?)
        .bind(to_i32("max_retries", entry.max_retries)?)
        .bind(&entry.last_error)
        .bind(entry.received_at.as_datetime())
        .bind(entry.processed_at.as_ref().map(Timestamp::as_datetime))
        .bind(entry.next_attempt_at.as_datetime())
        .bind(entry.updated_at.as_datetime())
        .bind(entry.version)
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("enqueue webhook", e))?;

        Ok(())
    }

    async fn update(&self, entry: &PaymentWebhookEntry) -> Result<i64, DomainError> {
        let new_version: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE payment_webhook_queue SET
                status = $3,
                retry_count = $4,
                last_error = $5,
                processed_at = $6,
                next_attempt_at = $7,
                updated_at = $8,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING version
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.version)
        .bind(entry.status.as_str())
        .bind(to_i32("retry_count", entry.retry_count)?)
        .bind(&entry.last_error)
        .bind(entry.processed_at.as_ref().map(Timestamp::as_datetime))
        .bind(entry.next_attempt_at.as_datetime())
        .bind(entry.updated_at.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("update webhook entry", e))?;

        if let Some(version) = new_version {
            return Ok(version);
        }

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM payment_webhook_queue WHERE id = $1)",
        )
        .bind(entry.id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_error("check webhook entry", e))?;

        if exists {
            Err(DomainError::conflict(format!(
                "Webhook entry {} was modified concurrently",
                entry.id
            )))
        } else {
            Err(DomainError::new(
                ErrorCode::WebhookEntryNotFound,
                format!("Webhook entry {} not found", entry.id),
            ))
        }
    }

    async fn find_by_id(
        &self,
        id: &WebhookEntryId,
    ) -> Result<Option<PaymentWebhookEntry>, DomainError> {
        let row: Option<WebhookEntryRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| query_error("find webhook entry", e))?;

        row.map(PaymentWebhookEntry::try_from).transpose()
    }

    async fn list_due(
        &self,
        now: Timestamp,
        limit: usize,
    ) -> Result<Vec<PaymentWebhookEntry>, DomainError> {
        let rows: Vec<WebhookEntryRow> = sqlx::query_as(&format!(
            "{} WHERE status IN ('pending', 'failed', 'processing') AND next_attempt_at <= $1 \
             ORDER BY received_at ASC LIMIT $2",
            SELECT_COLUMNS
        ))
        .bind(now.as_datetime())
        .bind(to_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("list due webhook entries", e))?;

        rows.into_iter().map(PaymentWebhookEntry::try_from).collect()
    }

    async fn list_by_status(
        &self,
        status: WebhookQueueStatus,
        limit: usize,
    ) -> Result<Vec<PaymentWebhookEntry>, DomainError> {
        let rows: Vec<WebhookEntryRow> = sqlx::query_as(&format!(
            "{} WHERE status = $1 ORDER BY updated_at DESC LIMIT $2",
            SELECT_COLUMNS
        ))
        .bind(status.as_str())
        .bind(to_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("list webhook entries", e))?;

        rows.into_iter().map(PaymentWebhookEntry::try_from).collect()
    }
}
