//! PostgreSQL implementation of PaymentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, ProductId, Timestamp, UserId};
use crate::domain::payment::{Payment, PaymentGateway, PaymentStatus, ProductType};
use crate::ports::PaymentRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, order_code, gateway, status, amount, user_id, product_id, product_type,
           gateway_reference, failure_reason, paid_at, created_at, updated_at, version
    FROM payments
"#;

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    order_code: i64,
    gateway: String,
    status: String,
    amount: i64,
    user_id: String,
    product_id: Uuid,
    product_type: String,
    gateway_reference: Option<String>,
    failure_reason: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            order_code: row.order_code,
            gateway: PaymentGateway::parse(&row.gateway)
                .ok_or_else(|| invalid_column("gateway", &row.gateway))?,
            status: PaymentStatus::parse(&row.status)
                .ok_or_else(|| invalid_column("status", &row.status))?,
            amount: row.amount,
            user_id: UserId::new(row.user_id)
                .map_err(|e| DomainError::database(format!("Invalid user_id: {}", e)))?,
            product_id: ProductId::from_uuid(row.product_id),
            product_type: ProductType::parse(&row.product_type)
                .ok_or_else(|| invalid_column("product_type", &row.product_type))?,
            gateway_reference: row.gateway_reference,
            failure_reason: row.failure_reason,
            paid_at: row.paid_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            version: row.version,
        })
    }
}

fn invalid_column(column: &str, value: &str) -> DomainError {
    DomainError::database(format!("Invalid {} value: {}", column, value))
}

fn query_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn insert(&self, payment: &Payment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_code, gateway, status, amount, user_id, product_id, product_type,
                gateway_reference, failure_reason, paid_at, created_at, updated_at, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.order_code)
        .bind(payment.gateway.as_str())
        .bind(payment.status.as_str())
        .bind(payment.amount)
        .bind(payment.user_id.as_str())
        .bind(payment.product_id.as_uuid())
        .bind(payment.product_type.as_str())
        .bind(&payment.gateway_reference)
        .bind(&payment.failure_reason)
        .bind(payment.paid_at.as_ref().map(Timestamp::as_datetime))
        .bind(payment.created_at.as_datetime())
        .bind(payment.updated_at.as_datetime())
        .bind(payment.version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("payments_gateway_order_code_key") {
                    return DomainError::validation(
                        "order_code",
                        format!("Order code {} already exists", payment.order_code),
                    );
                }
            }
            query_error("insert payment", e)
        })?;

        Ok(())
    }

    async fn update(&self, payment: &Payment) -> Result<i64, DomainError> {
        let new_version: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE payments SET
                status = $3,
                gateway_reference = $4,
                failure_reason = $5,
                paid_at = $6,
                updated_at = $7,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING version
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.version)
        .bind(payment.status.as_str())
        .bind(&payment.gateway_reference)
        .bind(&payment.failure_reason)
        .bind(payment.paid_at.as_ref().map(Timestamp::as_datetime))
        .bind(payment.updated_at.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("update payment", e))?;

        if let Some(version) = new_version {
            return Ok(version);
        }

        // Zero rows: either gone or someone else bumped the version.
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM payments WHERE id = $1)")
            .bind(payment.id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_error("check payment", e))?;

        if exists {
            Err(DomainError::conflict(format!(
                "Payment {} was modified concurrently",
                payment.id
            )))
        } else {
            Err(DomainError::new(
                ErrorCode::PaymentNotFound,
                format!("Payment {} not found", payment.id),
            ))
        }
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_by_order_code(&self, order_code: i64) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> =
            sqlx::query_as(&format!("{} WHERE order_code = $1", SELECT_COLUMNS))
                .bind(order_code)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| query_error("find payment by order code", e))?;

        row.map(Payment::try_from).transpose()
    }
}
