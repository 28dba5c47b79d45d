//! Payment repository port.
//!
//! Persists Payment aggregates with optimistic concurrency: every update
//! must carry the version it was read at.

use crate::domain::foundation::{DomainError, PaymentId};
use crate::domain::payment::Payment;
use async_trait::async_trait;

/// Repository port for Payment aggregate persistence.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Save a new payment.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the order code is already taken
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Update an existing payment, returning its new version.
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if the stored version differs from `payment.version`
    /// - `PaymentNotFound` if the payment doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, payment: &Payment) -> Result<i64, DomainError>;

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError>;

    /// Find a payment by the gateway order code.
    async fn find_by_order_code(&self, order_code: i64) -> Result<Option<Payment>, DomainError>;
}
