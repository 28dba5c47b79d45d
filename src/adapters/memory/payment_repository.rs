//! In-memory PaymentRepository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId};
use crate::domain::payment::Payment;
use crate::ports::PaymentRepository;

/// Payment store backed by a map, with the same version checks as Postgres.
#[derive(Default)]
pub struct InMemoryPaymentRepository {
    payments: RwLock<HashMap<PaymentId, Payment>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, bypassing uniqueness checks.
    pub async fn with_payments(payments: impl IntoIterator<Item = Payment>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.payments.write().await;
            for payment in payments {
                map.insert(payment.id, payment);
            }
        }
        repo
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn insert(&self, payment: &Payment) -> Result<(), DomainError> {
        let mut payments = self.payments.write().await;
        if payments
            .values()
            .any(|p| p.gateway == payment.gateway && p.order_code == payment.order_code)
        {
            return Err(DomainError::validation(
                "order_code",
                format!("Order code {} already exists", payment.order_code),
            ));
        }
        payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn update(&self, payment: &Payment) -> Result<i64, DomainError> {
        let mut payments = self.payments.write().await;
        let stored = payments.get_mut(&payment.id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::PaymentNotFound,
                format!("Payment {} not found", payment.id),
            )
        })?;

        if stored.version != payment.version {
            return Err(DomainError::conflict(format!(
                "Payment {} is at version {}, update was based on {}",
                payment.id, stored.version, payment.version
            )));
        }

        let next_version = payment.version + 1;
        *stored = Payment {
            version: next_version,
            ..payment.clone()
        };
        Ok(next_version)
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        Ok(self.payments.read().await.get(id).cloned())
    }

    async fn find_by_order_code(&self, order_code: i64) -> Result<Option<Payment>, DomainError> {
        Ok(self
            .payments
            .read()
            .await
            .values()
            .find(|p| p.order_code == order_code)
            .cloned())
    }
}
