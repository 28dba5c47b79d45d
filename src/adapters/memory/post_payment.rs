//! Recording PostPaymentStrategy for tests and local runs.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId};
use crate::domain::payment::{Payment, ProductType};
use crate::ports::PostPaymentStrategy;

/// Strategy that records fulfilled payments and can be told to fail.
pub struct RecordingPostPaymentStrategy {
    product_type: ProductType,
    fulfilled: RwLock<Vec<PaymentId>>,
    failures_remaining: AtomicU32,
}

impl RecordingPostPaymentStrategy {
    pub fn new(product_type: ProductType) -> Self {
        Self {
            product_type,
            fulfilled: RwLock::new(Vec::new()),
            failures_remaining: AtomicU32::new(0),
        }
    }

    /// Fails the next `count` fulfilments with a transient error.
    pub fn failing_times(self, count: u32) -> Self {
        self.failures_remaining.store(count, Ordering::SeqCst);
        self
    }

    /// Payments fulfilled so far; repeats show up more than once.
    pub async fn fulfilled(&self) -> Vec<PaymentId> {
        self.fulfilled.read().await.clone()
    }
}

#[async_trait]
impl PostPaymentStrategy for RecordingPostPaymentStrategy {
    fn handles(&self) -> ProductType {
        self.product_type
    }

    async fn fulfil(&self, payment: &Payment) -> Result<(), DomainError> {
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(DomainError::new(
                ErrorCode::ExternalServiceError,
                "Simulated fulfilment failure",
            ));
        }
        self.fulfilled.write().await.push(payment.id);
        Ok(())
    }
}
