//! Scriptable PaymentGatewayClient for tests and local runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{GatewayPaymentInfo, GatewayPaymentStatus, PaymentGatewayClient};

/// Gateway stub that answers from preconfigured payment info.
///
/// Unknown order codes yield `NotFound`; `fail_with` makes every call fail.
#[derive(Default)]
pub struct MockPaymentGateway {
    payments: RwLock<HashMap<i64, GatewayPaymentInfo>>,
    failure: RwLock<Option<String>>,
    calls: RwLock<Vec<i64>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status the gateway reports for an order.
    pub async fn set_status(&self, order_code: i64, amount: i64, status: GatewayPaymentStatus) {
        let amount_paid = if status == GatewayPaymentStatus::Paid {
            amount
        } else {
            0
        };
        let info = GatewayPaymentInfo {
            order_code,
            amount,
            amount_paid,
            amount_remaining: amount - amount_paid,
            status,
            reference: (status == GatewayPaymentStatus::Paid).then(|| format!("REF{}", order_code)),
        };
        self.payments.write().await.insert(order_code, info);
    }

    /// Makes every subsequent call fail with an external service error.
    pub async fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().await = Some(message.into());
    }

    /// Order codes queried so far.
    pub async fn calls(&self) -> Vec<i64> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl PaymentGatewayClient for MockPaymentGateway {
    async fn get_payment_info(&self, order_code: i64) -> Result<GatewayPaymentInfo, DomainError> {
        self.calls.write().await.push(order_code);

        if let Some(message) = self.failure.read().await.clone() {
            return Err(DomainError::new(ErrorCode::ExternalServiceError, message));
        }

        self.payments
            .read()
            .await
            .get(&order_code)
            .cloned()
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::NotFound,
                    format!("Gateway has no order {}", order_code),
                )
            })
    }
}
