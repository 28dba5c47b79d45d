//! PaymentSettlement - shared path that applies a gateway outcome to a payment.
//!
//! Webhooks and return-URL confirmations both end here, so a payment is
//! settled the same way whichever signal arrives first, and only once.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::Timestamp;
use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::webhook::WebhookError;
use crate::ports::{PaymentRepository, PostPaymentStrategyRegistry};

/// What settlement did to the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// Payment moved to Completed and its product was granted.
    Completed,
    /// Payment was already Completed; nothing changed.
    AlreadyCompleted,
    /// Payment moved to Failed.
    MarkedFailed,
    /// Payment was already Failed; nothing changed.
    AlreadyFailed,
}

/// Details of a gateway-confirmed payment.
#[derive(Debug, Clone)]
pub struct ConfirmedPayment {
    pub order_code: i64,
    pub amount: i64,
    pub reference: Option<String>,
}

pub struct PaymentSettlement {
    payments: Arc<dyn PaymentRepository>,
    strategies: Arc<PostPaymentStrategyRegistry>,
}

impl PaymentSettlement {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        strategies: Arc<PostPaymentStrategyRegistry>,
    ) -> Self {
        Self {
            payments,
            strategies,
        }
    }

    /// Settles a payment the gateway reports as paid.
    ///
    /// 1. Completed payments are left alone (`AlreadyCompleted`)
    /// 2. The reported amount must match
    /// 3. Payment moves to Processing and is persisted
    /// 4. The product type's post-payment strategy runs
    /// 5. Payment moves to Completed and is persisted
    ///
    /// A failure after step 3 leaves the payment in Processing; the next
    /// attempt resumes from there.
    pub async fn settle_paid(
        &self,
        confirmed: ConfirmedPayment,
    ) -> Result<SettlementOutcome, WebhookError> {
        let mut payment = self.load(confirmed.order_code).await?;

        if payment.is_completed() {
            return Ok(SettlementOutcome::AlreadyCompleted);
        }

        payment.verify_amount(confirmed.amount)?;

        if payment.status != PaymentStatus::Processing {
            payment.begin_processing(Timestamp::now())?;
            payment.version = self.payments.update(&payment).await?;
        }

        let strategy = self
            .strategies
            .get(payment.product_type)
            .ok_or(WebhookError::StrategyNotRegistered(payment.product_type))?;

        strategy
            .fulfil(&payment)
            .await
            .map_err(|e| WebhookError::TransientProcessingFailure(e.message))?;

        payment.complete(confirmed.reference, Timestamp::now())?;
        payment.version = self.payments.update(&payment).await?;

        info!(
            payment_id = %payment.id,
            order_code = payment.order_code,
            product_type = %payment.product_type,
            amount = payment.amount,
            "Payment settled"
        );

        Ok(SettlementOutcome::Completed)
    }

    /// Marks a payment failed after the gateway reports it unpaid.
    pub async fn mark_failed(
        &self,
        order_code: i64,
        reason: String,
    ) -> Result<SettlementOutcome, WebhookError> {
        let mut payment = self.load(order_code).await?;

        match payment.status {
            PaymentStatus::Completed => return Ok(SettlementOutcome::AlreadyCompleted),
            PaymentStatus::Failed => return Ok(SettlementOutcome::AlreadyFailed),
            _ => {}
        }

        payment.fail(reason.clone(), Timestamp::now())?;
        self.payments.update(&payment).await?;

        info!(
            payment_id = %payment.id,
            order_code = payment.order_code,
            reason = %reason,
            "Payment marked failed"
        );

        Ok(SettlementOutcome::MarkedFailed)
    }

    async fn load(&self, order_code: i64) -> Result<Payment, WebhookError> {
        self.payments
            .find_by_order_code(order_code)
            .await?
            .ok_or(WebhookError::PaymentNotFound(order_code))
    }
}
