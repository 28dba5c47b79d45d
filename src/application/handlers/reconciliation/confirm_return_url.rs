//! ConfirmReturnUrlHandler - cross-checks a learner's return redirect with PayOS.
//!
//! The return URL query string is client controlled. It is only ever used to
//! decide which order to ask the gateway about; the gateway's answer decides
//! what happens to the payment.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::webhook::{ReturnCallback, WebhookError};
use crate::ports::{GatewayPaymentStatus, PaymentGatewayClient, PaymentRepository};

use super::settlement::{ConfirmedPayment, PaymentSettlement, SettlementOutcome};

/// Result of a return-URL confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// Gateway confirmed payment; it has now been settled.
    Confirmed,
    /// Payment was already settled (usually by the webhook).
    AlreadyCompleted,
    /// Gateway has not reached a final state yet.
    StillPending,
    /// Gateway reports the payment cancelled, expired or failed.
    Cancelled,
}

impl ReturnOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnOutcome::Confirmed => "confirmed",
            ReturnOutcome::AlreadyCompleted => "already_completed",
            ReturnOutcome::StillPending => "pending",
            ReturnOutcome::Cancelled => "cancelled",
        }
    }
}

pub struct ConfirmReturnUrlHandler {
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGatewayClient>,
    settlement: Arc<PaymentSettlement>,
}

impl ConfirmReturnUrlHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGatewayClient>,
        settlement: Arc<PaymentSettlement>,
    ) -> Self {
        Self {
            payments,
            gateway,
            settlement,
        }
    }

    /// Confirms a return callback against the gateway.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` if no local payment has the order code
    /// - `ForgedReturn` if the callback claims success the gateway does not report
    /// - `AmountMismatch` if the gateway amount differs from the payment
    /// - `Gateway` if the gateway cannot be reached
    pub async fn handle(&self, callback: ReturnCallback) -> Result<ReturnOutcome, WebhookError> {
        let order_code = callback.order_code;

        let payment = self
            .payments
            .find_by_order_code(order_code)
            .await?
            .ok_or(WebhookError::PaymentNotFound(order_code))?;

        if payment.is_completed() {
            return Ok(ReturnOutcome::AlreadyCompleted);
        }

        let gateway_info = self.gateway.get_payment_info(order_code).await?;
        let claims_success = callback.claims_success();

        match gateway_info.status {
            GatewayPaymentStatus::Paid => {
                let outcome = self
                    .settlement
                    .settle_paid(ConfirmedPayment {
                        order_code,
                        amount: gateway_info.amount,
                        reference: gateway_info.reference,
                    })
                    .await?;

                info!(order_code, "Return callback confirmed by gateway");

                Ok(match outcome {
                    SettlementOutcome::AlreadyCompleted => ReturnOutcome::AlreadyCompleted,
                    _ => ReturnOutcome::Confirmed,
                })
            }
            status if claims_success => {
                warn!(
                    order_code,
                    gateway_status = ?status,
                    "Return callback claims success the gateway does not confirm"
                );
                Err(WebhookError::ForgedReturn { order_code })
            }
            status if status.is_closed_unpaid() => {
                let reason = format!("gateway status {:?}", status);
                let outcome = self.settlement.mark_failed(order_code, reason).await?;
                Ok(match outcome {
                    SettlementOutcome::AlreadyCompleted => ReturnOutcome::AlreadyCompleted,
                    _ => ReturnOutcome::Cancelled,
                })
            }
            _ => Ok(ReturnOutcome::StillPending),
        }
    }
}
