//! Payment gateway port.
//!
//! Read-only view of the gateway's authoritative payment state, used to
//! cross-check client return callbacks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;

/// Gateway-side status of a payment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayPaymentStatus {
    Pending,
    Processing,
    Paid,
    Underpaid,
    Cancelled,
    Expired,
    Failed,
    Unknown,
}

impl GatewayPaymentStatus {
    /// Parses the gateway's status string; unrecognised values map to `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "PENDING" => GatewayPaymentStatus::Pending,
            "PROCESSING" => GatewayPaymentStatus::Processing,
            "PAID" => GatewayPaymentStatus::Paid,
            "UNDERPAID" => GatewayPaymentStatus::Underpaid,
            "CANCELLED" => GatewayPaymentStatus::Cancelled,
            "EXPIRED" => GatewayPaymentStatus::Expired,
            "FAILED" => GatewayPaymentStatus::Failed,
            _ => GatewayPaymentStatus::Unknown,
        }
    }

    /// True when the gateway will never report this request as paid.
    pub fn is_closed_unpaid(&self) -> bool {
        matches!(
            self,
            GatewayPaymentStatus::Cancelled
                | GatewayPaymentStatus::Expired
                | GatewayPaymentStatus::Failed
        )
    }
}

/// Payment request details as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPaymentInfo {
    pub order_code: i64,
    pub amount: i64,
    pub amount_paid: i64,
    pub amount_remaining: i64,
    pub status: GatewayPaymentStatus,
    /// Reference of the settling transaction, when paid.
    pub reference: Option<String>,
}

#[async_trait]
pub trait PaymentGatewayClient: Send + Sync {
    /// Fetch the gateway's view of a payment request.
    ///
    /// # Errors
    ///
    /// - `ExternalServiceError` if the gateway is unreachable or rejects the call
    /// - `NotFound` if the gateway has no such order
    async fn get_payment_info(&self, order_code: i64) -> Result<GatewayPaymentInfo, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gateway_status_case_insensitively() {
        assert_eq!(GatewayPaymentStatus::parse("PAID"), GatewayPaymentStatus::Paid);
        assert_eq!(
            GatewayPaymentStatus::parse("cancelled"),
            GatewayPaymentStatus::Cancelled
        );
        assert_eq!(
            GatewayPaymentStatus::parse("REFUNDING"),
            GatewayPaymentStatus::Unknown
        );
    }

    #[test]
    fn closed_unpaid_statuses() {
        assert!(GatewayPaymentStatus::Expired.is_closed_unpaid());
        assert!(!GatewayPaymentStatus::Pending.is_closed_unpaid());
        assert!(!GatewayPaymentStatus::Paid.is_closed_unpaid());
    }
}
