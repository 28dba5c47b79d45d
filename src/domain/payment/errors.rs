//! Payment aggregate errors.

use thiserror::Error;

use super::PaymentStatus;

/// Rule violations raised by the [`Payment`](super::Payment) aggregate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaymentError {
    #[error("Cannot transition payment from {from:?} to {to:?}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("Amount mismatch: expected {expected}, got {actual}")]
    AmountMismatch { expected: i64, actual: i64 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),
}
