//! Webhook reconciliation error types.
//!
//! Every variant knows whether a later attempt could succeed and which HTTP
//! status it maps to when surfaced to a caller.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::payment::{PaymentError, ProductType};

/// Errors raised while reconciling gateway webhooks and return callbacks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WebhookError {
    /// Signature missing or does not match the payload.
    #[error("Invalid signature")]
    SignatureInvalid,

    /// Payload is not valid JSON or not the expected shape.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from the payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// No queue entry with the given id.
    #[error("Webhook entry not found: {0}")]
    EntryNotFound(String),

    /// No payment exists for the gateway order code.
    #[error("Payment not found for order code {0}")]
    PaymentNotFound(i64),

    /// Gateway-reported amount differs from the payment amount.
    #[error("Amount mismatch: expected {expected}, got {actual}")]
    AmountMismatch { expected: i64, actual: i64 },

    /// Payment or queue entry cannot make the requested transition.
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    /// No post-payment strategy registered for the product type.
    #[error("No post-payment strategy for product type {0}")]
    StrategyNotRegistered(ProductType),

    /// Fulfilment or a downstream collaborator failed temporarily.
    #[error("Transient processing failure: {0}")]
    TransientProcessingFailure(String),

    /// Entry has used up its retry budget.
    #[error("Max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded { attempts: u32 },

    /// Client return callback claims a payment the gateway does not confirm.
    #[error("Return callback for order {order_code} not confirmed by gateway")]
    ForgedReturn { order_code: i64 },

    /// Gateway API call failed.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Another worker changed the record first.
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if a later attempt might succeed.
    ///
    /// Informational only: it is logged with each failure so operators can
    /// tell transient trouble from bad deliveries. Queue processing retries
    /// every failure within the entry's budget regardless, since a delivery
    /// that fails for data reasons (an order row not yet visible, a price
    /// corrected by an operator) can still succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::PaymentNotFound(_) // checkout row may not be committed yet
                | WebhookError::StrategyNotRegistered(_)
                | WebhookError::TransientProcessingFailure(_)
                | WebhookError::Gateway(_)
                | WebhookError::ConcurrencyConflict(_)
                | WebhookError::Database(_)
        )
    }

    /// Maps the error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::SignatureInvalid | WebhookError::ForgedReturn { .. } => {
                StatusCode::UNAUTHORIZED
            }

            WebhookError::ParseError(_) | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,

            WebhookError::PaymentNotFound(_) | WebhookError::EntryNotFound(_) => {
                StatusCode::NOT_FOUND
            }

            WebhookError::AmountMismatch { .. }
            | WebhookError::InvalidTransition(_)
            | WebhookError::ConcurrencyConflict(_) => StatusCode::CONFLICT,

            WebhookError::Gateway(_) => StatusCode::BAD_GATEWAY,

            WebhookError::StrategyNotRegistered(_)
            | WebhookError::TransientProcessingFailure(_)
            | WebhookError::MaxRetriesExceeded { .. }
            | WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ConcurrencyConflict => WebhookError::ConcurrencyConflict(err.message),
            ErrorCode::ExternalServiceError => WebhookError::Gateway(err.message),
            _ => WebhookError::Database(err.to_string()),
        }
    }
}

impl From<PaymentError> for WebhookError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::AmountMismatch { expected, actual } => {
                WebhookError::AmountMismatch { expected, actual }
            }
            PaymentError::InvalidTransition { .. } => WebhookError::InvalidTransition(err.to_string()),
            PaymentError::InvalidAmount(_) => WebhookError::ParseError(err.to_string()),
        }
    }
}
