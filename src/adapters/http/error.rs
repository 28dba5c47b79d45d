//! Shared JSON error body and error-to-response mapping.

use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::FlashCardReviewError;
use crate::domain::spaced_repetition::SchedulerError;
use crate::domain::webhook::WebhookError;

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// API error for the reconciliation endpoints.
#[derive(Debug)]
pub struct WebhookApiError(pub WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let error_code = match &self.0 {
            WebhookError::SignatureInvalid => "SIGNATURE_INVALID",
            WebhookError::ParseError(_) | WebhookError::MissingField(_) => "INVALID_PAYLOAD",
            WebhookError::EntryNotFound(_) => "WEBHOOK_ENTRY_NOT_FOUND",
            WebhookError::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            WebhookError::AmountMismatch { .. } => "AMOUNT_MISMATCH",
            WebhookError::InvalidTransition(_) => "INVALID_STATE_TRANSITION",
            WebhookError::ForgedReturn { .. } => "PAYMENT_NOT_CONFIRMED",
            WebhookError::Gateway(_) => "GATEWAY_ERROR",
            WebhookError::ConcurrencyConflict(_) => "CONCURRENCY_CONFLICT",
            WebhookError::StrategyNotRegistered(_)
            | WebhookError::TransientProcessingFailure(_)
            | WebhookError::MaxRetriesExceeded { .. }
            | WebhookError::Database(_) => "INTERNAL_ERROR",
        };

        let status = self.0.status_code();
        // Storage and fulfilment details stay in the logs.
        let message = if status.is_server_error() {
            tracing::error!(error = %self.0, "Reconciliation request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}

/// API error for the flashcard endpoints.
#[derive(Debug)]
pub struct FlashCardApiError(pub FlashCardReviewError);

impl From<FlashCardReviewError> for FlashCardApiError {
    fn from(err: FlashCardReviewError) -> Self {
        Self(err)
    }
}

impl IntoResponse for FlashCardApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let body = match &self.0 {
            FlashCardReviewError::Scheduler(SchedulerError::InvalidQuality(q)) => {
                ErrorResponse::with_details(
                    "INVALID_QUALITY",
                    self.0.to_string(),
                    serde_json::json!({ "quality": q, "min": 0, "max": 5 }),
                )
            }
            FlashCardReviewError::Scheduler(SchedulerError::InvalidState(_)) => {
                ErrorResponse::new("INVALID_REVIEW_STATE", self.0.to_string())
            }
            FlashCardReviewError::ConcurrentUpdate { .. } => {
                ErrorResponse::new("CONCURRENT_REVIEW", self.0.to_string())
            }
            FlashCardReviewError::Repository(e) => {
                tracing::error!(error = %e, "Flashcard request failed");
                ErrorResponse::new("INTERNAL_ERROR", "Internal server error")
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Rejection for requests without a learner identity.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forged_return_is_unauthorized() {
        let response = WebhookApiError(WebhookError::ForgedReturn { order_code: 3 }).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn database_error_is_internal() {
        let response = WebhookApiError(WebhookError::Database("down".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_quality_is_bad_request() {
        let response =
            FlashCardApiError(SchedulerError::InvalidQuality(8).into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn concurrent_review_is_conflict() {
        let response =
            FlashCardApiError(FlashCardReviewError::ConcurrentUpdate { attempts: 3 }).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn error_response_omits_empty_details() {
        let json = serde_json::to_string(&ErrorResponse::new("X", "y")).unwrap();
        assert!(!json.contains("details"));
    }
}
