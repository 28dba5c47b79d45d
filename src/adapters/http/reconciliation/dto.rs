//! Request and response bodies for the reconciliation endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::reconciliation::{DeadLetterView, ReturnOutcome};

/// Acknowledgement PayOS expects once a delivery is stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookAck {
    pub success: bool,
}

/// Result of a return-URL confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReturnConfirmationResponse {
    pub order_code: i64,
    /// One of `confirmed`, `already_completed`, `pending`, `cancelled`.
    pub status: String,
}

impl ReturnConfirmationResponse {
    pub fn new(order_code: i64, outcome: ReturnOutcome) -> Self {
        Self {
            order_code,
            status: outcome.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeadLetterParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeadLetterListResponse {
    pub entries: Vec<DeadLetterView>,
    pub count: usize,
}
