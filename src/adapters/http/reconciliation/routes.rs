//! Axum routes for payment reconciliation.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    confirm_payos_return, list_dead_letters, receive_payos_webhook, ReconciliationAppState,
};

/// # Routes
///
/// - `POST /webhooks/payos` - PayOS webhook intake (signature verified during processing)
/// - `GET /payments/payos/return` - Learner return redirect, cross-checked with PayOS
/// - `GET /admin/webhooks/dead-letters` - Operator report of parked deliveries
pub fn reconciliation_router() -> Router<ReconciliationAppState> {
    Router::new()
        .route("/webhooks/payos", post(receive_payos_webhook))
        .route("/payments/payos/return", get(confirm_payos_return))
        .route("/admin/webhooks/dead-letters", get(list_dead_letters))
}
