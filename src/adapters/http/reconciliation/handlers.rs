//! HTTP handlers for PayOS webhooks, return redirects and the dead-letter report.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use tracing::warn;

use crate::application::handlers::reconciliation::{
    ConfirmReturnUrlHandler, EnqueueWebhookCommand, EnqueueWebhookHandler, ListDeadLettersHandler,
    ProcessWebhookEntryHandler,
};
use crate::domain::webhook::ReturnCallback;

use super::super::error::WebhookApiError;
use super::dto::{
    DeadLetterListResponse, DeadLetterParams, ReturnConfirmationResponse, WebhookAck,
};

/// Header PayOS may use to carry the signature outside the body.
pub const PAYOS_SIGNATURE_HEADER: &str = "x-payos-signature";

const DEFAULT_DEAD_LETTER_LIMIT: usize = 50;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ReconciliationAppState {
    pub enqueue: Arc<EnqueueWebhookHandler>,
    pub processor: Arc<ProcessWebhookEntryHandler>,
    pub return_confirmation: Arc<ConfirmReturnUrlHandler>,
    pub dead_letters: Arc<ListDeadLettersHandler>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/payos
///
/// Stores the raw delivery, acknowledges it, then processes it in the
/// background. A delivery that fails processing here is picked up again by
/// the sweep worker.
pub async fn receive_payos_webhook(
    State(state): State<ReconciliationAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(PAYOS_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let entry = state
        .enqueue
        .handle(EnqueueWebhookCommand {
            payload: body.to_vec(),
            signature,
        })
        .await?;

    let processor = state.processor.clone();
    tokio::spawn(async move {
        let entry_id = entry.id;
        if let Err(e) = processor.process(entry).await {
            warn!(entry_id = %entry_id, error = %e, "Immediate webhook processing failed");
        }
    });

    Ok(Json(WebhookAck { success: true }))
}

/// GET /payments/payos/return
pub async fn confirm_payos_return(
    State(state): State<ReconciliationAppState>,
    Query(callback): Query<ReturnCallback>,
) -> Result<impl IntoResponse, WebhookApiError> {
    let order_code = callback.order_code;
    let outcome = state.return_confirmation.handle(callback).await?;
    Ok(Json(ReturnConfirmationResponse::new(order_code, outcome)))
}

/// GET /admin/webhooks/dead-letters
pub async fn list_dead_letters(
    State(state): State<ReconciliationAppState>,
    Query(params): Query<DeadLetterParams>,
) -> Result<impl IntoResponse, WebhookApiError> {
    let entries = state
        .dead_letters
        .handle(params.limit.unwrap_or(DEFAULT_DEAD_LETTER_LIMIT))
        .await?;
    Ok(Json(DeadLetterListResponse {
        count: entries.len(),
        entries,
    }))
}
