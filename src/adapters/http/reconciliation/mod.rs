//! Payment reconciliation HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{DeadLetterListResponse, ReturnConfirmationResponse, WebhookAck};
pub use handlers::{ReconciliationAppState, PAYOS_SIGNATURE_HEADER};
pub use routes::reconciliation_router;
