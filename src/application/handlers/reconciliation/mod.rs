//! Payment webhook reconciliation handlers.
//!
//! - `EnqueueWebhookHandler` - persist an inbound delivery
//! - `ProcessWebhookEntryHandler` - apply one delivery at most once
//! - `SweepWebhookQueueHandler` - retry due deliveries
//! - `ConfirmReturnUrlHandler` - verify a learner's return redirect
//! - `ListDeadLettersHandler` - operator report

mod confirm_return_url;
mod dead_letter_report;
mod enqueue_webhook;
mod process_webhook_entry;
mod settlement;
mod sweep_webhook_queue;

pub use confirm_return_url::{ConfirmReturnUrlHandler, ReturnOutcome};
pub use dead_letter_report::{DeadLetterView, ListDeadLettersHandler, MAX_DEAD_LETTER_REPORT};
pub use enqueue_webhook::{EnqueueWebhookCommand, EnqueueWebhookHandler};
pub use process_webhook_entry::{ProcessOutcome, ProcessWebhookEntryHandler};
pub use settlement::{ConfirmedPayment, PaymentSettlement, SettlementOutcome};
pub use sweep_webhook_queue::{SweepReport, SweepWebhookQueueHandler};
