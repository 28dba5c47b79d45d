//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::flashcard::{
    FlashCardReviewError, GetMasterySummaryHandler, GetMasterySummaryQuery, ListDueCardsHandler,
    ListDueCardsQuery, RecordReviewCommand, RecordReviewHandler, RecordReviewResult,
};
pub use handlers::reconciliation::{
    ConfirmReturnUrlHandler, EnqueueWebhookCommand, EnqueueWebhookHandler, ListDeadLettersHandler,
    PaymentSettlement, ProcessOutcome, ProcessWebhookEntryHandler, ReturnOutcome,
    SweepWebhookQueueHandler,
};
