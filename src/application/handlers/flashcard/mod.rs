//! Flashcard review handlers.

mod errors;
mod get_mastery_summary;
mod list_due_cards;
mod record_review;

pub use errors::FlashCardReviewError;
pub use get_mastery_summary::{GetMasterySummaryHandler, GetMasterySummaryQuery};
pub use list_due_cards::{ListDueCardsHandler, ListDueCardsQuery, MAX_DUE_CARDS};
pub use record_review::{RecordReviewCommand, RecordReviewHandler, RecordReviewResult};
