//! Flashcard review HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{DueCardsResponse, FlashCardReviewView, RecordReviewResponse};
pub use handlers::FlashCardAppState;
pub use routes::flashcard_router;
