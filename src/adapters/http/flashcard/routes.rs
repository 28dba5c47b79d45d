//! Axum routes for flashcard reviews.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_mastery_summary, list_due_cards, record_review, FlashCardAppState};

/// # Routes
///
/// All routes require the `X-User-Id` header.
///
/// - `POST /flashcards/:flashcard_id/reviews` - Record a 0-5 rating
/// - `GET /flashcards/due` - Cards due now, earliest first
/// - `GET /flashcards/mastery` - Mastery summary
pub fn flashcard_router() -> Router<FlashCardAppState> {
    Router::new()
        .route("/flashcards/:flashcard_id/reviews", post(record_review))
        .route("/flashcards/due", get(list_due_cards))
        .route("/flashcards/mastery", get(get_mastery_summary))
}
