//! HTTP adapters - REST API implementations.
//!
//! Each area has its own router and state; `api_router` merges them and
//! adds request tracing.

pub mod error;
pub mod extract;
pub mod flashcard;
pub mod reconciliation;

use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use error::ErrorResponse;
pub use flashcard::{flashcard_router, FlashCardAppState};
pub use reconciliation::{reconciliation_router, ReconciliationAppState};

/// Builds the complete API router.
pub fn api_router(reconciliation: ReconciliationAppState, flashcards: FlashCardAppState) -> Router {
    Router::new()
        .merge(reconciliation_router().with_state(reconciliation))
        .merge(flashcard_router().with_state(flashcards))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
