//! HTTP handlers for flashcard reviews.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::{
    GetMasterySummaryHandler, GetMasterySummaryQuery, ListDueCardsHandler, ListDueCardsQuery,
    RecordReviewCommand, RecordReviewHandler,
};
use crate::domain::foundation::FlashCardId;

use super::super::error::FlashCardApiError;
use super::super::extract::AuthenticatedUser;
use super::dto::{DueCardsParams, DueCardsResponse, RecordReviewRequest, RecordReviewResponse};

const DEFAULT_DUE_LIMIT: usize = 20;

#[derive(Clone)]
pub struct FlashCardAppState {
    pub record_review: Arc<RecordReviewHandler>,
    pub mastery_summary: Arc<GetMasterySummaryHandler>,
    pub due_cards: Arc<ListDueCardsHandler>,
}

/// POST /flashcards/:flashcard_id/reviews
pub async fn record_review(
    State(state): State<FlashCardAppState>,
    user: AuthenticatedUser,
    Path(flashcard_id): Path<Uuid>,
    Json(request): Json<RecordReviewRequest>,
) -> Result<impl IntoResponse, FlashCardApiError> {
    let result = state
        .record_review
        .handle(RecordReviewCommand {
            user_id: user.user_id,
            flashcard_id: FlashCardId::from_uuid(flashcard_id),
            quality: request.quality,
        })
        .await?;

    Ok(Json(RecordReviewResponse::from(result)))
}

/// GET /flashcards/due
pub async fn list_due_cards(
    State(state): State<FlashCardAppState>,
    user: AuthenticatedUser,
    Query(params): Query<DueCardsParams>,
) -> Result<impl IntoResponse, FlashCardApiError> {
    let reviews = state
        .due_cards
        .handle(ListDueCardsQuery {
            user_id: user.user_id,
            limit: params.limit.unwrap_or(DEFAULT_DUE_LIMIT),
        })
        .await?;

    Ok(Json(DueCardsResponse {
        cards: reviews.into_iter().map(Into::into).collect(),
    }))
}

/// GET /flashcards/mastery
pub async fn get_mastery_summary(
    State(state): State<FlashCardAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, FlashCardApiError> {
    let summary = state
        .mastery_summary
        .handle(GetMasterySummaryQuery {
            user_id: user.user_id,
        })
        .await?;

    Ok(Json(summary))
}
