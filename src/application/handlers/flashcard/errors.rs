//! Errors surfaced by the flashcard review handlers.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;
use crate::domain::spaced_repetition::SchedulerError;

#[derive(Debug, Clone, Error)]
pub enum FlashCardReviewError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// Other writers kept changing the review while this one was applied.
    #[error("Review of this flashcard changed concurrently after {attempts} attempts")]
    ConcurrentUpdate { attempts: u32 },

    #[error("Repository error: {0}")]
    Repository(#[from] DomainError),
}

impl FlashCardReviewError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FlashCardReviewError::Scheduler(SchedulerError::InvalidQuality(_)) => {
                StatusCode::BAD_REQUEST
            }
            FlashCardReviewError::Scheduler(SchedulerError::InvalidState(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            FlashCardReviewError::ConcurrentUpdate { .. } => StatusCode::CONFLICT,
            FlashCardReviewError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
