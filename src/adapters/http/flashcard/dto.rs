//! Request and response bodies for the flashcard endpoints.

use serde::{Deserialize, Serialize};

use crate::application::RecordReviewResult;
use crate::domain::foundation::{FlashCardId, Timestamp};
use crate::domain::spaced_repetition::{FlashCardReview, MasteryLevel};

#[derive(Debug, Clone, Deserialize)]
pub struct RecordReviewRequest {
    /// 0-5 recall rating.
    pub quality: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DueCardsParams {
    pub limit: Option<usize>,
}

/// Review state as exposed to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlashCardReviewView {
    pub flashcard_id: FlashCardId,
    pub easiness_factor: f64,
    pub interval_days: u32,
    pub repetition_count: u32,
    pub review_count: u32,
    pub last_quality: Option<u8>,
    pub last_reviewed_at: Option<Timestamp>,
    pub next_due_at: Timestamp,
}

impl From<FlashCardReview> for FlashCardReviewView {
    fn from(review: FlashCardReview) -> Self {
        Self {
            flashcard_id: review.flashcard_id,
            easiness_factor: review.state.easiness_factor,
            interval_days: review.state.interval_days,
            repetition_count: review.state.repetition_count,
            review_count: review.review_count,
            last_quality: review.last_quality.map(|q| q.value()),
            last_reviewed_at: review.last_reviewed_at,
            next_due_at: review.next_due_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordReviewResponse {
    pub review: FlashCardReviewView,
    pub mastery_level: MasteryLevel,
    pub passed: bool,
}

impl From<RecordReviewResult> for RecordReviewResponse {
    fn from(result: RecordReviewResult) -> Self {
        Self {
            review: result.review.into(),
            mastery_level: result.mastery_level,
            passed: result.passed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DueCardsResponse {
    pub cards: Vec<FlashCardReviewView>,
}
