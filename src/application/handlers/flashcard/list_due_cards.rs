//! ListDueCardsHandler - cards a learner should review now.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::spaced_repetition::FlashCardReview;
use crate::ports::FlashCardReviewRepository;

use super::FlashCardReviewError;

/// Largest page a caller may request.
pub const MAX_DUE_CARDS: usize = 200;

#[derive(Debug, Clone)]
pub struct ListDueCardsQuery {
    pub user_id: UserId,
    pub limit: usize,
}

pub struct ListDueCardsHandler {
    repository: Arc<dyn FlashCardReviewRepository>,
}

impl ListDueCardsHandler {
    pub fn new(repository: Arc<dyn FlashCardReviewRepository>) -> Self {
        Self { repository }
    }

    /// Due reviews, earliest due first.
    pub async fn handle(
        &self,
        query: ListDueCardsQuery,
    ) -> Result<Vec<FlashCardReview>, FlashCardReviewError> {
        let limit = query.limit.clamp(1, MAX_DUE_CARDS);
        Ok(self
            .repository
            .list_due(&query.user_id, Timestamp::now(), limit)
            .await?)
    }
}
