//! In-memory FlashCardReviewRepository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, FlashCardId, Timestamp, UserId};
use crate::domain::spaced_repetition::FlashCardReview;
use crate::ports::FlashCardReviewRepository;

#[derive(Default)]
pub struct InMemoryFlashCardReviewRepository {
    reviews: RwLock<HashMap<(UserId, FlashCardId), FlashCardReview>>,
}

impl InMemoryFlashCardReviewRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlashCardReviewRepository for InMemoryFlashCardReviewRepository {
    async fn find(
        &self,
        user_id: &UserId,
        flashcard_id: &FlashCardId,
    ) -> Result<Option<FlashCardReview>, DomainError> {
        let key = (user_id.clone(), *flashcard_id);
        Ok(self.reviews.read().await.get(&key).cloned())
    }

    async fn save(&self, review: &FlashCardReview) -> Result<i64, DomainError> {
        let key = (review.user_id.clone(), review.flashcard_id);
        let mut reviews = self.reviews.write().await;

        let stored_version = reviews.get(&key).map(|r| r.version).unwrap_or(0);
        if stored_version != review.version {
            return Err(DomainError::conflict(format!(
                "Review of flashcard {} is at version {}, save was based on {}",
                review.flashcard_id, stored_version, review.version
            )));
        }

        let next_version = review.version + 1;
        reviews.insert(
            key,
            FlashCardReview {
                version: next_version,
                ..review.clone()
            },
        );
        Ok(next_version)
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<FlashCardReview>, DomainError> {
        let mut reviews: Vec<_> = self
            .reviews
            .read()
            .await
            .values()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect();
        reviews.sort_by_key(|r| r.created_at);
        Ok(reviews)
    }

    async fn list_due(
        &self,
        user_id: &UserId,
        now: Timestamp,
        limit: usize,
    ) -> Result<Vec<FlashCardReview>, DomainError> {
        let mut due: Vec<_> = self
            .reviews
            .read()
            .await
            .values()
            .filter(|r| &r.user_id == user_id && r.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|r| r.next_due_at);
        due.truncate(limit);
        Ok(due)
    }
}
