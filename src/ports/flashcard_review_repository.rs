//! Flashcard review repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, FlashCardId, Timestamp, UserId};
use crate::domain::spaced_repetition::FlashCardReview;

/// Persistence for per-learner flashcard review state.
///
/// One record per (user, flashcard) pair.
#[async_trait]
pub trait FlashCardReviewRepository: Send + Sync {
    async fn find(
        &self,
        user_id: &UserId,
        flashcard_id: &FlashCardId,
    ) -> Result<Option<FlashCardReview>, DomainError>;

    /// Store the record for the review's (user, flashcard) pair, returning
    /// its new version.
    ///
    /// A review with version 0 is inserted; any other version replaces the
    /// stored record only if the stored version still matches.
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if a new review's pair already exists, or the
    ///   stored version differs from `review.version`
    async fn save(&self, review: &FlashCardReview) -> Result<i64, DomainError>;

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<FlashCardReview>, DomainError>;

    /// Reviews with `next_due_at <= now`, earliest due first.
    async fn list_due(
        &self,
        user_id: &UserId,
        now: Timestamp,
        limit: usize,
    ) -> Result<Vec<FlashCardReview>, DomainError>;
}
