//! FlashCardReview entity - one learner's progress on one card.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{FlashCardId, Timestamp, UserId};

use super::{
    compute_next_review, MasteryLevel, ReviewQuality, ReviewState, ScheduledReview,
    SchedulerError, SchedulingPolicy,
};

/// Spaced-repetition record owned by a (user, flashcard) pair.
///
/// # Invariants
///
/// - `state.interval_days >= 1` and `state.easiness_factor >= 1.3`
/// - `state` only changes through [`FlashCardReview::apply_review`]
/// - `review_count` never decreases
/// - `version` is 0 until the record is first stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashCardReview {
    pub user_id: UserId,
    pub flashcard_id: FlashCardId,

    /// Current scheduling state.
    pub state: ReviewState,

    /// Quality of the most recent review.
    pub last_quality: Option<ReviewQuality>,

    /// Total reviews recorded, including failed ones.
    pub review_count: u32,

    pub last_reviewed_at: Option<Timestamp>,
    pub next_due_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,

    /// Concurrency token, assigned by the repository on every save.
    pub version: i64,
}

impl FlashCardReview {
    /// Creates an unreviewed record in the initial state, due immediately.
    pub fn new(user_id: UserId, flashcard_id: FlashCardId, now: Timestamp) -> Self {
        Self {
            user_id,
            flashcard_id,
            state: ReviewState::INITIAL,
            last_quality: None,
            review_count: 0,
            last_reviewed_at: None,
            next_due_at: now,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// True until the record has been stored once.
    pub fn is_new(&self) -> bool {
        self.version == 0
    }

    /// Applies a review rating and reschedules the card.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the stored state is corrupt; the record is
    /// left untouched in that case.
    pub fn apply_review(
        &mut self,
        quality: ReviewQuality,
        policy: &SchedulingPolicy,
        now: Timestamp,
    ) -> Result<ScheduledReview, SchedulerError> {
        let scheduled = compute_next_review(&self.state, quality, policy, now)?;

        self.state = scheduled.state;
        self.last_quality = Some(quality);
        self.review_count = self.review_count.saturating_add(1);
        self.last_reviewed_at = Some(now);
        self.next_due_at = scheduled.next_due_at;
        self.updated_at = now;

        Ok(scheduled)
    }

    /// True when the card should be shown at `now`.
    pub fn is_due(&self, now: Timestamp) -> bool {
        !self.next_due_at.is_after(&now)
    }

    /// Current mastery level under `policy`.
    pub fn mastery_level(&self, policy: &SchedulingPolicy) -> MasteryLevel {
        MasteryLevel::classify(&self.state, self.review_count > 0, policy)
    }
}
