//! RecordReviewHandler - applies a learner's rating to one flashcard.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::foundation::{FlashCardId, Timestamp, UserId};
use crate::domain::spaced_repetition::{
    FlashCardReview, MasteryLevel, ReviewQuality, SchedulingPolicy,
};
use crate::ports::FlashCardReviewRepository;

use super::FlashCardReviewError;

/// Load-apply-save rounds tried before a contended review gives up.
pub const MAX_SAVE_ATTEMPTS: u32 = 3;

/// Command to record one review.
#[derive(Debug, Clone)]
pub struct RecordReviewCommand {
    pub user_id: UserId,
    pub flashcard_id: FlashCardId,
    /// Raw 0-5 rating as submitted.
    pub quality: i32,
}

/// Result of a recorded review.
#[derive(Debug, Clone)]
pub struct RecordReviewResult {
    pub review: FlashCardReview,
    pub mastery_level: MasteryLevel,
    /// Whether the rating counted as a successful recall.
    pub passed: bool,
}

pub struct RecordReviewHandler {
    repository: Arc<dyn FlashCardReviewRepository>,
    policy: SchedulingPolicy,
}

impl RecordReviewHandler {
    pub fn new(repository: Arc<dyn FlashCardReviewRepository>, policy: SchedulingPolicy) -> Self {
        Self { repository, policy }
    }

    /// Records the rating against the latest stored review.
    ///
    /// A save that loses to a concurrent writer reloads the review and
    /// applies the rating again, so neither rating is lost.
    pub async fn handle(
        &self,
        cmd: RecordReviewCommand,
    ) -> Result<RecordReviewResult, FlashCardReviewError> {
        // Reject bad ratings before touching storage
        let quality = ReviewQuality::try_from_i32(cmd.quality)?;

        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            let now = Timestamp::now();
            let mut review = self
                .repository
                .find(&cmd.user_id, &cmd.flashcard_id)
                .await?
                .unwrap_or_else(|| {
                    FlashCardReview::new(cmd.user_id.clone(), cmd.flashcard_id, now)
                });

            let scheduled = review.apply_review(quality, &self.policy, now)?;
            match self.repository.save(&review).await {
                Ok(version) => review.version = version,
                Err(e) if e.is_conflict() => {
                    warn!(
                        user_id = %cmd.user_id,
                        flashcard_id = %cmd.flashcard_id,
                        attempt,
                        "Flashcard review changed concurrently, reapplying"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            }

            let mastery_level = review.mastery_level(&self.policy);

            debug!(
                user_id = %review.user_id,
                flashcard_id = %review.flashcard_id,
                quality = quality.value(),
                interval_days = review.state.interval_days,
                easiness_factor = review.state.easiness_factor,
                mastery = ?mastery_level,
                "Flashcard review recorded"
            );

            return Ok(RecordReviewResult {
                review,
                mastery_level,
                passed: scheduled.passed,
            });
        }

        Err(FlashCardReviewError::ConcurrentUpdate {
            attempts: MAX_SAVE_ATTEMPTS,
        })
    }
}
