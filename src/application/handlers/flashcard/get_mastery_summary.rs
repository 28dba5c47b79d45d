//! GetMasterySummaryHandler - per-learner mastery statistics.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::spaced_repetition::{MasterySummary, SchedulingPolicy};
use crate::ports::FlashCardReviewRepository;

use super::FlashCardReviewError;

#[derive(Debug, Clone)]
pub struct GetMasterySummaryQuery {
    pub user_id: UserId,
}

pub struct GetMasterySummaryHandler {
    repository: Arc<dyn FlashCardReviewRepository>,
    policy: SchedulingPolicy,
}

impl GetMasterySummaryHandler {
    pub fn new(repository: Arc<dyn FlashCardReviewRepository>, policy: SchedulingPolicy) -> Self {
        Self { repository, policy }
    }

    pub async fn handle(
        &self,
        query: GetMasterySummaryQuery,
    ) -> Result<MasterySummary, FlashCardReviewError> {
        let reviews = self.repository.list_by_user(&query.user_id).await?;
        Ok(MasterySummary::summarize(&reviews, &self.policy, Timestamp::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryFlashCardReviewRepository;
    use crate::domain::foundation::FlashCardId;
    use crate::domain::spaced_repetition::{FlashCardReview, ReviewQuality};

    #[tokio::test]
    async fn summarizes_only_the_learners_cards() {
        let repo = Arc::new(InMemoryFlashCardReviewRepository::new());
        let policy = SchedulingPolicy::demo();
        let learner = UserId::new("learner-1").unwrap();
        let other = UserId::new("learner-2").unwrap();
        let now = Timestamp::now();

        let mut mastered = FlashCardReview::new(learner.clone(), FlashCardId::new(), now);
        mastered.apply_review(ReviewQuality::Perfect, &policy, now).unwrap();
        repo.save(&mastered).await.unwrap();
        repo.save(&FlashCardReview::new(learner.clone(), FlashCardId::new(), now))
            .await
            .unwrap();
        repo.save(&FlashCardReview::new(other, FlashCardId::new(), now))
            .await
            .unwrap();

        let summary = GetMasterySummaryHandler::new(repo, policy)
            .handle(GetMasterySummaryQuery { user_id: learner })
            .await
            .unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.mastered, 1);
        assert_eq!(summary.new_cards, 1);
        assert_eq!(summary.due_now, 1);
    }

    #[tokio::test]
    async fn learner_without_cards_gets_empty_summary() {
        let repo = Arc::new(InMemoryFlashCardReviewRepository::new());

        let summary = GetMasterySummaryHandler::new(repo, SchedulingPolicy::default())
            .handle(GetMasterySummaryQuery {
                user_id: UserId::new("nobody").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_easiness, 0.0);
    }
}
