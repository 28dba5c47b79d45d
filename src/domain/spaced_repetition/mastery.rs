//! Mastery classification and per-learner statistics.
//!
//! Mastery is always derived from the current review state and the policy;
//! it is never stored as authoritative.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Percentage, Timestamp};

use super::{FlashCardReview, ReviewState, SchedulingPolicy};

/// Where a card sits on the path to mastery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryLevel {
    /// Never reviewed.
    New,
    Learning,
    NearMastery,
    Mastered,
}

impl MasteryLevel {
    /// Classifies a review state.
    ///
    /// `reviewed` is false only for cards that have no recorded review yet.
    pub fn classify(state: &ReviewState, reviewed: bool, policy: &SchedulingPolicy) -> Self {
        if !reviewed {
            return MasteryLevel::New;
        }
        if is_mastered(state, policy) {
            return MasteryLevel::Mastered;
        }
        if state.interval_days >= policy.near_mastery_interval_days {
            return MasteryLevel::NearMastery;
        }
        MasteryLevel::Learning
    }
}

/// True when the interval and repetition thresholds are both reached.
pub fn is_mastered(state: &ReviewState, policy: &SchedulingPolicy) -> bool {
    state.interval_days >= policy.mastery_interval_days
        && state.repetition_count >= policy.mastery_minimum_repetitions
}

/// Aggregate mastery statistics for one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterySummary {
    pub total: usize,
    pub new_cards: usize,
    pub learning: usize,
    pub near_mastery: usize,
    pub mastered: usize,
    pub due_now: usize,
    /// Mean easiness factor across reviewed cards, 0.0 when there are none.
    pub average_easiness: f64,
    pub mastered_percentage: Percentage,
}

impl MasterySummary {
    /// Summarizes a learner's reviews as of `now`.
    pub fn summarize(reviews: &[FlashCardReview], policy: &SchedulingPolicy, now: Timestamp) -> Self {
        let mut summary = MasterySummary {
            total: reviews.len(),
            new_cards: 0,
            learning: 0,
            near_mastery: 0,
            mastered: 0,
            due_now: 0,
            average_easiness: 0.0,
            mastered_percentage: Percentage::ZERO,
        };

        let mut easiness_sum = 0.0;
        let mut reviewed = 0usize;

        for review in reviews {
            match review.mastery_level(policy) {
                MasteryLevel::New => summary.new_cards += 1,
                MasteryLevel::Learning => summary.learning += 1,
                MasteryLevel::NearMastery => summary.near_mastery += 1,
                MasteryLevel::Mastered => summary.mastered += 1,
            }
            if review.is_due(now) {
                summary.due_now += 1;
            }
            if review.review_count > 0 {
                easiness_sum += review.state.easiness_factor;
                reviewed += 1;
            }
        }

        if reviewed > 0 {
            summary.average_easiness = easiness_sum / reviewed as f64;
        }
        summary.mastered_percentage = Percentage::from_ratio(summary.mastered, summary.total);
        summary
    }
}
