//! SM-2 review scheduling.
//!
//! Pure transformation of a card's review state given a quality rating:
//!
//! 1. The easiness factor moves by `0.1 - (5-q)*(0.08 + (5-q)*0.02)`, floored at 1.3.
//! 2. A failed recall (quality below the policy's pass mark) resets the
//!    repetition count to 0 and the interval to 1 day.
//! 3. A passed recall increments the repetition count; the interval becomes
//!    1 day, then 6 days, then `round(previous_interval * new_ef)`.
//! 4. The next due date is `now + interval` days.
//!
//! Time is passed in so results are deterministic.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::{ReviewQuality, SchedulerError, SchedulingPolicy};

/// Lowest easiness factor a card can have.
pub const MINIMUM_EASINESS_FACTOR: f64 = 1.3;

/// Easiness factor of a card that has never been reviewed.
pub const INITIAL_EASINESS_FACTOR: f64 = 2.5;

/// Interval (days) of a card that has never been reviewed.
pub const INITIAL_INTERVAL_DAYS: u32 = 1;

/// The numeric scheduling state of one card for one learner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub easiness_factor: f64,
    pub interval_days: u32,
    pub repetition_count: u32,
}

impl ReviewState {
    /// State of a card before its first review.
    pub const INITIAL: ReviewState = ReviewState {
        easiness_factor: INITIAL_EASINESS_FACTOR,
        interval_days: INITIAL_INTERVAL_DAYS,
        repetition_count: 0,
    };

    /// Checks the scheduler's preconditions on stored state.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.interval_days < 1 {
            return Err(SchedulerError::InvalidState(format!(
                "interval_days must be at least 1, got {}",
                self.interval_days
            )));
        }
        if !self.easiness_factor.is_finite() || self.easiness_factor < MINIMUM_EASINESS_FACTOR {
            return Err(SchedulerError::InvalidState(format!(
                "easiness_factor must be at least {}, got {}",
                MINIMUM_EASINESS_FACTOR, self.easiness_factor
            )));
        }
        Ok(())
    }
}

impl Default for ReviewState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Result of scheduling one review.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledReview {
    /// State after applying the review.
    pub state: ReviewState,

    /// When the card is next due.
    pub next_due_at: Timestamp,

    /// Whether the rating counted as a successful recall.
    pub passed: bool,
}

/// Computes the next review state for a card.
///
/// # Errors
///
/// - `InvalidState` if `state.interval_days < 1` or `state.easiness_factor < 1.3`
pub fn compute_next_review(
    state: &ReviewState,
    quality: ReviewQuality,
    policy: &SchedulingPolicy,
    now: Timestamp,
) -> Result<ScheduledReview, SchedulerError> {
    state.validate()?;

    let easiness_factor = next_easiness_factor(state.easiness_factor, quality);
    let passed = quality.value() >= policy.minimum_pass_quality;

    let (interval_days, repetition_count) = if passed {
        let repetitions = state.repetition_count.saturating_add(1);
        let interval = match repetitions {
            1 => 1,
            2 => 6,
            _ => grow_interval(state.interval_days, easiness_factor),
        };
        (interval.min(policy.maximum_interval_days).max(1), repetitions)
    } else {
        (1, 0)
    };

    Ok(ScheduledReview {
        state: ReviewState {
            easiness_factor,
            interval_days,
            repetition_count,
        },
        next_due_at: now.add_days(i64::from(interval_days)),
        passed,
    })
}

/// Like [`compute_next_review`] but takes a raw integer rating.
///
/// # Errors
///
/// - `InvalidQuality` if `quality` is outside 0..=5
/// - `InvalidState` as for [`compute_next_review`]
pub fn compute_next_review_raw(
    state: &ReviewState,
    quality: i32,
    policy: &SchedulingPolicy,
    now: Timestamp,
) -> Result<ScheduledReview, SchedulerError> {
    let quality = ReviewQuality::try_from_i32(quality)?;
    compute_next_review(state, quality, policy, now)
}

/// SM-2 easiness update, floored at [`MINIMUM_EASINESS_FACTOR`].
pub fn next_easiness_factor(current: f64, quality: ReviewQuality) -> f64 {
    let distance = 5.0 - f64::from(quality.value());
    let updated = current + (0.1 - distance * (0.08 + distance * 0.02));
    updated.max(MINIMUM_EASINESS_FACTOR)
}

fn grow_interval(previous: u32, easiness_factor: f64) -> u32 {
    let grown = (f64::from(previous) * easiness_factor).round();
    if grown >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        grown as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
    }

    fn review(state: ReviewState, quality: i32) -> ScheduledReview {
        compute_next_review_raw(&state, quality, &SchedulingPolicy::default(), now()).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ══════════════════════════════════════════════════════════════
    // Easiness Factor
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn easiness_delta_per_quality_matches_formula() {
        let expected = [-0.8, -0.54, -0.32, -0.14, 0.0, 0.1];
        for (quality, delta) in ReviewQuality::ALL.iter().zip(expected) {
            let ef = next_easiness_factor(2.5, *quality);
            assert!(approx(ef, 2.5 + delta), "quality {} gave {}", quality, ef);
        }
    }

    #[test]
    fn easiness_is_floored_at_minimum() {
        let ef = next_easiness_factor(1.4, ReviewQuality::Blackout);
        assert_eq!(ef, MINIMUM_EASINESS_FACTOR);
    }

    // ══════════════════════════════════════════════════════════════
    // Failed Recall
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn failed_recall_resets_progress() {
        let state = ReviewState {
            easiness_factor: 2.2,
            interval_days: 40,
            repetition_count: 6,
        };

        for quality in 0..=2 {
            let next = review(state, quality);
            assert_eq!(next.state.repetition_count, 0);
            assert_eq!(next.state.interval_days, 1);
            assert!(!next.passed);
        }
    }

    #[test]
    fn failed_recall_still_lowers_easiness() {
        let next = review(ReviewState::INITIAL, 2);
        assert!(next.state.easiness_factor < INITIAL_EASINESS_FACTOR);
    }

    #[test]
    fn pass_mark_follows_policy() {
        let strict = SchedulingPolicy {
            minimum_pass_quality: 4,
            ..Default::default()
        };
        let next = compute_next_review_raw(&ReviewState::INITIAL, 3, &strict, now()).unwrap();
        assert!(!next.passed);
        assert_eq!(next.state.repetition_count, 0);
    }

    // ══════════════════════════════════════════════════════════════
    // Passed Recall
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn first_pass_schedules_one_day() {
        for quality in 3..=5 {
            let next = review(ReviewState::INITIAL, quality);
            assert_eq!(next.state.repetition_count, 1);
            assert_eq!(next.state.interval_days, 1);
            assert!(next.passed);
        }
    }

    #[test]
    fn second_pass_schedules_six_days() {
        let state = ReviewState {
            easiness_factor: 2.5,
            interval_days: 1,
            repetition_count: 1,
        };
        for quality in 3..=5 {
            let next = review(state, quality);
            assert_eq!(next.state.repetition_count, 2);
            assert_eq!(next.state.interval_days, 6);
        }
    }

    #[test]
    fn later_passes_multiply_by_new_easiness() {
        let state = ReviewState {
            easiness_factor: 2.5,
            interval_days: 6,
            repetition_count: 2,
        };
        let next = review(state, 5);
        // ef' = 2.6, round(6 * 2.6) = 16
        assert_eq!(next.state.interval_days, 16);
        assert_eq!(next.state.repetition_count, 3);
    }

    #[test]
    fn quality_four_sequence_trace() {
        let mut state = ReviewState::INITIAL;
        let mut intervals = Vec::new();
        let mut factors = Vec::new();
        for _ in 0..3 {
            let next = review(state, 4);
            intervals.push(next.state.interval_days);
            factors.push(next.state.easiness_factor);
            state = next.state;
        }

        // Quality 4 leaves the easiness factor unchanged.
        assert!(factors.iter().all(|ef| approx(*ef, 2.5)));
        assert_eq!(intervals, vec![1, 6, (6.0_f64 * factors[2]).round() as u32]);
        assert_eq!(intervals[2], 15);
    }

    #[test]
    fn quality_five_sequence_trace() {
        let mut state = ReviewState::INITIAL;
        let mut intervals = Vec::new();
        let mut factors = Vec::new();
        for _ in 0..3 {
            let next = review(state, 5);
            intervals.push(next.state.interval_days);
            factors.push(next.state.easiness_factor);
            state = next.state;
        }

        assert!(approx(factors[0], 2.6));
        assert!(approx(factors[1], 2.7));
        assert!(approx(factors[2], 2.8));
        // round(6 * 2.8) = round(16.8) = 17
        assert_eq!(intervals, vec![1, 6, 17]);
    }

    #[test]
    fn interval_is_capped_by_policy() {
        let policy = SchedulingPolicy {
            maximum_interval_days: 100,
            ..Default::default()
        };
        let state = ReviewState {
            easiness_factor: 2.5,
            interval_days: 90,
            repetition_count: 8,
        };
        let next = compute_next_review_raw(&state, 5, &policy, now()).unwrap();
        assert_eq!(next.state.interval_days, 100);
    }

    #[test]
    fn huge_interval_under_unbounded_policy_does_not_overflow() {
        let policy = SchedulingPolicy {
            maximum_interval_days: u32::MAX,
            ..Default::default()
        };
        let state = ReviewState {
            easiness_factor: 2.5,
            interval_days: 200_000_000,
            repetition_count: 12,
        };
        let next = compute_next_review(&state, ReviewQuality::Perfect, &policy, now()).unwrap();
        assert!(next.state.interval_days >= 200_000_000);
        assert!(next.next_due_at > now());
    }

    #[test]
    fn next_due_is_interval_days_after_now() {
        let state = ReviewState {
            easiness_factor: 2.5,
            interval_days: 1,
            repetition_count: 1,
        };
        let next = review(state, 4);
        assert_eq!(next.next_due_at, now().add_days(6));
    }

    // ══════════════════════════════════════════════════════════════
    // Input Validation
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn rejects_quality_out_of_range() {
        let policy = SchedulingPolicy::default();
        let result = compute_next_review_raw(&ReviewState::INITIAL, 6, &policy, now());
        assert_eq!(result, Err(SchedulerError::InvalidQuality(6)));

        let result = compute_next_review_raw(&ReviewState::INITIAL, -1, &policy, now());
        assert_eq!(result, Err(SchedulerError::InvalidQuality(-1)));
    }

    #[test]
    fn rejects_zero_interval_state() {
        let state = ReviewState {
            interval_days: 0,
            ..ReviewState::INITIAL
        };
        let result = compute_next_review(
            &state,
            ReviewQuality::Perfect,
            &SchedulingPolicy::default(),
            now(),
        );
        assert!(matches!(result, Err(SchedulerError::InvalidState(_))));
    }

    #[test]
    fn rejects_easiness_below_floor() {
        let state = ReviewState {
            easiness_factor: 1.2,
            ..ReviewState::INITIAL
        };
        assert!(matches!(state.validate(), Err(SchedulerError::InvalidState(_))));

        let state = ReviewState {
            easiness_factor: f64::NAN,
            ..ReviewState::INITIAL
        };
        assert!(matches!(state.validate(), Err(SchedulerError::InvalidState(_))));
    }
}
