//! Spaced repetition - SM-2 scheduling and mastery tracking for flashcards.
//!
//! # Module Organization
//!
//! - `quality` - 0-5 review rating value object
//! - `policy` - Thresholds for pass/fail and mastery
//! - `scheduler` - Pure SM-2 next-review computation
//! - `review` - Per-learner flashcard review entity
//! - `mastery` - Mastery classification and summary statistics

mod errors;
mod mastery;
mod policy;
mod quality;
mod review;
mod scheduler;

pub use errors::SchedulerError;
pub use mastery::{is_mastered, MasteryLevel, MasterySummary};
pub use policy::{SchedulingPolicy, MAX_INTERVAL_DAYS};
pub use quality::ReviewQuality;
pub use review::FlashCardReview;
pub use scheduler::{
    compute_next_review, compute_next_review_raw, next_easiness_factor, ReviewState,
    ScheduledReview, INITIAL_EASINESS_FACTOR, INITIAL_INTERVAL_DAYS, MINIMUM_EASINESS_FACTOR,
};
