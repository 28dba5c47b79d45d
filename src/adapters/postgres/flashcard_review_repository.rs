//! PostgreSQL implementation of FlashCardReviewRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, FlashCardId, Timestamp, UserId};
use crate::domain::spaced_repetition::{FlashCardReview, ReviewQuality, ReviewState};
use crate::ports::FlashCardReviewRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT user_id, flashcard_id, easiness_factor, interval_days, repetition_count,
           last_quality, review_count, last_reviewed_at, next_due_at, created_at, updated_at,
           version
    FROM flashcard_reviews
"#;

pub struct PostgresFlashCardReviewRepository {
    pool: PgPool,
}

impl PostgresFlashCardReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FlashCardReviewRow {
    user_id: String,
    flashcard_id: Uuid,
    easiness_factor: f64,
    interval_days: i32,
    repetition_count: i32,
    last_quality: Option<i16>,
    review_count: i32,
    last_reviewed_at: Option<DateTime<Utc>>,
    next_due_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

impl TryFrom<FlashCardReviewRow> for FlashCardReview {
    type Error = DomainError;

    fn try_from(row: FlashCardReviewRow) -> Result<Self, Self::Error> {
        let last_quality = row
            .last_quality
            .map(|q| ReviewQuality::try_from_i32(i32::from(q)))
            .transpose()
            .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(FlashCardReview {
            user_id: UserId::new(row.user_id)
                .map_err(|e| DomainError::database(format!("Invalid user_id: {}", e)))?,
            flashcard_id: FlashCardId::from_uuid(row.flashcard_id),
            state: ReviewState {
                easiness_factor: row.easiness_factor,
                interval_days: non_negative("interval_days", row.interval_days)?,
                repetition_count: non_negative("repetition_count", row.repetition_count)?,
            },
            last_quality,
            review_count: non_negative("review_count", row.review_count)?,
            last_reviewed_at: row.last_reviewed_at.map(Timestamp::from_datetime),
            next_due_at: Timestamp::from_datetime(row.next_due_at),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            version: row.version,
        })
    }
}

fn non_negative(column: &str, value: i32) -> Result<u32, DomainError> {
    u32::try_from(value)
        .map_err(|_| DomainError::database(format!("Negative {} value: {}", column, value)))
}

fn to_i32(column: &str, value: u32) -> Result<i32, DomainError> {
    i32::try_from(value)
        .map_err(|_| DomainError::database(format!("{} out of range: {}", column, value)))
}

fn query_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl FlashCardReviewRepository for PostgresFlashCardReviewRepository {
    async fn find(
        &self,
        user_id: &UserId,
        flashcard_id: &FlashCardId,
    ) -> Result<Option<FlashCardReview>, DomainError> {
        let row: Option<FlashCardReviewRow> = sqlx::query_as(&format!(
            "{} WHERE user_id = $1 AND flashcard_id = $2",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_str())
        .bind(flashcard_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("find flashcard review", e))?;

        row.map(FlashCardReview::try_from).transpose()
    }

    async fn save(&self, review: &FlashCardReview) -> Result<i64, DomainError> {
        let new_version: Option<i64> = if review.is_new() {
            // A concurrent first review of the same pair loses the primary key
            // race and gets no row back.
            sqlx::query_scalar(
                r#"
                INSERT INTO flashcard_reviews (
                    user_id, flashcard_id, easiness_factor, interval_days, repetition_count,
                    last_quality, review_count, last_reviewed_at, next_due_at, created_at,
                    updated_at, version
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 1)
                ON CONFLICT (user_id, flashcard_id) DO NOTHING
                RETURNING version
                "#,
            )
            .bind(review.user_id.as_str())
            .bind(review.flashcard_id.as_uuid())
            .bind(review.state.easiness_factor)
            .bind(to_i32("interval_days", review.state.interval_days)?)
            .bind(to_i32("repetition_count", review.state.repetition_count)?)
            .bind(review.last_quality.map(|q| i16::from(q.value())))
            .bind(to_i32("review_count", review.review_count)?)
            .bind(review.last_reviewed_at.as_ref().map(Timestamp::as_datetime))
            .bind(review.next_due_at.as_datetime())
            .bind(review.created_at.as_datetime())
            .bind(review.updated_at.as_datetime())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("insert flashcard review", e))?
        } else {
            sqlx::query_scalar(
                r#"
                UPDATE flashcard_reviews SET
                    easiness_factor = $4,
                    interval_days = $5,
                    repetition_count = $6,
                    last_quality = $7,
                    review_count = $8,
                    last_reviewed_at = $9,
                    next_due_at = $10,
                    updated_at = $11,
                    version = version + 1
                WHERE user_id = $1 AND flashcard_id = $2 AND version = $3
                RETURNING version
                "#,
            )
            .bind(review.user_id.as_str())
            .bind(review.flashcard_id.as_uuid())
            .bind(review.version)
            .bind(review.state.easiness_factor)
            .bind(to_i32("interval_days", review.state.interval_days)?)
            .bind(to_i32("repetition_count", review.state.repetition_count)?)
            .bind(review.last_quality.map(|q| i16::from(q.value())))
            .bind(to_i32("review_count", review.review_count)?)
            .bind(review.last_reviewed_at.as_ref().map(Timestamp::as_datetime))
            .bind(review.next_due_at.as_datetime())
            .bind(review.updated_at.as_datetime())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("update flashcard review", e))?
        };

        new_version.ok_or_else(|| {
            DomainError::conflict(format!(
                "Review of flashcard {} by {} was modified concurrently",
                review.flashcard_id, review.user_id
            ))
        })
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<FlashCardReview>, DomainError> {
        let rows: Vec<FlashCardReviewRow> = sqlx::query_as(&format!(
            "{} WHERE user_id = $1 ORDER BY created_at ASC",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("list flashcard reviews", e))?;

        rows.into_iter().map(FlashCardReview::try_from).collect()
    }

    async fn list_due(
        &self,
        user_id: &UserId,
        now: Timestamp,
        limit: usize,
    ) -> Result<Vec<FlashCardReview>, DomainError> {
        let rows: Vec<FlashCardReviewRow> = sqlx::query_as(&format!(
            "{} WHERE user_id = $1 AND next_due_at <= $2 ORDER BY next_due_at ASC LIMIT $3",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_str())
        .bind(now.as_datetime())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("list due flashcard reviews", e))?;

        rows.into_iter().map(FlashCardReview::try_from).collect()
    }
}
