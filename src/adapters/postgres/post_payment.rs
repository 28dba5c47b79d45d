//! PostgreSQL post-payment strategies.
//!
//! Both inserts are keyed so that running a strategy twice for the same
//! payment leaves exactly one row.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::payment::{Payment, ProductType};
use crate::ports::PostPaymentStrategy;

/// Enrolls the learner in the purchased course.
pub struct CourseEnrollmentStrategy {
    pool: PgPool,
}

impl CourseEnrollmentStrategy {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostPaymentStrategy for CourseEnrollmentStrategy {
    fn handles(&self) -> ProductType {
        ProductType::Course
    }

    async fn fulfil(&self, payment: &Payment) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO course_enrollments (user_id, course_id, payment_id, enrolled_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(payment.user_id.as_str())
        .bind(payment.product_id.as_uuid())
        .bind(payment.id.as_uuid())
        .bind(Timestamp::now().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to enroll learner: {}", e)))?;

        info!(
            payment_id = %payment.id,
            course_id = %payment.product_id,
            newly_enrolled = result.rows_affected() > 0,
            "Course enrollment fulfilled"
        );
        Ok(())
    }
}

/// Activates a purchased teacher package.
pub struct TeacherPackageActivationStrategy {
    pool: PgPool,
}

impl TeacherPackageActivationStrategy {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostPaymentStrategy for TeacherPackageActivationStrategy {
    fn handles(&self) -> ProductType {
        ProductType::TeacherPackage
    }

    async fn fulfil(&self, payment: &Payment) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO teacher_package_activations (payment_id, user_id, package_id, activated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (payment_id) DO NOTHING
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.user_id.as_str())
        .bind(payment.product_id.as_uuid())
        .bind(Timestamp::now().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to activate package: {}", e)))?;

        info!(
            payment_id = %payment.id,
            package_id = %payment.product_id,
            newly_activated = result.rows_affected() > 0,
            "Teacher package activation fulfilled"
        );
        Ok(())
    }
}
