//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresPaymentRepository` - Payments with version-checked updates
//! - `PostgresWebhookQueueRepository` - Durable webhook delivery queue
//! - `PostgresFlashCardReviewRepository` - Spaced-repetition state (upsert)
//! - `CourseEnrollmentStrategy` / `TeacherPackageActivationStrategy` - Fulfilment

mod flashcard_review_repository;
mod payment_repository;
mod post_payment;
mod webhook_queue_repository;

pub use flashcard_review_repository::PostgresFlashCardReviewRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use post_payment::{CourseEnrollmentStrategy, TeacherPackageActivationStrategy};
pub use webhook_queue_repository::PostgresWebhookQueueRepository;
