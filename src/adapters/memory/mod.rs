//! In-memory adapters.
//!
//! Map-backed implementations of the persistence ports plus scriptable
//! gateway and fulfilment doubles for tests and local development.

mod flashcard_review_repository;
mod payment_gateway;
mod payment_repository;
mod post_payment;
mod webhook_queue_repository;

pub use flashcard_review_repository::InMemoryFlashCardReviewRepository;
pub use payment_gateway::MockPaymentGateway;
pub use payment_repository::InMemoryPaymentRepository;
pub use post_payment::RecordingPostPaymentStrategy;
pub use webhook_queue_repository::InMemoryWebhookQueueRepository;
