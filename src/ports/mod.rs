//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `PaymentRepository` - Payments keyed by id and gateway order code
//! - `WebhookQueueRepository` - Durable queue of inbound gateway deliveries
//! - `FlashCardReviewRepository` - Per-learner spaced-repetition state
//!
//! ## External Service Ports
//!
//! - `PaymentGatewayClient` - Authoritative payment status from the gateway
//! - `PostPaymentStrategy` - Grants what a settled payment bought

mod flashcard_review_repository;
mod payment_gateway;
mod payment_repository;
mod post_payment_strategy;
mod webhook_queue_repository;

pub use flashcard_review_repository::FlashCardReviewRepository;
pub use payment_gateway::{GatewayPaymentInfo, GatewayPaymentStatus, PaymentGatewayClient};
pub use payment_repository::PaymentRepository;
pub use post_payment_strategy::{PostPaymentStrategy, PostPaymentStrategyRegistry};
pub use webhook_queue_repository::WebhookQueueRepository;
