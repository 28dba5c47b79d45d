//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, state machine support and error types
//! shared by the spaced-repetition and payment domains.

mod errors;
mod ids;
mod percentage;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{FlashCardId, PaymentId, ProductId, UserId, WebhookEntryId};
pub use percentage::Percentage;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
