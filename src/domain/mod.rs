//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, state machines)
//! - `spaced_repetition` - SM-2 scheduling and mastery statistics
//! - `payment` - Checkout attempts and settlement lifecycle
//! - `webhook` - Gateway webhook queue, verification and retry rules

pub mod foundation;
pub mod payment;
pub mod spaced_repetition;
pub mod webhook;
