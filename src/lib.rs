//! Lingoleap - learning platform backend
//!
//! Two subsystems share this crate:
//!
//! - SM-2 spaced repetition: per-user flash card scheduling and mastery
//!   classification.
//! - PayOS reconciliation: a durable webhook queue with signature checks,
//!   bounded retries and dead-lettering, plus return-URL confirmation
//!   against the gateway.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
