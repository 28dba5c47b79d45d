//! Adapters - Implementations of port interfaces.
//!
//! - `postgres` - PostgreSQL repositories and fulfilment strategies
//! - `payos` - PayOS gateway API client
//! - `memory` - In-memory doubles for tests and local development
//! - `http` - Axum routers
//! - `worker` - Background webhook sweeper

pub mod http;
pub mod memory;
pub mod payos;
pub mod postgres;
pub mod worker;

pub use payos::{PayOsClient, PayOsClientConfig};
pub use worker::WebhookSweeper;
