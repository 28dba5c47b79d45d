//! PayOS gateway adapter.

mod client;

pub use client::{PayOsClient, PayOsClientConfig, DEFAULT_PAYOS_API_BASE_URL};
