//! Webhook reconciliation domain.
//!
//! # Module Organization
//!
//! - `entry` - Queued delivery with its retry/dead-letter lifecycle
//! - `status` - Queue entry state machine
//! - `payos_event` - PayOS webhook and return-URL payloads
//! - `verifier` - HMAC-SHA256 signature verification
//! - `retry` - Backoff and signature-failure policy
//! - `errors` - Error taxonomy with retryability and HTTP mapping

mod entry;
mod errors;
mod payos_event;
mod retry;
mod status;
mod verifier;

pub use entry::{PaymentWebhookEntry, DEFAULT_MAX_RETRIES};
pub use errors::WebhookError;
pub use payos_event::{PayOsWebhook, PayOsWebhookData, ReturnCallback, PAYOS_SUCCESS_CODE};
pub use retry::{RetryBackoff, SignatureFailurePolicy, DEFAULT_CLAIM_LEASE};
pub use status::WebhookQueueStatus;
pub use verifier::{canonical_data_string, PayOsSignatureVerifier};
