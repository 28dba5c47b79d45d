//! Background workers.

mod webhook_sweeper;

pub use webhook_sweeper::WebhookSweeper;
