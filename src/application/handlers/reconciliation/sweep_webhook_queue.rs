//! SweepWebhookQueueHandler - one pass over due webhook entries.
//!
//! Picks up `Pending` entries whose immediate processing never ran,
//! `Failed` entries whose backoff has elapsed and `Processing` entries whose
//! claim lease ran out. Shutdown is honoured between entries, never in the
//! middle of one.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error};

use crate::domain::foundation::Timestamp;
use crate::domain::webhook::WebhookError;
use crate::ports::WebhookQueueRepository;

use super::process_webhook_entry::{ProcessOutcome, ProcessWebhookEntryHandler};

/// Tally of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub examined: usize,
    pub processed: usize,
    pub duplicates: usize,
    pub retry_scheduled: usize,
    pub dead_lettered: usize,
    pub skipped: usize,
    pub errors: usize,
    /// Sweep stopped early because shutdown was requested.
    pub interrupted: bool,
}

impl SweepReport {
    fn record(&mut self, outcome: &ProcessOutcome) {
        match outcome {
            ProcessOutcome::Processed => self.processed += 1,
            ProcessOutcome::DuplicateDelivery => self.duplicates += 1,
            ProcessOutcome::RetryScheduled { .. } => self.retry_scheduled += 1,
            ProcessOutcome::DeadLettered { .. } => self.dead_lettered += 1,
            ProcessOutcome::AlreadyClaimed | ProcessOutcome::AlreadyTerminal(_) => {
                self.skipped += 1
            }
        }
    }
}

pub struct SweepWebhookQueueHandler {
    queue: Arc<dyn WebhookQueueRepository>,
    processor: Arc<ProcessWebhookEntryHandler>,
    batch_size: usize,
}

impl SweepWebhookQueueHandler {
    pub fn new(
        queue: Arc<dyn WebhookQueueRepository>,
        processor: Arc<ProcessWebhookEntryHandler>,
        batch_size: usize,
    ) -> Self {
        Self {
            queue,
            processor,
            batch_size: batch_size.max(1),
        }
    }

    /// Processes up to `batch_size` due entries.
    ///
    /// A storage error on one entry is logged and counted; the sweep moves
    /// on to the next entry. Only failing to list the batch is returned.
    pub async fn sweep(
        &self,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<SweepReport, WebhookError> {
        let due = self.queue.list_due(Timestamp::now(), self.batch_size).await?;
        let mut report = SweepReport::default();

        for entry in due {
            if *shutdown.borrow() {
                report.interrupted = true;
                break;
            }

            report.examined += 1;
            let entry_id = entry.id;
            match self.processor.process(entry).await {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    error!(entry_id = %entry_id, error = %e, "Webhook sweep failed on entry");
                    report.errors += 1;
                }
            }
        }

        if report.examined > 0 {
            debug!(
                examined = report.examined,
                processed = report.processed,
                retry_scheduled = report.retry_scheduled,
                dead_lettered = report.dead_lettered,
                "Webhook sweep finished"
            );
        }

        Ok(report)
    }
}
