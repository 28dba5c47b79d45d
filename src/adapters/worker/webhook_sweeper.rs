//! WebhookSweeper - background loop that retries due webhook deliveries.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 30s | Pause between sweeps |
//!
//! Batch size lives on the sweep handler.
//!
//! ## Graceful Shutdown
//!
//! The loop stops on the shutdown signal. A sweep in progress finishes the
//! entry it is on and then returns.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use crate::application::handlers::reconciliation::{SweepReport, SweepWebhookQueueHandler};

pub struct WebhookSweeper {
    sweep: Arc<SweepWebhookQueueHandler>,
    interval: Duration,
}

impl WebhookSweeper {
    pub fn new(sweep: Arc<SweepWebhookQueueHandler>, interval: Duration) -> Self {
        Self { sweep, interval }
    }

    /// Runs sweeps on the interval until shutdown is signalled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = self.interval.as_secs(), "Webhook sweeper started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Webhook sweeper stopping");
                        return;
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.sweep_once(&shutdown).await {
                        // Listing failed; try again next tick.
                        error!(error = %e, "Webhook sweep failed");
                    }
                }
            }
        }
    }

    /// Runs exactly one sweep.
    pub async fn sweep_once(
        &self,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<SweepReport, crate::domain::webhook::WebhookError> {
        self.sweep.sweep(shutdown).await
    }
}
