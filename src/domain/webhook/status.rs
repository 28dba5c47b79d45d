//! Webhook queue entry status state machine.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Processing status of one inbound webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookQueueStatus {
    /// Persisted, never attempted.
    Pending,

    /// Claimed by a worker.
    Processing,

    /// Applied successfully. Terminal.
    Processed,

    /// Last attempt failed; eligible for retry after `next_attempt_at`.
    Failed,

    /// Retries exhausted or rejected outright. Terminal, needs an operator.
    DeadLetter,
}

impl WebhookQueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookQueueStatus::Pending => "pending",
            WebhookQueueStatus::Processing => "processing",
            WebhookQueueStatus::Processed => "processed",
            WebhookQueueStatus::Failed => "failed",
            WebhookQueueStatus::DeadLetter => "dead_letter",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(WebhookQueueStatus::Pending),
            "processing" => Some(WebhookQueueStatus::Processing),
            "processed" => Some(WebhookQueueStatus::Processed),
            "failed" => Some(WebhookQueueStatus::Failed),
            "dead_letter" => Some(WebhookQueueStatus::DeadLetter),
            _ => None,
        }
    }

    /// True for states a worker may claim.
    pub fn is_claimable(&self) -> bool {
        matches!(self, WebhookQueueStatus::Pending | WebhookQueueStatus::Failed)
    }
}

impl StateMachine for WebhookQueueStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use WebhookQueueStatus::*;
        matches!(
            (self, target),
            (Pending, Processing)
                | (Processing, Processed)
                | (Processing, Failed)
                | (Processing, DeadLetter)
                | (Failed, Processing)
                | (Failed, DeadLetter)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use WebhookQueueStatus::*;
        match self {
            Pending => vec![Processing],
            Processing => vec![Processed, Failed, DeadLetter],
            Failed => vec![Processing, DeadLetter],
            Processed | DeadLetter => vec![],
        }
    }
}
