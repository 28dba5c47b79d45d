//! Payment aggregate entity.
//!
//! One Payment exists per checkout attempt. Gateways refer to it by
//! `order_code`; internally it is addressed by `id`.
//!
//! # Design Decisions
//!
//! - **Integer amounts**: VND has no minor unit, amounts are whole `i64`
//! - **Completed is final**: a settled payment never changes status again
//! - **Optimistic concurrency**: `version` guards every persisted update

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PaymentId, ProductId, StateMachine, Timestamp, UserId};

use super::{PaymentError, PaymentGateway, PaymentStatus, ProductType};

/// Payment aggregate.
///
/// # Invariants
///
/// - `amount > 0`
/// - `order_code` is unique per gateway
/// - Status transitions follow [`PaymentStatus`] rules
/// - `paid_at` is set when status is `Completed`
/// - `Refunded` is only ever loaded from storage; refunds are recorded
///   outside this service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,

    /// Gateway order reference, echoed in webhooks and return URLs.
    pub order_code: i64,

    pub gateway: PaymentGateway,
    pub status: PaymentStatus,

    /// Amount to collect, in whole currency units.
    pub amount: i64,

    pub user_id: UserId,
    pub product_id: ProductId,
    pub product_type: ProductType,

    /// Transaction reference reported by the gateway.
    pub gateway_reference: Option<String>,

    /// Why the last attempt failed, if it did.
    pub failure_reason: Option<String>,

    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,

    /// Concurrency token, bumped by the repository on every update.
    pub version: i64,
}

impl Payment {
    /// Creates a new pending payment.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` if `amount` is not positive.
    pub fn create(
        id: PaymentId,
        order_code: i64,
        user_id: UserId,
        product_id: ProductId,
        product_type: ProductType,
        amount: i64,
        now: Timestamp,
    ) -> Result<Self, PaymentError> {
        if amount <= 0 {
            return Err(PaymentError::InvalidAmount(amount));
        }

        Ok(Self {
            id,
            order_code,
            gateway: PaymentGateway::PayOs,
            status: PaymentStatus::Pending,
            amount,
            user_id,
            product_id,
            product_type,
            gateway_reference: None,
            failure_reason: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
            version: 1,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    /// Checks a gateway-reported amount against the expected amount.
    pub fn verify_amount(&self, reported: i64) -> Result<(), PaymentError> {
        if reported != self.amount {
            return Err(PaymentError::AmountMismatch {
                expected: self.amount,
                actual: reported,
            });
        }
        Ok(())
    }

    /// Moves to Processing once the gateway reports the payment.
    ///
    /// A payment already in Processing (a previous attempt crashed before
    /// completing) is left as is.
    pub fn begin_processing(&mut self, now: Timestamp) -> Result<(), PaymentError> {
        if self.status == PaymentStatus::Processing {
            return Ok(());
        }
        self.transition_to(PaymentStatus::Processing)?;
        self.failure_reason = None;
        self.updated_at = now;
        Ok(())
    }

    /// Marks the payment settled.
    pub fn complete(
        &mut self,
        gateway_reference: Option<String>,
        now: Timestamp,
    ) -> Result<(), PaymentError> {
        self.transition_to(PaymentStatus::Completed)?;
        if gateway_reference.is_some() {
            self.gateway_reference = gateway_reference;
        }
        self.paid_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Marks the attempt failed with a reason.
    pub fn fail(&mut self, reason: impl Into<String>, now: Timestamp) -> Result<(), PaymentError> {
        self.transition_to(PaymentStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        self.updated_at = now;
        Ok(())
    }

    fn transition_to(&mut self, target: PaymentStatus) -> Result<(), PaymentError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| PaymentError::InvalidTransition {
                from: self.status,
                to: target,
            })?;
        Ok(())
    }
}
