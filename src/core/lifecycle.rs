//! Order status lifecycle.
//!
//! ```text
//! pending ──► waiting_payment ──► processing ──► completed
//!    │               │
//!    └──► cancelled ◄┘
//! ```
//!
//! `pending → waiting_payment` only happens through a payment-proof upload;
//! every other edge is an explicit admin action. `completed` and `cancelled`
//! are terminal.

use crate::entities::order::OrderStatus;
use crate::errors::{Error, Result};

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::WaitingPayment,
        Self::Processing,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Whether moving from `self` to `next` follows the lifecycle.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::WaitingPayment | Self::Cancelled)
                | (Self::WaitingPayment, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Completed)
        )
    }

    /// Statuses an administrator may move the order to by hand.
    ///
    /// These are the actions the back office offers for an order in this status.
    #[must_use]
    pub const fn admin_transitions(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Cancelled],
            Self::WaitingPayment => &[Self::Processing, Self::Cancelled],
            Self::Processing => &[Self::Completed],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Whether a customer may (re)upload payment proof in this status.
    #[must_use]
    pub const fn accepts_payment_proof(self) -> bool {
        matches!(self, Self::Pending | Self::WaitingPayment)
    }

    /// No further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Human readable status name for badges and messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::WaitingPayment => "Waiting for payment confirmation",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Checks that an administrator may move an order from `current` to `next`.
///
/// # Errors
/// Returns `Error::InvalidTransition` when `next` is not one of
/// `current.admin_transitions()`.
pub fn ensure_admin_transition(current: OrderStatus, next: OrderStatus) -> Result<()> {
    if current.admin_transitions().contains(&next) {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            from: current,
            to: next,
        })
    }
}

/// Checks that a payment proof may be attached to an order in `current`.
///
/// # Errors
/// Returns `Error::InvalidTransition` towards `waiting_payment` otherwise.
pub fn ensure_payment_proof_accepted(current: OrderStatus) -> Result<()> {
    if current.accepts_payment_proof() {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            from: current,
            to: OrderStatus::WaitingPayment,
        })
    }
}
