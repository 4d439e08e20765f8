//! # Execution Descriptor
//!
//! The venue-agnostic payload handed to an external signer, plus its
//! delivery-status lifecycle.
//!
//! # Status State Machine
//!
//! ```text
//! Pending → Submitted → Confirmed
//!              ↓
//!           Failed
//! ```
//!
//! Transitions only move forward; `Confirmed` and `Failed` are terminal.

use crate::domain::value_objects::{ExecutionId, QuoteId, Timestamp, TokenAmount, VenueId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Delivery status of an execution descriptor.
///
/// # Examples
///
/// ```
/// use swap_router::domain::entities::execution::ExecutionStatus;
///
/// assert!(ExecutionStatus::Pending.can_transition_to(ExecutionStatus::Submitted));
/// assert!(!ExecutionStatus::Pending.can_transition_to(ExecutionStatus::Confirmed));
/// assert!(ExecutionStatus::Confirmed.is_terminal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Descriptor built, not yet handed to a signer.
    #[default]
    Pending,
    /// Transaction submitted by the external signer.
    Submitted,
    /// Execution confirmed (terminal).
    Confirmed,
    /// Execution failed (terminal).
    Failed,
}

impl ExecutionStatus {
    /// Returns true if this is a terminal status.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }

    /// Returns true if this status can transition to `target`.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Submitted)
                | (Self::Submitted, Self::Confirmed)
                | (Self::Submitted, Self::Failed)
        )
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Submitted => "SUBMITTED",
            Self::Confirmed => "CONFIRMED",
            Self::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

/// Error returned for an out-of-order status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid execution status transition: {from} -> {to}")]
pub struct InvalidTransition {
    /// Current status.
    pub from: ExecutionStatus,
    /// Requested status.
    pub to: ExecutionStatus,
}

/// An execution descriptor for a chosen quote.
///
/// Built when a quote is accepted for execution. Carries everything an
/// external signer/broadcaster needs; the engine itself never signs or
/// broadcasts. Status is mutated only through [`transition_to`], which
/// enforces the forward-only lifecycle.
///
/// [`transition_to`]: ExecutionDescriptor::transition_to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionDescriptor {
    id: ExecutionId,
    quote_id: QuoteId,
    venue_id: VenueId,
    to: String,
    payload: String,
    value: TokenAmount,
    gas_limit: u64,
    status: ExecutionStatus,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl ExecutionDescriptor {
    /// Creates a pending descriptor for an accepted quote.
    #[must_use]
    pub fn new(
        quote_id: QuoteId,
        venue_id: VenueId,
        to: impl Into<String>,
        payload: impl Into<String>,
        value: TokenAmount,
        gas_limit: u64,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: ExecutionId::new_v4(),
            quote_id,
            venue_id,
            to: to.into(),
            payload: payload.into(),
            value,
            gas_limit,
            status: ExecutionStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the descriptor identifier.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ExecutionId {
        self.id
    }

    /// Returns the accepted quote's identifier.
    #[inline]
    #[must_use]
    pub const fn quote_id(&self) -> QuoteId {
        self.quote_id
    }

    /// Returns the executing venue.
    #[inline]
    #[must_use]
    pub fn venue_id(&self) -> &VenueId {
        &self.venue_id
    }

    /// Returns the destination target.
    #[inline]
    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Returns the opaque payload.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Returns the native value to send.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> TokenAmount {
        self.value
    }

    /// Returns the gas limit.
    #[inline]
    #[must_use]
    pub const fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// Returns the current status.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> ExecutionStatus {
        self.status
    }

    /// Returns when the descriptor was created.
    #[inline]
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns when the status last changed.
    #[inline]
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Applies a status transition.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] if the lifecycle does not allow moving
    /// from the current status to `target`.
    pub fn transition_to(&mut self, target: ExecutionStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(target) {
            return Err(InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

impl fmt::Display for ExecutionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Execution({} quote={} venue={} status={})",
            self.id, self.quote_id, self.venue_id, self.status
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn descriptor() -> ExecutionDescriptor {
        ExecutionDescriptor::new(
            QuoteId::new_v4(),
            VenueId::new("1inch"),
            "0x1111111254eeb25477b68fb85ed929f73a960582",
            "0xdeadbeef",
            TokenAmount::ZERO,
            210_000,
        )
    }

    #[test]
    fn starts_pending() {
        let d = descriptor();
        assert_eq!(d.status(), ExecutionStatus::Pending);
        assert!(!d.status().is_terminal());
    }

    #[test]
    fn happy_path_transitions() {
        let mut d = descriptor();
        d.transition_to(ExecutionStatus::Submitted).unwrap();
        d.transition_to(ExecutionStatus::Confirmed).unwrap();
        assert!(d.status().is_terminal());
    }

    #[test]
    fn failure_path() {
        let mut d = descriptor();
        d.transition_to(ExecutionStatus::Submitted).unwrap();
        d.transition_to(ExecutionStatus::Failed).unwrap();
        assert_eq!(d.status(), ExecutionStatus::Failed);
    }

    #[test]
    fn skipping_submitted_rejected() {
        let mut d = descriptor();
        let err = d.transition_to(ExecutionStatus::Confirmed).unwrap_err();
        assert_eq!(err.from, ExecutionStatus::Pending);
        assert_eq!(err.to, ExecutionStatus::Confirmed);
        assert_eq!(d.status(), ExecutionStatus::Pending);
    }

    #[test]
    fn terminal_states_frozen() {
        let mut d = descriptor();
        d.transition_to(ExecutionStatus::Submitted).unwrap();
        d.transition_to(ExecutionStatus::Confirmed).unwrap();
        assert!(d.transition_to(ExecutionStatus::Failed).is_err());
        assert!(d.transition_to(ExecutionStatus::Submitted).is_err());
    }

    #[test]
    fn backwards_rejected() {
        let mut d = descriptor();
        d.transition_to(ExecutionStatus::Submitted).unwrap();
        assert!(d.transition_to(ExecutionStatus::Pending).is_err());
    }
}
