//! # Venue Errors
//!
//! Typed errors for venue adapter calls.
//!
//! The taxonomy distinguishes expected non-faults (`Unsupported`), transient
//! failures (`Timeout`, `RateLimited`), upstream faults (`Upstream`) and the
//! derived rejection produced by an open circuit (`CircuitOpen`). The
//! resilience wrapper consults [`VenueError::is_retryable`] and
//! [`VenueError::counts_as_failure`] to decide retry and breaker behavior.

use crate::domain::value_objects::VenueId;
use thiserror::Error;

/// Error returned by a venue adapter call or its resilience wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VenueError {
    /// The venue does not serve this pair or chain. Expected, not a fault.
    #[error("venue {venue} does not support this request: {reason}")]
    Unsupported {
        /// The venue.
        venue: VenueId,
        /// Why the request cannot be served.
        reason: String,
    },

    /// The upstream did not respond within the call budget.
    #[error("venue {venue} timed out after {budget_ms}ms")]
    Timeout {
        /// The venue.
        venue: VenueId,
        /// The exhausted budget in milliseconds.
        budget_ms: u64,
    },

    /// The venue (or the local outbound limiter) rejected the call rate.
    #[error("venue {venue} rate limited")]
    RateLimited {
        /// The venue.
        venue: VenueId,
        /// Suggested wait before retrying, if known.
        retry_after_ms: Option<u64>,
    },

    /// Non-2xx response or undecodable payload from the venue.
    #[error("venue {venue} upstream error: {message}")]
    Upstream {
        /// The venue.
        venue: VenueId,
        /// HTTP status, when the response carried one.
        status: Option<u16>,
        /// Description of the fault.
        message: String,
    },

    /// The venue's circuit is open; no call reached the wire.
    #[error("venue {venue} circuit open")]
    CircuitOpen {
        /// The venue.
        venue: VenueId,
        /// Time until the circuit allows a trial call, if known.
        retry_in_ms: Option<u64>,
    },

    /// Adapter-local failure (bad configuration, client construction).
    #[error("venue {venue} internal error: {message}")]
    Internal {
        /// The venue.
        venue: VenueId,
        /// Description of the fault.
        message: String,
    },
}

impl VenueError {
    /// Creates an `Unsupported` error.
    #[must_use]
    pub fn unsupported(venue: VenueId, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            venue,
            reason: reason.into(),
        }
    }

    /// Creates a `Timeout` error.
    #[must_use]
    pub fn timeout(venue: VenueId, budget_ms: u64) -> Self {
        Self::Timeout { venue, budget_ms }
    }

    /// Creates a `RateLimited` error.
    #[must_use]
    pub fn rate_limited(venue: VenueId, retry_after_ms: Option<u64>) -> Self {
        Self::RateLimited {
            venue,
            retry_after_ms,
        }
    }

    /// Creates an `Upstream` error.
    #[must_use]
    pub fn upstream(venue: VenueId, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            venue,
            status,
            message: message.into(),
        }
    }

    /// Creates a `CircuitOpen` error.
    #[must_use]
    pub fn circuit_open(venue: VenueId, retry_in_ms: Option<u64>) -> Self {
        Self::CircuitOpen { venue, retry_in_ms }
    }

    /// Creates an `Internal` error.
    #[must_use]
    pub fn internal(venue: VenueId, message: impl Into<String>) -> Self {
        Self::Internal {
            venue,
            message: message.into(),
        }
    }

    /// Returns the venue this error relates to.
    #[must_use]
    pub fn venue(&self) -> &VenueId {
        match self {
            Self::Unsupported { venue, .. }
            | Self::Timeout { venue, .. }
            | Self::RateLimited { venue, .. }
            | Self::Upstream { venue, .. }
            | Self::CircuitOpen { venue, .. }
            | Self::Internal { venue, .. } => venue,
        }
    }

    /// Returns true if a fresh attempt could plausibly succeed soon.
    ///
    /// Only transient faults are retried by the resilience wrapper; upstream
    /// faults (malformed payloads) and expected non-faults are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::RateLimited { .. })
    }

    /// Returns true if this outcome counts toward the venue's failure
    /// threshold.
    ///
    /// `Unsupported` is an expected non-fault and `CircuitOpen` is a derived
    /// rejection; neither accumulates failures.
    #[must_use]
    pub const fn counts_as_failure(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::RateLimited { .. }
                | Self::Upstream { .. }
                | Self::Internal { .. }
        )
    }
}

/// Result type for venue adapter operations.
pub type VenueResult<T> = Result<T, VenueError>;
