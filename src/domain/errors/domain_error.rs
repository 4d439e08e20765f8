//! # Domain Error
//!
//! Caller-input faults detected before any venue is contacted.

use thiserror::Error;

/// Domain-level validation error.
///
/// These represent invalid caller input and are rejected synchronously;
/// no venue is ever contacted for a request that fails domain validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Swap amount must be strictly positive.
    #[error("swap amount must be positive")]
    NonPositiveAmount,

    /// Input and output tokens must differ.
    #[error("input and output token are the same asset: {0}")]
    SameToken(String),

    /// Slippage tolerance outside the valid per-mille range.
    #[error("invalid slippage tolerance: {0}\u{2030} (must be < 1000\u{2030})")]
    InvalidSlippage(u32),

    /// Deadline must be non-zero.
    #[error("request deadline must be non-zero")]
    ZeroDeadline,

    /// Route hops do not chain consistently.
    #[error("route hop {index} output does not match the next hop's input")]
    BrokenRoute {
        /// Index of the offending hop.
        index: usize,
    },

    /// Confidence score outside the [0, 1] interval.
    #[error("confidence score {0} outside [0, 1]")]
    InvalidConfidence(f64),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
