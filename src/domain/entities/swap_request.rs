//! # Swap Request
//!
//! The immutable request value created per caller swap.
//!
//! Construction validates caller input; an invalid request never reaches a
//! venue.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{Timestamp, Token, TokenAmount};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default slippage tolerance in per-mille (0.5%).
pub const DEFAULT_SLIPPAGE_PM: u32 = 5;

/// Default aggregation deadline.
pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(3_000);

/// A validated swap request.
///
/// Immutable once constructed. The input amount is a fixed-point integer in
/// the input token's smallest unit.
///
/// # Examples
///
/// ```
/// use swap_router::domain::entities::swap_request::SwapRequest;
/// use swap_router::domain::value_objects::{ChainId, Token, TokenAmount};
/// use std::time::Duration;
///
/// let request = SwapRequest::new(
///     Token::new("WETH", ChainId::ETHEREUM, 18),
///     Token::new("USDC", ChainId::ETHEREUM, 6),
///     TokenAmount::new(1_000_000_000_000_000_000),
///     10,
///     Duration::from_secs(3),
/// )
/// .unwrap();
///
/// assert_eq!(request.input().symbol(), "WETH");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    input: Token,
    output: Token,
    amount_in: TokenAmount,
    slippage_tolerance_pm: u32,
    deadline: Duration,
    created_at: Timestamp,
}

impl SwapRequest {
    /// Creates a new swap request, validating caller input.
    ///
    /// # Arguments
    ///
    /// * `input` - Token being sold
    /// * `output` - Token being bought
    /// * `amount_in` - Input amount in the input token's smallest unit (> 0)
    /// * `slippage_tolerance_pm` - Accepted slippage in per-mille (< 1000)
    /// * `deadline` - Overall aggregation deadline (non-zero)
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] for a non-positive amount, identical
    /// input/output asset, out-of-range slippage tolerance or zero deadline.
    pub fn new(
        input: Token,
        output: Token,
        amount_in: TokenAmount,
        slippage_tolerance_pm: u32,
        deadline: Duration,
    ) -> DomainResult<Self> {
        if amount_in.is_zero() {
            return Err(DomainError::NonPositiveAmount);
        }
        if input.same_asset(&output) {
            return Err(DomainError::SameToken(input.to_string()));
        }
        if slippage_tolerance_pm >= 1_000 {
            return Err(DomainError::InvalidSlippage(slippage_tolerance_pm));
        }
        if deadline.is_zero() {
            return Err(DomainError::ZeroDeadline);
        }

        Ok(Self {
            input,
            output,
            amount_in,
            slippage_tolerance_pm,
            deadline,
            created_at: Timestamp::now(),
        })
    }

    /// Returns the input token.
    #[inline]
    #[must_use]
    pub fn input(&self) -> &Token {
        &self.input
    }

    /// Returns the output token.
    #[inline]
    #[must_use]
    pub fn output(&self) -> &Token {
        &self.output
    }

    /// Returns the input amount in base units.
    #[inline]
    #[must_use]
    pub const fn amount_in(&self) -> TokenAmount {
        self.amount_in
    }

    /// Returns the requested slippage tolerance in per-mille.
    #[inline]
    #[must_use]
    pub const fn slippage_tolerance_pm(&self) -> u32 {
        self.slippage_tolerance_pm
    }

    /// Returns the aggregation deadline.
    #[inline]
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Returns when this request was created.
    #[inline]
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

impl fmt::Display for SwapRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} (slippage {}\u{2030})",
            self.amount_in, self.input, self.output, self.slippage_tolerance_pm
        )
    }
}
