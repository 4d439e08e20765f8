//! # Token Value Objects
//!
//! Tokens and fixed-point token amounts.
//!
//! This module provides [`Token`], identifying an asset on a specific chain,
//! and [`TokenAmount`], a fixed-point integer amount denominated in the
//! token's smallest unit with checked arithmetic.
//!
//! Amounts stay in base units throughout the engine; conversion to decimal
//! units happens only at pricing and display boundaries.

use crate::domain::value_objects::ids::ChainId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An asset on a specific chain.
///
/// Two tokens are the same asset when both symbol and chain match.
/// Decimal precision is carried so amounts can be converted to human units
/// at the pricing boundary.
///
/// # Examples
///
/// ```
/// use swap_router::domain::value_objects::token::Token;
/// use swap_router::domain::value_objects::ids::ChainId;
///
/// let weth = Token::new("WETH", ChainId::ETHEREUM, 18);
/// let usdc = Token::new("USDC", ChainId::ETHEREUM, 6);
/// assert_ne!(weth, usdc);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    symbol: String,
    chain: ChainId,
    decimals: u8,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(symbol: impl Into<String>, chain: ChainId, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            chain,
            decimals,
        }
    }

    /// Returns the token symbol.
    #[inline]
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the chain this token lives on.
    #[inline]
    #[must_use]
    pub const fn chain(&self) -> ChainId {
        self.chain
    }

    /// Returns the token's decimal precision.
    #[inline]
    #[must_use]
    pub const fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Returns true if this is the same asset as `other`.
    #[must_use]
    pub fn same_asset(&self, other: &Token) -> bool {
        self.symbol == other.symbol && self.chain == other.chain
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.chain)
    }
}

/// A fixed-point token amount in the token's smallest unit.
///
/// Backed by `u128`, which comfortably holds 18-decimal base-unit amounts.
/// All arithmetic is checked; operations that would overflow return `None`.
///
/// # Examples
///
/// ```
/// use swap_router::domain::value_objects::token::TokenAmount;
///
/// let one_eth = TokenAmount::new(1_000_000_000_000_000_000);
/// let fee = one_eth.mul_per_mille(3);
/// assert_eq!(fee.get(), 3_000_000_000_000_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAmount(u128);

impl TokenAmount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates a new amount from raw base units.
    #[inline]
    #[must_use]
    pub const fn new(base_units: u128) -> Self {
        Self(base_units)
    }

    /// Returns the raw base-unit value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u128 {
        self.0
    }

    /// Returns true if the amount is zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    #[inline]
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Checked subtraction; `None` if the result would be negative.
    #[inline]
    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Multiplies by a per-mille rate, rounding down.
    ///
    /// `amount.mul_per_mille(3)` is 0.3% of the amount. Saturates on overflow,
    /// which cannot occur for realistic base-unit amounts.
    #[must_use]
    pub const fn mul_per_mille(self, per_mille: u32) -> Self {
        Self(self.0.saturating_mul(per_mille as u128) / 1_000)
    }

    /// Converts the base-unit amount to a `Decimal`.
    ///
    /// Amounts beyond `Decimal` range (above ~7.9e28) saturate to
    /// `Decimal::MAX`; such values are far outside real token supplies.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        if self.0 > i128::MAX as u128 {
            return Decimal::MAX;
        }
        Decimal::try_from_i128_with_scale(self.0 as i128, 0).unwrap_or(Decimal::MAX)
    }

    /// Converts to human units given the token's decimal precision.
    #[must_use]
    pub fn to_units(self, decimals: u8) -> Decimal {
        if self.0 > i128::MAX as u128 {
            return Decimal::MAX;
        }
        Decimal::try_from_i128_with_scale(self.0 as i128, decimals as u32)
            .unwrap_or(Decimal::MAX)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for TokenAmount {
    #[inline]
    fn from(base_units: u128) -> Self {
        Self(base_units)
    }
}
