//! # Identity Value Objects
//!
//! Type-safe identity wrappers for domain identifiers.
//!
//! This module provides newtype wrappers for all domain identifiers,
//! ensuring type safety and preventing accidental mixing of different ID types.
//!
//! ## UUID-based Identifiers
//!
//! - [`QuoteId`] - Quote identifier
//! - [`ExecutionId`] - Execution descriptor identifier
//!
//! ## Value-based Identifiers
//!
//! - [`VenueId`] - Venue identifier (string)
//! - [`ChainId`] - Blockchain network identifier (numeric)

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Quote identifier.
///
/// A UUID-based identifier uniquely identifying a quote produced by a venue.
///
/// # Examples
///
/// ```
/// use swap_router::domain::value_objects::ids::QuoteId;
///
/// let quote_id = QuoteId::new_v4();
/// println!("Quote: {}", quote_id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(Uuid);

impl QuoteId {
    /// Creates a new Quote ID from an existing UUID.
    #[inline]
    #[must_use]
    pub const fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generates a new random Quote ID using UUID v4.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<Uuid> for QuoteId {
    #[inline]
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Execution descriptor identifier.
///
/// A UUID-based identifier uniquely identifying an execution descriptor
/// built from an accepted quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(Uuid);

impl ExecutionId {
    /// Creates a new Execution ID from an existing UUID.
    #[inline]
    #[must_use]
    pub const fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generates a new random Execution ID using UUID v4.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<Uuid> for ExecutionId {
    #[inline]
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Venue identifier.
///
/// A string-based identifier for an external trading venue
/// (e.g. `"0x-aggregator"`, `"1inch"`, `"paraswap"`).
///
/// # Examples
///
/// ```
/// use swap_router::domain::value_objects::ids::VenueId;
///
/// let venue = VenueId::new("1inch");
/// assert_eq!(venue.as_str(), "1inch");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(String);

impl VenueId {
    /// Creates a new venue ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VenueId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Blockchain network identifier.
///
/// Numeric chain identifier following the EVM chain-id convention.
///
/// # Examples
///
/// ```
/// use swap_router::domain::value_objects::ids::ChainId;
///
/// assert_eq!(ChainId::ETHEREUM.get(), 1);
/// assert_eq!(ChainId::POLYGON.native_symbol(), "MATIC");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    /// Ethereum mainnet.
    pub const ETHEREUM: Self = Self(1);
    /// Optimism.
    pub const OPTIMISM: Self = Self(10);
    /// Polygon PoS.
    pub const POLYGON: Self = Self(137);
    /// Base.
    pub const BASE: Self = Self(8453);
    /// Arbitrum One.
    pub const ARBITRUM: Self = Self(42161);

    /// Creates a chain ID from a raw numeric value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric chain ID.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the symbol of the chain's native gas token.
    ///
    /// Unknown chains fall back to `"ETH"`; execution-cost conversion then
    /// depends on the price reference carrying that symbol.
    #[must_use]
    pub const fn native_symbol(self) -> &'static str {
        match self.0 {
            137 => "MATIC",
            _ => "ETH",
        }
    }

    /// Returns the decimal precision of the chain's native gas token.
    #[inline]
    #[must_use]
    pub const fn native_decimals(self) -> u8 {
        18
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainId {
    #[inline]
    fn from(id: u64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_id_unique() {
        assert_ne!(QuoteId::new_v4(), QuoteId::new_v4());
    }

    #[test]
    fn quote_id_display_hyphenated() {
        let id = QuoteId::new_v4();
        assert_eq!(id.to_string().len(), 36);
    }

    #[test]
    fn execution_id_roundtrip() {
        let uuid = Uuid::new_v4();
        let id = ExecutionId::new(uuid);
        assert_eq!(id.get(), uuid);
    }

    #[test]
    fn venue_id_equality() {
        assert_eq!(VenueId::new("1inch"), VenueId::from("1inch"));
        assert_ne!(VenueId::new("1inch"), VenueId::new("paraswap"));
    }

    #[test]
    fn chain_id_constants() {
        assert_eq!(ChainId::ETHEREUM.get(), 1);
        assert_eq!(ChainId::ARBITRUM.get(), 42161);
        assert_eq!(ChainId::new(137), ChainId::POLYGON);
    }

    #[test]
    fn chain_native_token() {
        assert_eq!(ChainId::ETHEREUM.native_symbol(), "ETH");
        assert_eq!(ChainId::POLYGON.native_symbol(), "MATIC");
        assert_eq!(ChainId::BASE.native_decimals(), 18);
    }
}
