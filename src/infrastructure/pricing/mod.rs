//! # Price Reference
//!
//! Read-only pair price lookup used to convert execution cost into
//! output-token terms.
//!
//! The lookup is fed by an external market-data component; the engine
//! tolerates it being stale or missing a pair, in which case the fee
//! calculator falls back to ranking by raw output.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Read-only "price of one `base` in `quote` terms" lookup.
///
/// Implementations must be cheap and non-blocking; they are consulted on the
/// ranking path for every quote.
pub trait PriceReference: Send + Sync + fmt::Debug {
    /// Returns the price of one unit of `base` in `quote` units, if known.
    fn price(&self, base: &str, quote: &str) -> Option<Decimal>;
}

/// Reloadable in-memory price table.
///
/// Direct pairs take precedence; the inverse pair is consulted as a fallback.
/// Reload swaps the whole table under a brief exclusive write, matching the
/// read-mostly access pattern of the registry.
///
/// # Examples
///
/// ```
/// use swap_router::infrastructure::pricing::{PriceReference, StaticPriceTable};
/// use rust_decimal::Decimal;
///
/// let table = StaticPriceTable::new();
/// table.set("ETH", "USDC", Decimal::from(1850));
///
/// assert_eq!(table.price("ETH", "USDC"), Some(Decimal::from(1850)));
/// assert!(table.price("ETH", "DAI").is_none());
/// ```
#[derive(Debug, Default)]
pub struct StaticPriceTable {
    prices: RwLock<HashMap<(String, String), Decimal>>,
}

impl StaticPriceTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prices: RwLock::new(HashMap::new()),
        }
    }

    /// Sets the price of one `base` in `quote` units.
    pub fn set(&self, base: impl Into<String>, quote: impl Into<String>, price: Decimal) {
        let mut prices = self
            .prices
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        prices.insert((base.into(), quote.into()), price);
    }

    /// Replaces the whole table.
    pub fn reload(&self, entries: impl IntoIterator<Item = (String, String, Decimal)>) {
        let mut prices = self
            .prices
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        prices.clear();
        for (base, quote, price) in entries {
            prices.insert((base, quote), price);
        }
    }

    /// Returns the number of known pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no pairs are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PriceReference for StaticPriceTable {
    fn price(&self, base: &str, quote: &str) -> Option<Decimal> {
        let prices = self.prices.read().unwrap_or_else(PoisonError::into_inner);
        if base == quote {
            return Some(Decimal::ONE);
        }
        if let Some(price) = prices.get(&(base.to_string(), quote.to_string())) {
            return Some(*price);
        }
        // Fall back to the inverse pair.
        prices
            .get(&(quote.to_string(), base.to_string()))
            .and_then(|p| {
                if p.is_zero() {
                    None
                } else {
                    Decimal::ONE.checked_div(*p)
                }
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn direct_pair() {
        let table = StaticPriceTable::new();
        table.set("ETH", "USDC", Decimal::from(2_000));
        assert_eq!(table.price("ETH", "USDC"), Some(Decimal::from(2_000)));
    }

    #[test]
    fn inverse_pair_fallback() {
        let table = StaticPriceTable::new();
        table.set("ETH", "USDC", Decimal::from(2_000));
        assert_eq!(
            table.price("USDC", "ETH"),
            Some(Decimal::new(5, 4)) // 0.0005
        );
    }

    #[test]
    fn identity_pair() {
        let table = StaticPriceTable::new();
        assert_eq!(table.price("USDC", "USDC"), Some(Decimal::ONE));
    }

    #[test]
    fn unknown_pair_is_none() {
        let table = StaticPriceTable::new();
        assert!(table.price("ETH", "DAI").is_none());
    }

    #[test]
    fn reload_replaces_table() {
        let table = StaticPriceTable::new();
        table.set("ETH", "USDC", Decimal::from(2_000));
        table.reload(vec![("MATIC".to_string(), "USDC".to_string(), Decimal::ONE)]);

        assert!(table.price("ETH", "USDC").is_none());
        assert_eq!(table.price("MATIC", "USDC"), Some(Decimal::ONE));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn zero_inverse_is_none() {
        let table = StaticPriceTable::new();
        table.set("ETH", "USDC", Decimal::ZERO);
        assert!(table.price("USDC", "ETH").is_none());
    }
}
