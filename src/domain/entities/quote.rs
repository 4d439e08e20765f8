//! # Quote
//!
//! A venue's proposed exchange for a requested swap.
//!
//! Quotes are immutable after construction; when venue data changes a new
//! `Quote` replaces the old one. The builder validates the route-hop chaining
//! invariant: where hop `i` feeds hop `i + 1` (its output token is the next
//! hop's input token), the amounts must connect exactly. Hops over the same
//! pair are parallel splits of the order and are exempt from chaining.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{QuoteId, Timestamp, Token, TokenAmount, VenueId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One leg of a multi-step swap path through a venue's liquidity.
///
/// Owned exclusively by the [`Quote`] that contains it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteHop {
    /// Venue or pool label serving this hop (e.g. `"Uniswap_V3"`).
    pub venue: String,
    /// Token entering this hop.
    pub input: Token,
    /// Token leaving this hop.
    pub output: Token,
    /// Amount entering this hop, in the input token's base units.
    pub amount_in: TokenAmount,
    /// Amount leaving this hop, in the output token's base units.
    pub amount_out: TokenAmount,
    /// Hop fee in per-mille.
    pub fee_pm: u32,
}

/// Transaction material a venue returns alongside a quote.
///
/// Opaque to the engine; an external signer consumes it. The engine only
/// copies it into the execution descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueCallData {
    /// Destination contract address.
    pub to: String,
    /// Hex-encoded calldata payload.
    pub payload: String,
    /// Native value to send with the transaction, in base units.
    pub value: TokenAmount,
    /// Gas limit for the transaction.
    pub gas_limit: u64,
}

/// A venue's quote for a swap request.
///
/// # Invariants
///
/// - `amount_out` is non-negative (by construction, `u128`)
/// - Sequential route hops chain: `hop[i].amount_out == hop[i + 1].amount_in`
/// - Confidence is within `[0, 1]`
/// - Never mutated after construction
///
/// # Examples
///
/// ```
/// use swap_router::domain::entities::quote::Quote;
/// use swap_router::domain::value_objects::{TokenAmount, VenueId};
///
/// let quote = Quote::builder(
///     VenueId::new("1inch"),
///     TokenAmount::new(1_000),
///     TokenAmount::new(995),
/// )
/// .price_impact_pm(4)
/// .confidence(0.9)
/// .build()
/// .unwrap();
///
/// assert_eq!(quote.amount_out().get(), 995);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    id: QuoteId,
    venue_id: VenueId,
    amount_in: TokenAmount,
    amount_out: TokenAmount,
    price_impact_pm: u32,
    estimated_cost_native: TokenAmount,
    route: Vec<RouteHop>,
    confidence: f64,
    call_data: Option<VenueCallData>,
    created_at: Timestamp,
}

impl Quote {
    /// Starts building a quote.
    #[must_use]
    pub fn builder(venue_id: VenueId, amount_in: TokenAmount, amount_out: TokenAmount) -> QuoteBuilder {
        QuoteBuilder::new(venue_id, amount_in, amount_out)
    }

    /// Returns the quote identifier.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> QuoteId {
        self.id
    }

    /// Returns the quoting venue.
    #[inline]
    #[must_use]
    pub fn venue_id(&self) -> &VenueId {
        &self.venue_id
    }

    /// Returns the input amount in base units.
    #[inline]
    #[must_use]
    pub const fn amount_in(&self) -> TokenAmount {
        self.amount_in
    }

    /// Returns the output amount in base units.
    #[inline]
    #[must_use]
    pub const fn amount_out(&self) -> TokenAmount {
        self.amount_out
    }

    /// Returns the estimated price impact in per-mille.
    #[inline]
    #[must_use]
    pub const fn price_impact_pm(&self) -> u32 {
        self.price_impact_pm
    }

    /// Returns the estimated execution cost in native gas-token base units.
    #[inline]
    #[must_use]
    pub const fn estimated_cost_native(&self) -> TokenAmount {
        self.estimated_cost_native
    }

    /// Returns the route hops.
    #[inline]
    #[must_use]
    pub fn route(&self) -> &[RouteHop] {
        &self.route
    }

    /// Returns the confidence score in `[0, 1]`.
    #[inline]
    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Returns the venue call data, if the venue supplied any.
    #[inline]
    #[must_use]
    pub fn call_data(&self) -> Option<&VenueCallData> {
        self.call_data.as_ref()
    }

    /// Returns the freshness timestamp set at quote time.
    #[inline]
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns the quote's age.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Returns true if the quote is still within the freshness window.
    #[must_use]
    pub fn is_fresh(&self, window: Duration) -> bool {
        !self.created_at.is_older_than(window)
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quote({} in={} out={} impact={}\u{2030} conf={:.2})",
            self.venue_id, self.amount_in, self.amount_out, self.price_impact_pm, self.confidence
        )
    }
}

/// Builder for [`Quote`].
///
/// Validates route chaining and confidence range at `build` time.
#[derive(Debug)]
pub struct QuoteBuilder {
    venue_id: VenueId,
    amount_in: TokenAmount,
    amount_out: TokenAmount,
    price_impact_pm: u32,
    estimated_cost_native: TokenAmount,
    route: Vec<RouteHop>,
    confidence: f64,
    call_data: Option<VenueCallData>,
    created_at: Option<Timestamp>,
}

impl QuoteBuilder {
    /// Creates a new builder with required fields.
    #[must_use]
    pub fn new(venue_id: VenueId, amount_in: TokenAmount, amount_out: TokenAmount) -> Self {
        Self {
            venue_id,
            amount_in,
            amount_out,
            price_impact_pm: 0,
            estimated_cost_native: TokenAmount::ZERO,
            route: Vec::new(),
            confidence: 1.0,
            call_data: None,
            created_at: None,
        }
    }

    /// Sets the estimated price impact in per-mille.
    #[must_use]
    pub fn price_impact_pm(mut self, pm: u32) -> Self {
        self.price_impact_pm = pm;
        self
    }

    /// Sets the estimated execution cost in native gas-token base units.
    #[must_use]
    pub fn estimated_cost_native(mut self, cost: TokenAmount) -> Self {
        self.estimated_cost_native = cost;
        self
    }

    /// Sets the route hops.
    #[must_use]
    pub fn route(mut self, route: Vec<RouteHop>) -> Self {
        self.route = route;
        self
    }

    /// Sets the confidence score.
    #[must_use]
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Attaches venue call data.
    #[must_use]
    pub fn call_data(mut self, call_data: VenueCallData) -> Self {
        self.call_data = Some(call_data);
        self
    }

    /// Overrides the freshness timestamp. Intended for tests; production
    /// quotes stamp the build time.
    #[must_use]
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Builds the quote, validating invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::BrokenRoute`] if sequential hops do not chain,
    /// or [`DomainError::InvalidConfidence`] if the score is outside `[0, 1]`.
    pub fn build(self) -> DomainResult<Quote> {
        if !(0.0..=1.0).contains(&self.confidence) || self.confidence.is_nan() {
            return Err(DomainError::InvalidConfidence(self.confidence));
        }
        for (index, pair) in self.route.windows(2).enumerate() {
            let feeds_next = pair[0].output.same_asset(&pair[1].input);
            if feeds_next && pair[0].amount_out != pair[1].amount_in {
                return Err(DomainError::BrokenRoute { index });
            }
        }

        Ok(Quote {
            id: QuoteId::new_v4(),
            venue_id: self.venue_id,
            amount_in: self.amount_in,
            amount_out: self.amount_out,
            price_impact_pm: self.price_impact_pm,
            estimated_cost_native: self.estimated_cost_native,
            route: self.route,
            confidence: self.confidence,
            call_data: self.call_data,
            created_at: self.created_at.unwrap_or_else(Timestamp::now),
        })
    }
}
