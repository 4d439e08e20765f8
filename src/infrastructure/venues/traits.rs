//! # Venue Adapter Trait
//!
//! The uniform capability interface every venue implements.
//!
//! Adding a venue means implementing [`QuoteAdapter`] and registering the
//! instance in the venue registry; the aggregator never branches on a venue
//! identifier.

use crate::domain::entities::{Quote, SwapRequest};
use crate::domain::value_objects::{ChainId, VenueId};
use crate::infrastructure::venues::error::VenueResult;
use async_trait::async_trait;
use std::fmt;

/// Uniform quote contract over an external trading venue.
///
/// Implementations turn a generic [`SwapRequest`] into a venue-specific call
/// and normalize the response into a [`Quote`]. Adapters must not retry
/// internally; retry policy belongs to the resilience wrapper. The only side
/// effect of [`quote`] is the outbound call itself.
///
/// [`quote`]: QuoteAdapter::quote
#[async_trait]
pub trait QuoteAdapter: Send + Sync + fmt::Debug {
    /// Returns this venue's identifier.
    fn venue_id(&self) -> &VenueId;

    /// Returns the chains this adapter can serve.
    fn supported_chains(&self) -> &[ChainId];

    /// Requests a quote for the given swap.
    ///
    /// # Errors
    ///
    /// - `Unsupported` when the pair or chain is not served (expected)
    /// - `Timeout` when the upstream exceeds the call budget
    /// - `RateLimited` when the venue rejects the call rate
    /// - `Upstream` on a non-2xx or undecodable response
    async fn quote(&self, request: &SwapRequest) -> VenueResult<Quote>;

    /// Returns true if this adapter can serve both legs of the request.
    fn supports(&self, request: &SwapRequest) -> bool {
        let chains = self.supported_chains();
        chains.contains(&request.input().chain()) && chains.contains(&request.output().chain())
    }
}
