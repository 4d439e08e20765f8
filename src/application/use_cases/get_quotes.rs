//! # Quote Aggregation Use Case
//!
//! Fans a swap request out to every eligible venue concurrently, joins the
//! results under the caller's deadline, and ranks the survivors by net
//! output.
//!
//! Aggregation never fails outright: each per-venue outcome is captured
//! independently, and zero successes is reported as the distinct
//! `NoQuotesAvailable` condition rather than an error. Venues that miss the
//! deadline are aborted and excluded; their late results are discarded and
//! never mutate shared state.

use crate::application::services::fee_calculator::FeeCalculator;
use crate::application::services::ranking::{rank_quotes, RankedQuote};
use crate::application::services::resilience::ResilientAdapter;
use crate::domain::entities::SwapRequest;
use crate::domain::value_objects::VenueId;
use crate::infrastructure::pricing::PriceReference;
use crate::infrastructure::store::QuoteStore;
use crate::infrastructure::venues::error::VenueError;
use crate::infrastructure::venues::registry::VenueRegistry;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// How a single venue's quote attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VenueOutcomeKind {
    /// The venue returned a quote.
    Quoted,
    /// The venue does not serve this pair or chain (expected non-fault).
    Unsupported,
    /// The venue missed its budget or the aggregation deadline.
    TimedOut,
    /// The venue (or the local limiter) rejected the call rate.
    RateLimited,
    /// The venue's circuit was open; no call was made.
    CircuitOpen,
    /// The venue responded with a fault.
    UpstreamError,
}

/// Per-venue outcome captured during aggregation.
#[derive(Debug, Clone, Serialize)]
pub struct VenueOutcome {
    /// The venue.
    pub venue_id: VenueId,
    /// How the attempt ended.
    pub kind: VenueOutcomeKind,
    /// Time spent on this venue.
    pub latency: Duration,
    /// Error detail for non-quoted outcomes.
    pub detail: Option<String>,
}

impl VenueOutcome {
    fn quoted(venue_id: VenueId, latency: Duration) -> Self {
        Self {
            venue_id,
            kind: VenueOutcomeKind::Quoted,
            latency,
            detail: None,
        }
    }

    fn from_error(error: &VenueError, latency: Duration) -> Self {
        let kind = match error {
            VenueError::Unsupported { .. } => VenueOutcomeKind::Unsupported,
            VenueError::Timeout { .. } => VenueOutcomeKind::TimedOut,
            VenueError::RateLimited { .. } => VenueOutcomeKind::RateLimited,
            VenueError::CircuitOpen { .. } => VenueOutcomeKind::CircuitOpen,
            VenueError::Upstream { .. } | VenueError::Internal { .. } => {
                VenueOutcomeKind::UpstreamError
            }
        };
        Self {
            venue_id: error.venue().clone(),
            kind,
            latency,
            detail: Some(error.to_string()),
        }
    }

    fn deadline_missed(venue_id: VenueId, deadline: Duration) -> Self {
        Self {
            venue_id,
            kind: VenueOutcomeKind::TimedOut,
            latency: deadline,
            detail: Some("no response before aggregation deadline".to_string()),
        }
    }

    /// Returns true if this outcome represents a venue fault rather than a
    /// quote or an expected non-fault.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        !matches!(
            self.kind,
            VenueOutcomeKind::Quoted | VenueOutcomeKind::Unsupported
        )
    }
}

/// Aggregate condition of a `get_quotes` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationCondition {
    /// Every eligible venue either quoted or was legitimately unsupported.
    Fulfilled,
    /// Some venues faulted, but at least one quoted.
    Partial,
    /// No venue produced a quote. Distinct from a partial result.
    NoQuotesAvailable,
}

/// Result of a quote aggregation.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationOutcome {
    /// Ranked quotes, best first. Possibly empty.
    pub quotes: Vec<RankedQuote>,
    /// Per-venue outcomes, in venue order.
    pub venue_outcomes: Vec<VenueOutcome>,
    /// The aggregate condition.
    pub condition: AggregationCondition,
}

impl AggregationOutcome {
    /// Returns the best quote, if any.
    #[must_use]
    pub fn best(&self) -> Option<&RankedQuote> {
        self.quotes.first()
    }

    /// Returns true if no venue produced a quote.
    #[must_use]
    pub fn no_quotes_available(&self) -> bool {
        self.condition == AggregationCondition::NoQuotesAvailable
    }
}

/// The aggregator: eligibility, concurrent fan-out, deadline-bounded join,
/// ranking.
#[derive(Debug)]
pub struct QuoteAggregator {
    registry: Arc<VenueRegistry>,
    wrappers: HashMap<VenueId, Arc<ResilientAdapter>>,
    fee_calculator: FeeCalculator,
    prices: Arc<dyn PriceReference>,
    store: QuoteStore,
    max_deadline: Duration,
}

impl QuoteAggregator {
    /// Creates an aggregator with all dependencies.
    #[must_use]
    pub fn new(
        registry: Arc<VenueRegistry>,
        wrappers: HashMap<VenueId, Arc<ResilientAdapter>>,
        fee_calculator: FeeCalculator,
        prices: Arc<dyn PriceReference>,
        store: QuoteStore,
        max_deadline: Duration,
    ) -> Self {
        Self {
            registry,
            wrappers,
            fee_calculator,
            prices,
            store,
            max_deadline,
        }
    }

    /// Collects and ranks quotes for a request.
    ///
    /// Returns within the request deadline (capped by the configured
    /// maximum) regardless of how many venues are unresponsive.
    #[instrument(skip(self, request), fields(input = %request.input(), output = %request.output()))]
    pub async fn get_quotes(&self, request: &SwapRequest) -> AggregationOutcome {
        let deadline = request.deadline().min(self.max_deadline);
        let eligible = self.registry.eligible_for(request).await;

        if eligible.is_empty() {
            info!("no eligible venues for request");
            return AggregationOutcome {
                quotes: Vec::new(),
                venue_outcomes: Vec::new(),
                condition: AggregationCondition::NoQuotesAvailable,
            };
        }

        let mut pending: HashSet<VenueId> = HashSet::new();
        let mut tasks = FuturesUnordered::new();
        let mut abort_handles = Vec::new();

        for venue in &eligible {
            let venue_id = venue.descriptor.venue_id().clone();
            let Some(wrapper) = self.wrappers.get(&venue_id).map(Arc::clone) else {
                warn!(venue = %venue_id, "registered venue has no resilience wrapper");
                continue;
            };
            pending.insert(venue_id.clone());
            let task_request = request.clone();
            let handle = tokio::spawn(async move {
                let started = Instant::now();
                let result = wrapper.quote(&task_request, deadline).await;
                (venue_id, started.elapsed(), result)
            });
            abort_handles.push(handle.abort_handle());
            tasks.push(handle);
        }

        let mut quotes = Vec::new();
        let mut outcomes = Vec::new();
        let overall = tokio::time::sleep(deadline);
        tokio::pin!(overall);

        loop {
            tokio::select! {
                _ = &mut overall => break,
                joined = tasks.next() => match joined {
                    None => break,
                    Some(Ok((venue_id, latency, result))) => {
                        pending.remove(&venue_id);
                        match result {
                            Ok(quote) => {
                                debug!(venue = %venue_id, latency_ms = latency.as_millis() as u64, "venue quoted");
                                self.store.insert(request, quote.clone()).await;
                                outcomes.push(VenueOutcome::quoted(venue_id, latency));
                                quotes.push(quote);
                            }
                            Err(error) => {
                                debug!(venue = %venue_id, error = %error, "venue did not quote");
                                outcomes.push(VenueOutcome::from_error(&error, latency));
                            }
                        }
                    }
                    Some(Err(join_error)) => {
                        warn!(error = %join_error, "venue task failed to join");
                    }
                },
            }
        }

        // Slow venues are excluded, not awaited further; aborting drops their
        // in-flight requests so late completions cannot touch shared state.
        for handle in abort_handles {
            handle.abort();
        }
        for venue_id in pending {
            outcomes.push(VenueOutcome::deadline_missed(venue_id, deadline));
        }
        outcomes.sort_by(|a, b| a.venue_id.as_str().cmp(b.venue_id.as_str()));

        let ranked = rank_quotes(
            quotes,
            request.output(),
            &self.fee_calculator,
            self.prices.as_ref(),
        );

        let condition = if ranked.is_empty() {
            AggregationCondition::NoQuotesAvailable
        } else if outcomes.iter().any(VenueOutcome::is_fault) {
            AggregationCondition::Partial
        } else {
            AggregationCondition::Fulfilled
        };

        info!(
            quotes = ranked.len(),
            venues = outcomes.len(),
            condition = ?condition,
            "aggregation finished"
        );

        AggregationOutcome {
            quotes: ranked,
            venue_outcomes: outcomes,
            condition,
        }
    }

    /// Returns the quote store backing `build_execution`.
    #[must_use]
    pub fn store(&self) -> &QuoteStore {
        &self.store
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::services::resilience::ResilienceConfig;
    use crate::domain::entities::Quote;
    use crate::domain::value_objects::{ChainId, Token, TokenAmount};
    use crate::infrastructure::pricing::StaticPriceTable;
    use crate::infrastructure::venues::error::VenueResult;
    use crate::infrastructure::venues::registry::VenueDescriptor;
    use crate::infrastructure::venues::traits::QuoteAdapter;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    #[derive(Debug)]
    enum Behavior {
        Quote(u128),
        Fail,
        Slow(Duration, u128),
    }

    #[derive(Debug)]
    struct FakeAdapter {
        venue_id: VenueId,
        chains: Vec<ChainId>,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl FakeAdapter {
        fn new(id: &str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                venue_id: VenueId::new(id),
                chains: vec![ChainId::ETHEREUM],
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl QuoteAdapter for FakeAdapter {
        fn venue_id(&self) -> &VenueId {
            &self.venue_id
        }

        fn supported_chains(&self) -> &[ChainId] {
            &self.chains
        }

        async fn quote(&self, request: &SwapRequest) -> VenueResult<Quote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let amount_out = match &self.behavior {
                Behavior::Quote(out) => *out,
                Behavior::Fail => {
                    return Err(VenueError::upstream(
                        self.venue_id.clone(),
                        Some(500),
                        "synthetic failure",
                    ))
                }
                Behavior::Slow(delay, out) => {
                    sleep(*delay).await;
                    *out
                }
            };
            Ok(Quote::builder(
                self.venue_id.clone(),
                request.amount_in(),
                TokenAmount::new(amount_out),
            )
            .confidence(0.9)
            .build()
            .unwrap())
        }
    }

    fn request(deadline: Duration) -> SwapRequest {
        SwapRequest::new(
            Token::new("WETH", ChainId::ETHEREUM, 18),
            Token::new("USDC", ChainId::ETHEREUM, 6),
            TokenAmount::new(1_000),
            5,
            deadline,
        )
        .unwrap()
    }

    async fn build_aggregator(adapters: Vec<Arc<FakeAdapter>>) -> QuoteAggregator {
        let registry = Arc::new(VenueRegistry::new());
        let mut wrappers = HashMap::new();
        for adapter in adapters {
            let id = adapter.venue_id().clone();
            let descriptor = VenueDescriptor::new(
                id.clone(),
                id.to_string(),
                3,
                vec![ChainId::ETHEREUM],
            );
            registry
                .register(descriptor, adapter.clone() as Arc<dyn QuoteAdapter>)
                .await;
            let config = ResilienceConfig {
                call_timeout: Duration::from_millis(500),
                max_retries: 0,
                ..ResilienceConfig::default()
            };
            wrappers.insert(
                id,
                Arc::new(ResilientAdapter::new(
                    adapter as Arc<dyn QuoteAdapter>,
                    &config,
                )),
            );
        }
        QuoteAggregator::new(
            registry,
            wrappers,
            FeeCalculator::new(0),
            Arc::new(StaticPriceTable::new()),
            QuoteStore::new(Duration::from_secs(600)),
            Duration::from_secs(10),
        )
    }

    #[tokio::test]
    async fn ranks_all_venues_best_first() {
        let aggregator = build_aggregator(vec![
            FakeAdapter::new("venue-a", Behavior::Quote(95)),
            FakeAdapter::new("venue-b", Behavior::Quote(100)),
            FakeAdapter::new("venue-c", Behavior::Quote(90)),
        ])
        .await;

        let outcome = aggregator
            .get_quotes(&request(Duration::from_secs(2)))
            .await;

        let outputs: Vec<u128> = outcome
            .quotes
            .iter()
            .map(|r| r.quote.amount_out().get())
            .collect();
        assert_eq!(outputs, vec![100, 95, 90]);
        assert_eq!(outcome.condition, AggregationCondition::Fulfilled);
    }

    #[tokio::test]
    async fn partial_failure_is_not_an_error() {
        let aggregator = build_aggregator(vec![
            FakeAdapter::new("good", Behavior::Quote(100)),
            FakeAdapter::new("bad", Behavior::Fail),
        ])
        .await;

        let outcome = aggregator
            .get_quotes(&request(Duration::from_secs(2)))
            .await;

        assert_eq!(outcome.quotes.len(), 1);
        assert_eq!(outcome.condition, AggregationCondition::Partial);
        let bad = outcome
            .venue_outcomes
            .iter()
            .find(|o| o.venue_id.as_str() == "bad")
            .unwrap();
        assert_eq!(bad.kind, VenueOutcomeKind::UpstreamError);
    }

    #[tokio::test]
    async fn slow_venue_excluded_within_deadline() {
        let aggregator = build_aggregator(vec![
            FakeAdapter::new("fast", Behavior::Quote(100)),
            FakeAdapter::new("slow", Behavior::Slow(Duration::from_millis(2_000), 200)),
        ])
        .await;

        let started = Instant::now();
        let outcome = aggregator
            .get_quotes(&request(Duration::from_millis(200)))
            .await;

        assert!(started.elapsed() < Duration::from_millis(600));
        assert_eq!(outcome.quotes.len(), 1);
        assert_eq!(outcome.quotes[0].quote.venue_id().as_str(), "fast");
        let slow = outcome
            .venue_outcomes
            .iter()
            .find(|o| o.venue_id.as_str() == "slow")
            .unwrap();
        assert_eq!(slow.kind, VenueOutcomeKind::TimedOut);
    }

    #[tokio::test]
    async fn all_failures_reports_no_quotes_available() {
        let aggregator = build_aggregator(vec![
            FakeAdapter::new("bad-1", Behavior::Fail),
            FakeAdapter::new("bad-2", Behavior::Fail),
        ])
        .await;

        let outcome = aggregator
            .get_quotes(&request(Duration::from_secs(2)))
            .await;

        assert!(outcome.quotes.is_empty());
        assert!(outcome.no_quotes_available());
    }

    #[tokio::test]
    async fn no_eligible_venues_is_no_quotes_available() {
        let aggregator = build_aggregator(vec![]).await;
        let outcome = aggregator
            .get_quotes(&request(Duration::from_secs(2)))
            .await;
        assert!(outcome.no_quotes_available());
        assert!(outcome.venue_outcomes.is_empty());
    }

    #[tokio::test]
    async fn quotes_are_stored_for_execution() {
        let aggregator =
            build_aggregator(vec![FakeAdapter::new("venue", Behavior::Quote(100))]).await;

        let outcome = aggregator
            .get_quotes(&request(Duration::from_secs(2)))
            .await;
        let quote_id = outcome.best().unwrap().quote.id();

        assert!(aggregator.store().get(quote_id).await.is_some());
    }

    #[tokio::test]
    async fn open_circuits_short_circuit_without_network() {
        let bad = FakeAdapter::new("flaky", Behavior::Fail);
        let aggregator = build_aggregator(vec![bad.clone()]).await;

        // Five failures trip the default breaker.
        for _ in 0..5 {
            let _ = aggregator
                .get_quotes(&request(Duration::from_secs(2)))
                .await;
        }
        let calls_before = bad.calls.load(Ordering::SeqCst);
        assert_eq!(calls_before, 5);

        let outcome = aggregator
            .get_quotes(&request(Duration::from_secs(2)))
            .await;

        assert!(outcome.no_quotes_available());
        assert_eq!(
            outcome.venue_outcomes[0].kind,
            VenueOutcomeKind::CircuitOpen
        );
        // No new network attempt was made.
        assert_eq!(bad.calls.load(Ordering::SeqCst), calls_before);
    }

    #[tokio::test]
    async fn repeated_calls_rank_consistently() {
        let aggregator = build_aggregator(vec![
            FakeAdapter::new("a", Behavior::Quote(95)),
            FakeAdapter::new("b", Behavior::Quote(100)),
        ])
        .await;

        let first = aggregator
            .get_quotes(&request(Duration::from_secs(2)))
            .await;
        let second = aggregator
            .get_quotes(&request(Duration::from_secs(2)))
            .await;

        let order = |o: &AggregationOutcome| {
            o.quotes
                .iter()
                .map(|r| r.quote.venue_id().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(order(&first), order(&second));
    }
}
