//! # Routing Engine
//!
//! The explicit context object wiring the whole core together: venue
//! registry, per-venue resilience wrappers, fee calculator, price reference,
//! quote store, aggregator and router.
//!
//! Constructed once at startup and passed to callers; no global state is
//! involved, so isolated tests and multiple independent instances are
//! straightforward.

use crate::application::services::circuit_breaker::CircuitSnapshot;
use crate::application::services::fee_calculator::FeeCalculator;
use crate::application::services::resilience::{ResilienceConfig, ResilientAdapter};
use crate::application::use_cases::build_execution::{ExecutionRouter, RouterError};
use crate::application::use_cases::get_quotes::{AggregationOutcome, QuoteAggregator};
use crate::config::{AppConfig, VenueKind};
use crate::domain::entities::execution::{ExecutionDescriptor, ExecutionStatus};
use crate::domain::entities::SwapRequest;
use crate::domain::value_objects::{ChainId, ExecutionId, QuoteId, VenueId};
use crate::infrastructure::pricing::StaticPriceTable;
use crate::infrastructure::store::QuoteStore;
use crate::infrastructure::venues::dex::{
    OneInchAdapter, OneInchConfig, ParaSwapAdapter, ParaSwapConfig, ZeroXAdapter, ZeroXConfig,
};
use crate::infrastructure::venues::registry::{VenueDescriptor, VenueRegistry};
use crate::infrastructure::venues::traits::QuoteAdapter;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Error raised while assembling an engine from configuration.
#[derive(Debug, Error)]
pub enum EngineBuildError {
    /// A venue adapter could not be constructed.
    #[error("venue {venue}: {message}")]
    Adapter {
        /// The venue entry that failed.
        venue: String,
        /// Why construction failed.
        message: String,
    },

    /// A configured price could not be represented.
    #[error("invalid price for {base}/{quote}")]
    InvalidPrice {
        /// Base symbol.
        base: String,
        /// Quote symbol.
        quote: String,
    },
}

/// The assembled quote aggregation and routing engine.
///
/// # Examples
///
/// ```ignore
/// let config = AppConfig::load()?;
/// let engine = RoutingEngine::from_config(&config).await?;
///
/// let outcome = engine.get_quotes(&request).await;
/// if let Some(best) = outcome.best() {
///     let execution = engine.build_execution(best.quote.id()).await?;
/// }
/// ```
#[derive(Debug)]
pub struct RoutingEngine {
    registry: Arc<VenueRegistry>,
    wrappers: HashMap<VenueId, Arc<ResilientAdapter>>,
    aggregator: QuoteAggregator,
    router: ExecutionRouter,
    prices: Arc<StaticPriceTable>,
}

impl RoutingEngine {
    /// Starts building an engine by hand, for tests or embedding.
    #[must_use]
    pub fn builder() -> RoutingEngineBuilder {
        RoutingEngineBuilder::new()
    }

    /// Assembles an engine from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineBuildError`] if a venue adapter cannot be constructed
    /// or a configured price is not representable.
    pub async fn from_config(config: &AppConfig) -> Result<Self, EngineBuildError> {
        let mut builder = RoutingEngineBuilder::new()
            .platform_fee_pm(config.platform_fee_pm)
            .freshness_window(Duration::from_secs(config.freshness_window_secs))
            .max_deadline(Duration::from_millis(config.max_deadline_ms))
            .quote_retention(Duration::from_secs(config.quote_retention_secs));

        for entry in &config.venues {
            let chains: Vec<ChainId> = entry.chains.iter().map(|c| ChainId::new(*c)).collect();
            let adapter: Arc<dyn QuoteAdapter> = match entry.kind {
                VenueKind::ZeroX => {
                    let mut adapter_config = ZeroXConfig::new(entry.api_key.clone().unwrap_or_default())
                        .with_venue_id(entry.id.clone())
                        .with_chains(chains.clone());
                    if let Some(url) = &entry.base_url {
                        adapter_config = adapter_config.with_base_url(url.clone());
                    }
                    if let Some(timeout) = entry.timeout_ms {
                        adapter_config = adapter_config.with_timeout_ms(timeout);
                    }
                    if let Some(wallet) = &entry.wallet_address {
                        adapter_config = adapter_config.with_taker_address(wallet.clone());
                    }
                    Arc::new(ZeroXAdapter::new(adapter_config).map_err(|e| {
                        EngineBuildError::Adapter {
                            venue: entry.id.clone(),
                            message: e.to_string(),
                        }
                    })?)
                }
                VenueKind::OneInch => {
                    let mut adapter_config = OneInchConfig::new()
                        .with_venue_id(entry.id.clone())
                        .with_chains(chains.clone());
                    if let Some(key) = &entry.api_key {
                        adapter_config = adapter_config.with_api_key(key.clone());
                    }
                    if let Some(url) = &entry.base_url {
                        adapter_config = adapter_config.with_base_url(url.clone());
                    }
                    if let Some(timeout) = entry.timeout_ms {
                        adapter_config = adapter_config.with_timeout_ms(timeout);
                    }
                    if let Some(wallet) = &entry.wallet_address {
                        adapter_config = adapter_config.with_wallet_address(wallet.clone());
                    }
                    Arc::new(OneInchAdapter::new(adapter_config).map_err(|e| {
                        EngineBuildError::Adapter {
                            venue: entry.id.clone(),
                            message: e.to_string(),
                        }
                    })?)
                }
                VenueKind::ParaSwap => {
                    let mut adapter_config = ParaSwapConfig::new()
                        .with_venue_id(entry.id.clone())
                        .with_chains(chains.clone());
                    if let Some(url) = &entry.base_url {
                        adapter_config = adapter_config.with_base_url(url.clone());
                    }
                    if let Some(timeout) = entry.timeout_ms {
                        adapter_config = adapter_config.with_timeout_ms(timeout);
                    }
                    if let Some(wallet) = &entry.wallet_address {
                        adapter_config = adapter_config.with_user_address(wallet.clone());
                    }
                    Arc::new(ParaSwapAdapter::new(adapter_config).map_err(|e| {
                        EngineBuildError::Adapter {
                            venue: entry.id.clone(),
                            message: e.to_string(),
                        }
                    })?)
                }
            };

            let descriptor = VenueDescriptor::new(
                VenueId::new(entry.id.clone()),
                entry.display_name.clone(),
                entry.fee_pm,
                chains,
            )
            .with_active(entry.active)
            .with_nominal_gas(entry.nominal_gas);

            let resilience = config.resilience.to_resilience_config(entry);
            builder = builder.venue(descriptor, adapter, resilience);
        }

        for price in &config.prices {
            let value = Decimal::try_from(price.price).map_err(|_| {
                EngineBuildError::InvalidPrice {
                    base: price.base.clone(),
                    quote: price.quote.clone(),
                }
            })?;
            builder = builder.price(price.base.clone(), price.quote.clone(), value);
        }

        Ok(builder.build().await)
    }

    /// Collects and ranks quotes for a validated request.
    pub async fn get_quotes(&self, request: &SwapRequest) -> AggregationOutcome {
        self.aggregator.get_quotes(request).await
    }

    /// Builds an execution descriptor for a previously returned quote.
    ///
    /// # Errors
    ///
    /// Returns a [`RouterError`] for stale quotes, breached slippage
    /// tolerance, unknown or already-accepted quotes.
    pub async fn build_execution(
        &self,
        quote_id: QuoteId,
    ) -> Result<ExecutionDescriptor, RouterError> {
        self.router.build_execution(quote_id).await
    }

    /// Applies an externally observed execution status update.
    ///
    /// # Errors
    ///
    /// Returns a [`RouterError`] for unknown descriptors or out-of-order
    /// transitions.
    pub async fn apply_execution_status(
        &self,
        execution_id: ExecutionId,
        status: ExecutionStatus,
    ) -> Result<ExecutionDescriptor, RouterError> {
        self.router.apply_status(execution_id, status).await
    }

    /// Returns an execution descriptor by ID.
    pub async fn execution(&self, execution_id: ExecutionId) -> Option<ExecutionDescriptor> {
        self.router.execution(execution_id).await
    }

    /// Returns the venue registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<VenueRegistry> {
        &self.registry
    }

    /// Returns the reloadable price table.
    #[must_use]
    pub fn prices(&self) -> &Arc<StaticPriceTable> {
        &self.prices
    }

    /// Returns every venue's circuit state and counters.
    #[must_use]
    pub fn circuit_snapshots(&self) -> Vec<(VenueId, CircuitSnapshot)> {
        self.wrappers
            .iter()
            .map(|(id, w)| (id.clone(), w.circuit_snapshot()))
            .collect()
    }
}

/// Builder assembling a [`RoutingEngine`] piece by piece.
pub struct RoutingEngineBuilder {
    platform_fee_pm: u32,
    freshness_window: Duration,
    max_deadline: Duration,
    quote_retention: Duration,
    venues: Vec<(VenueDescriptor, Arc<dyn QuoteAdapter>, ResilienceConfig)>,
    prices: Vec<(String, String, Decimal)>,
}

impl RoutingEngineBuilder {
    /// Creates a builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            platform_fee_pm: 3,
            freshness_window: Duration::from_secs(600),
            max_deadline: Duration::from_secs(10),
            quote_retention: Duration::from_secs(3_600),
            venues: Vec::new(),
            prices: Vec::new(),
        }
    }

    /// Sets the platform fee in per-mille.
    #[must_use]
    pub fn platform_fee_pm(mut self, fee_pm: u32) -> Self {
        self.platform_fee_pm = fee_pm;
        self
    }

    /// Sets the execution freshness window.
    #[must_use]
    pub fn freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    /// Sets the cap applied to caller deadlines.
    #[must_use]
    pub fn max_deadline(mut self, max_deadline: Duration) -> Self {
        self.max_deadline = max_deadline;
        self
    }

    /// Sets how long quotes stay addressable for execution.
    #[must_use]
    pub fn quote_retention(mut self, retention: Duration) -> Self {
        self.quote_retention = retention;
        self
    }

    /// Adds a venue with its resilience configuration.
    #[must_use]
    pub fn venue(
        mut self,
        descriptor: VenueDescriptor,
        adapter: Arc<dyn QuoteAdapter>,
        resilience: ResilienceConfig,
    ) -> Self {
        self.venues.push((descriptor, adapter, resilience));
        self
    }

    /// Seeds a price reference entry.
    #[must_use]
    pub fn price(mut self, base: String, quote: String, value: Decimal) -> Self {
        self.prices.push((base, quote, value));
        self
    }

    /// Assembles the engine.
    pub async fn build(self) -> RoutingEngine {
        let registry = Arc::new(VenueRegistry::new());
        let prices = Arc::new(StaticPriceTable::new());
        for (base, quote, value) in self.prices {
            prices.set(base, quote, value);
        }

        let mut wrappers = HashMap::new();
        for (descriptor, adapter, resilience) in self.venues {
            let venue_id = descriptor.venue_id().clone();
            let wrapper = Arc::new(ResilientAdapter::new(Arc::clone(&adapter), &resilience));
            registry.register(descriptor, adapter).await;
            wrappers.insert(venue_id, wrapper);
        }

        let store = QuoteStore::new(self.quote_retention);
        let aggregator = QuoteAggregator::new(
            Arc::clone(&registry),
            wrappers.clone(),
            FeeCalculator::new(self.platform_fee_pm),
            Arc::clone(&prices) as Arc<dyn crate::infrastructure::pricing::PriceReference>,
            store.clone(),
            self.max_deadline,
        );
        let router = ExecutionRouter::new(store, self.freshness_window);

        info!(
            venues = wrappers.len(),
            platform_fee_pm = self.platform_fee_pm,
            "routing engine assembled"
        );

        RoutingEngine {
            registry,
            wrappers,
            aggregator,
            router,
            prices,
        }
    }
}

impl Default for RoutingEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
