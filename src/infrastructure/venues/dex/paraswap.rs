//! # ParaSwap Adapter
//!
//! [`QuoteAdapter`] implementation for the ParaSwap API (v5).
//!
//! Quotes come from the prices endpoint; price impact is derived from the
//! USD valuations in the price route. When a user address is configured the
//! adapter additionally builds firm transaction data through the transactions
//! endpoint, passing the price route back verbatim.

use crate::domain::entities::quote::{Quote, RouteHop, VenueCallData};
use crate::domain::entities::SwapRequest;
use crate::domain::value_objects::{ChainId, TokenAmount, VenueId};
use crate::infrastructure::venues::error::{VenueError, VenueResult};
use crate::infrastructure::venues::http_client::HttpClient;
use crate::infrastructure::venues::traits::QuoteAdapter;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::fmt;

/// Default timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Confidence when firm transaction data is built.
const TX_CONFIDENCE: f64 = 0.9;

/// Confidence for price-route-only quotes.
const PRICES_CONFIDENCE: f64 = 0.8;

/// One exchange split inside a ParaSwap route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaSwapExchange {
    /// Exchange name.
    pub exchange: String,
    /// Share of this swap routed through the exchange, in percent.
    pub percent: f64,
    /// Input amount for this split.
    pub src_amount: String,
    /// Output amount for this split.
    pub dest_amount: String,
}

/// One swap inside a ParaSwap route leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaSwapSwap {
    /// Exchange splits for this swap.
    pub swap_exchanges: Vec<ParaSwapExchange>,
}

/// One leg of the best route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParaSwapRouteLeg {
    /// Share of the order taking this leg, in percent.
    pub percent: f64,
    /// Swaps composing this leg.
    pub swaps: Vec<ParaSwapSwap>,
}

/// The priced route from the prices endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaSwapPriceRoute {
    /// Input amount in base units.
    pub src_amount: String,
    /// Output amount in base units.
    pub dest_amount: String,
    /// USD valuation of the input.
    #[serde(rename = "srcUSD")]
    pub src_usd: Option<String>,
    /// USD valuation of the output.
    #[serde(rename = "destUSD")]
    pub dest_usd: Option<String>,
    /// Gas cost estimate in native base units (wei).
    pub gas_cost: Option<String>,
    /// Best route legs.
    pub best_route: Option<Vec<ParaSwapRouteLeg>>,
}

/// Envelope of the prices endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaSwapPricesResponse {
    /// The priced route, kept raw so it can be echoed to the transactions
    /// endpoint unchanged.
    pub price_route: serde_json::Value,
}

/// Response from the transactions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParaSwapTxResponse {
    /// Destination contract.
    pub to: String,
    /// Calldata.
    pub data: String,
    /// Native value in wei.
    pub value: String,
    /// Gas limit, as a string per the API.
    pub gas: Option<String>,
}

/// Configuration for the ParaSwap adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParaSwapConfig {
    venue_id: VenueId,
    chains: Vec<ChainId>,
    base_url: String,
    timeout_ms: u64,
    slippage_pm: u32,
    /// User address enabling the transactions endpoint.
    user_address: Option<String>,
    token_addresses: HashMap<String, String>,
}

impl ParaSwapConfig {
    /// Creates a new ParaSwap configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            venue_id: VenueId::new("paraswap"),
            chains: vec![ChainId::ETHEREUM],
            base_url: "https://apiv5.paraswap.io".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            slippage_pm: 5,
            user_address: None,
            token_addresses: default_token_addresses(),
        }
    }

    /// Sets the venue ID.
    #[must_use]
    pub fn with_venue_id(mut self, venue_id: impl Into<String>) -> Self {
        self.venue_id = VenueId::new(venue_id);
        self
    }

    /// Sets the supported chains.
    #[must_use]
    pub fn with_chains(mut self, chains: Vec<ChainId>) -> Self {
        self.chains = chains;
        self
    }

    /// Sets a base URL override.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the request timeout in milliseconds.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the slippage applied when building transactions, in per-mille.
    #[must_use]
    pub fn with_slippage_pm(mut self, slippage_pm: u32) -> Self {
        self.slippage_pm = slippage_pm;
        self
    }

    /// Sets the user address enabling firm transaction building.
    #[must_use]
    pub fn with_user_address(mut self, address: impl Into<String>) -> Self {
        self.user_address = Some(address.into());
        self
    }

    /// Adds a token address mapping.
    #[must_use]
    pub fn with_token_address(
        mut self,
        symbol: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        self.token_addresses.insert(symbol.into(), address.into());
        self
    }

    /// Returns the venue ID.
    #[inline]
    #[must_use]
    pub fn venue_id(&self) -> &VenueId {
        &self.venue_id
    }

    /// Resolves a token symbol to an address.
    #[must_use]
    pub fn resolve_token_address(&self, symbol: &str) -> Option<&String> {
        self.token_addresses.get(symbol)
    }
}

impl Default for ParaSwapConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_token_addresses() -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert(
        "WETH".to_string(),
        "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".to_string(),
    );
    map.insert(
        "USDC".to_string(),
        "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
    );
    map.insert(
        "USDT".to_string(),
        "0xdAC17F958D2ee523a2206206994597C13D831ec7".to_string(),
    );
    map.insert(
        "DAI".to_string(),
        "0x6B175474E89094C44Da98b954EeddeBC35e4D1".to_string(),
    );
    map
}

/// ParaSwap API adapter.
pub struct ParaSwapAdapter {
    config: ParaSwapConfig,
    http_client: HttpClient,
}

impl ParaSwapAdapter {
    /// Creates a new ParaSwap adapter.
    ///
    /// # Errors
    ///
    /// Returns `VenueError::Internal` if the HTTP client cannot be created.
    pub fn new(config: ParaSwapConfig) -> VenueResult<Self> {
        let http_client = HttpClient::new(&config.venue_id, config.timeout_ms)?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ParaSwapConfig {
        &self.config
    }

    fn resolve_tokens(&self, request: &SwapRequest) -> VenueResult<(String, String)> {
        let src = self
            .config
            .resolve_token_address(request.input().symbol())
            .ok_or_else(|| {
                VenueError::unsupported(
                    self.config.venue_id.clone(),
                    format!("unknown token {}", request.input().symbol()),
                )
            })?
            .clone();
        let dest = self
            .config
            .resolve_token_address(request.output().symbol())
            .ok_or_else(|| {
                VenueError::unsupported(
                    self.config.venue_id.clone(),
                    format!("unknown token {}", request.output().symbol()),
                )
            })?
            .clone();
        Ok((src, dest))
    }

    /// Derives price impact in per-mille from the USD valuations.
    fn price_impact_pm(route: &ParaSwapPriceRoute) -> u32 {
        let src = route.src_usd.as_deref().and_then(|v| v.parse::<f64>().ok());
        let dest = route
            .dest_usd
            .as_deref()
            .and_then(|v| v.parse::<f64>().ok());
        match (src, dest) {
            (Some(src), Some(dest)) if src > 0.0 => {
                let impact = (1.0 - dest / src).max(0.0);
                (impact * 1_000.0).round() as u32
            }
            _ => 0,
        }
    }

    fn extract_route(&self, request: &SwapRequest, route: &ParaSwapPriceRoute) -> Vec<RouteHop> {
        let Some(legs) = &route.best_route else {
            return Vec::new();
        };
        legs.iter()
            .flat_map(|leg| leg.swaps.iter())
            .flat_map(|swap| swap.swap_exchanges.iter())
            .filter(|split| split.percent > 0.0)
            .map(|split| RouteHop {
                venue: split.exchange.clone(),
                input: request.input().clone(),
                output: request.output().clone(),
                amount_in: TokenAmount::new(split.src_amount.parse::<u128>().unwrap_or(0)),
                amount_out: TokenAmount::new(split.dest_amount.parse::<u128>().unwrap_or(0)),
                fee_pm: 0,
            })
            .collect()
    }

    /// Normalizes a price route (plus optional transaction data) into a quote.
    ///
    /// # Errors
    ///
    /// Returns `VenueError::Upstream` if the route payload is malformed.
    pub fn parse_price_route(
        &self,
        request: &SwapRequest,
        raw_route: &serde_json::Value,
        tx: Option<ParaSwapTxResponse>,
    ) -> VenueResult<Quote> {
        let route: ParaSwapPriceRoute =
            serde_json::from_value(raw_route.clone()).map_err(|e| {
                VenueError::upstream(
                    self.config.venue_id.clone(),
                    None,
                    format!("invalid priceRoute: {e}"),
                )
            })?;

        let amount_out = route
            .dest_amount
            .parse::<u128>()
            .map(TokenAmount::new)
            .map_err(|_| {
                VenueError::upstream(
                    self.config.venue_id.clone(),
                    None,
                    "invalid destAmount in priceRoute",
                )
            })?;

        let cost = TokenAmount::new(
            route
                .gas_cost
                .as_deref()
                .and_then(|g| g.parse::<u128>().ok())
                .unwrap_or(0),
        );

        let mut builder =
            Quote::builder(self.config.venue_id.clone(), request.amount_in(), amount_out)
                .price_impact_pm(Self::price_impact_pm(&route))
                .estimated_cost_native(cost)
                .route(self.extract_route(request, &route));

        builder = match tx {
            Some(tx) => builder.confidence(TX_CONFIDENCE).call_data(VenueCallData {
                to: tx.to,
                payload: tx.data,
                value: TokenAmount::new(tx.value.parse::<u128>().unwrap_or(0)),
                gas_limit: tx.gas.as_deref().and_then(|g| g.parse::<u64>().ok()).unwrap_or(0),
            }),
            None => builder.confidence(PRICES_CONFIDENCE),
        };

        builder.build().map_err(|e| {
            VenueError::upstream(self.config.venue_id.clone(), None, e.to_string())
        })
    }

    async fn build_transaction(
        &self,
        request: &SwapRequest,
        raw_route: &serde_json::Value,
        src_token: &str,
        dest_token: &str,
        user_address: &str,
    ) -> VenueResult<ParaSwapTxResponse> {
        let url = format!(
            "{}/transactions/{}",
            self.config.base_url,
            request.input().chain().get()
        );
        let dest_amount = raw_route
            .get("destAmount")
            .and_then(|v| v.as_str())
            .unwrap_or("0");
        // Minimum accepted output after our slippage tolerance.
        let min_amount = dest_amount
            .parse::<u128>()
            .map(|v| TokenAmount::new(v).saturating_sub(
                TokenAmount::new(v).mul_per_mille(self.config.slippage_pm),
            ))
            .unwrap_or(TokenAmount::ZERO);

        let body = json!({
            "srcToken": src_token,
            "destToken": dest_token,
            "srcAmount": request.amount_in().to_string(),
            "destAmount": min_amount.to_string(),
            "priceRoute": raw_route,
            "userAddress": user_address,
        });

        self.http_client
            .post_json(
                &self.config.venue_id,
                &url,
                &[("ignoreChecks", "true".to_string())],
                &body,
            )
            .await
    }
}

impl fmt::Debug for ParaSwapAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParaSwapAdapter")
            .field("venue_id", self.config.venue_id())
            .field("chains", &self.config.chains)
            .finish()
    }
}

#[async_trait]
impl QuoteAdapter for ParaSwapAdapter {
    fn venue_id(&self) -> &VenueId {
        &self.config.venue_id
    }

    fn supported_chains(&self) -> &[ChainId] {
        &self.config.chains
    }

    async fn quote(&self, request: &SwapRequest) -> VenueResult<Quote> {
        if !self.supports(request) {
            return Err(VenueError::unsupported(
                self.config.venue_id.clone(),
                format!(
                    "chain pair {}/{} not served",
                    request.input().chain(),
                    request.output().chain()
                ),
            ));
        }

        let (src_token, dest_token) = self.resolve_tokens(request)?;
        let url = format!("{}/prices", self.config.base_url);
        let params = vec![
            ("srcToken", src_token.clone()),
            ("destToken", dest_token.clone()),
            ("amount", request.amount_in().to_string()),
            ("srcDecimals", request.input().decimals().to_string()),
            ("destDecimals", request.output().decimals().to_string()),
            ("side", "SELL".to_string()),
            ("network", request.input().chain().get().to_string()),
        ];

        let prices: ParaSwapPricesResponse = self
            .http_client
            .get_json(&self.config.venue_id, &url, &params)
            .await?;

        let tx = match &self.config.user_address {
            Some(user) => Some(
                self.build_transaction(request, &prices.price_route, &src_token, &dest_token, user)
                    .await?,
            ),
            None => None,
        };

        self.parse_price_route(request, &prices.price_route, tx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Token;
    use std::time::Duration;

    fn test_request() -> SwapRequest {
        SwapRequest::new(
            Token::new("WETH", ChainId::ETHEREUM, 18),
            Token::new("USDC", ChainId::ETHEREUM, 6),
            TokenAmount::new(1_000_000_000_000_000_000),
            5,
            Duration::from_secs(3),
        )
        .unwrap()
    }

    fn raw_route() -> serde_json::Value {
        json!({
            "srcAmount": "1000000000000000000",
            "destAmount": "1850000000",
            "srcUSD": "1852.30",
            "destUSD": "1850.00",
            "gasCost": "4200000000000000",
            "bestRoute": [{
                "percent": 100.0,
                "swaps": [{
                    "swapExchanges": [
                        {
                            "exchange": "UniswapV3",
                            "percent": 100.0,
                            "srcAmount": "1000000000000000000",
                            "destAmount": "1850000000"
                        }
                    ]
                }]
            }]
        })
    }

    #[test]
    fn parses_price_route() {
        let adapter = ParaSwapAdapter::new(ParaSwapConfig::new()).unwrap();
        let quote = adapter
            .parse_price_route(&test_request(), &raw_route(), None)
            .unwrap();

        assert_eq!(quote.amount_out().get(), 1_850_000_000);
        assert_eq!(quote.estimated_cost_native().get(), 4_200_000_000_000_000);
        assert_eq!(quote.route().len(), 1);
        assert!(quote.call_data().is_none());
        assert!((quote.confidence() - PRICES_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[test]
    fn impact_from_usd_valuations() {
        // 1852.30 -> 1850.00 is a ~0.12% drop, 1 per-mille rounded.
        let route: ParaSwapPriceRoute = serde_json::from_value(raw_route()).unwrap();
        assert_eq!(ParaSwapAdapter::price_impact_pm(&route), 1);
    }

    #[test]
    fn impact_missing_valuations_is_zero() {
        let mut raw = raw_route();
        raw.as_object_mut().unwrap().remove("srcUSD");
        let route: ParaSwapPriceRoute = serde_json::from_value(raw).unwrap();
        assert_eq!(ParaSwapAdapter::price_impact_pm(&route), 0);
    }

    #[test]
    fn tx_attaches_call_data() {
        let adapter = ParaSwapAdapter::new(ParaSwapConfig::new()).unwrap();
        let tx = ParaSwapTxResponse {
            to: "0xdef171fe48cf0115b1d80b88dc8eab59176fee57".to_string(),
            data: "0xfeedface".to_string(),
            value: "0".to_string(),
            gas: Some("400000".to_string()),
        };

        let quote = adapter
            .parse_price_route(&test_request(), &raw_route(), Some(tx))
            .unwrap();
        assert_eq!(quote.call_data().unwrap().gas_limit, 400_000);
        assert!((quote.confidence() - TX_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_route_is_upstream_error() {
        let adapter = ParaSwapAdapter::new(ParaSwapConfig::new()).unwrap();
        let err = adapter
            .parse_price_route(&test_request(), &json!({"destAmount": 42}), None)
            .unwrap_err();
        assert!(matches!(err, VenueError::Upstream { .. }));
    }

    #[tokio::test]
    async fn unknown_token_rejected_without_call() {
        let adapter = ParaSwapAdapter::new(ParaSwapConfig::new()).unwrap();
        let request = SwapRequest::new(
            Token::new("UNLISTED", ChainId::ETHEREUM, 18),
            Token::new("USDC", ChainId::ETHEREUM, 6),
            TokenAmount::new(1),
            5,
            Duration::from_secs(3),
        )
        .unwrap();

        let err = adapter.quote(&request).await.unwrap_err();
        assert!(matches!(err, VenueError::Unsupported { .. }));
    }
}
