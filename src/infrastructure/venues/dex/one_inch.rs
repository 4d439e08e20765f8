//! # 1inch Adapter
//!
//! [`QuoteAdapter`] implementation for the 1inch aggregation API (v5).
//!
//! When a wallet address is configured the adapter calls the swap endpoint and
//! attaches firm transaction data to the quote; otherwise it falls back to the
//! quote endpoint, which returns amounts without calldata, and lowers the
//! confidence score accordingly.

use crate::domain::entities::quote::{Quote, RouteHop, VenueCallData};
use crate::domain::entities::SwapRequest;
use crate::domain::value_objects::{ChainId, TokenAmount, VenueId};
use crate::infrastructure::venues::error::{VenueError, VenueResult};
use crate::infrastructure::venues::http_client::HttpClient;
use crate::infrastructure::venues::traits::QuoteAdapter;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Default timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Confidence when firm swap calldata is returned.
const SWAP_CONFIDENCE: f64 = 0.9;

/// Confidence for quote-only responses (routing approximated, no calldata).
const QUOTE_ONLY_CONFIDENCE: f64 = 0.75;

/// One leg of a 1inch routing protocol entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneInchProtocol {
    /// Liquidity source name.
    pub name: String,
    /// Share of the order routed through this source, in percent.
    pub part: f64,
}

/// Transaction data from the swap endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneInchTx {
    /// Destination contract.
    pub to: String,
    /// Calldata.
    pub data: String,
    /// Native value in wei.
    pub value: String,
    /// Gas limit.
    pub gas: u64,
}

/// Response from the 1inch quote/swap endpoints.
///
/// The two endpoints share the amount fields; `tx` is present only on swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneInchResponse {
    /// Output amount in the destination token's base units.
    pub to_token_amount: String,
    /// Estimated gas for the swap.
    pub estimated_gas: Option<u64>,
    /// Nested routing description: route segments, hops, splits.
    pub protocols: Option<Vec<Vec<Vec<OneInchProtocol>>>>,
    /// Transaction data (swap endpoint only).
    pub tx: Option<OneInchTx>,
}

/// Configuration for the 1inch adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneInchConfig {
    venue_id: VenueId,
    api_key: Option<String>,
    chains: Vec<ChainId>,
    base_url: Option<String>,
    timeout_ms: u64,
    slippage_pm: u32,
    /// Wallet used as `fromAddress` on the swap endpoint.
    wallet_address: Option<String>,
    /// Gas price assumed when the venue reports none, in wei.
    assumed_gas_price_wei: u128,
    token_addresses: HashMap<String, String>,
}

impl OneInchConfig {
    /// Creates a new 1inch configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            venue_id: VenueId::new("1inch"),
            api_key: None,
            chains: vec![ChainId::ETHEREUM],
            base_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            slippage_pm: 5,
            wallet_address: None,
            assumed_gas_price_wei: 30_000_000_000,
            token_addresses: default_token_addresses(),
        }
    }

    /// Sets the venue ID.
    #[must_use]
    pub fn with_venue_id(mut self, venue_id: impl Into<String>) -> Self {
        self.venue_id = VenueId::new(venue_id);
        self
    }

    /// Sets the API key sent as a bearer token.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
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
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request timeout in milliseconds.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the slippage sent to the venue, in per-mille.
    #[must_use]
    pub fn with_slippage_pm(mut self, slippage_pm: u32) -> Self {
        self.slippage_pm = slippage_pm;
        self
    }

    /// Sets the wallet address enabling the swap endpoint.
    #[must_use]
    pub fn with_wallet_address(mut self, address: impl Into<String>) -> Self {
        self.wallet_address = Some(address.into());
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

    /// Returns the base URL for a chain.
    #[must_use]
    pub fn base_url(&self, chain: ChainId) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!("https://api.1inch.io/v5.0/{}", chain.get()),
        }
    }

    /// Resolves a token symbol to an address.
    #[must_use]
    pub fn resolve_token_address(&self, symbol: &str) -> Option<&String> {
        self.token_addresses.get(symbol)
    }
}

impl Default for OneInchConfig {
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

/// 1inch aggregation API adapter.
pub struct OneInchAdapter {
    config: OneInchConfig,
    http_client: HttpClient,
}

impl OneInchAdapter {
    /// Creates a new 1inch adapter.
    ///
    /// # Errors
    ///
    /// Returns `VenueError::Internal` if the API key is malformed or the
    /// HTTP client cannot be created.
    pub fn new(config: OneInchConfig) -> VenueResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
                VenueError::internal(config.venue_id.clone(), "invalid API key format")
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        let http_client = HttpClient::with_headers(&config.venue_id, config.timeout_ms, headers)?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &OneInchConfig {
        &self.config
    }

    fn resolve_tokens(&self, request: &SwapRequest) -> VenueResult<(String, String)> {
        let from = self
            .config
            .resolve_token_address(request.input().symbol())
            .ok_or_else(|| {
                VenueError::unsupported(
                    self.config.venue_id.clone(),
                    format!("unknown token {}", request.input().symbol()),
                )
            })?
            .clone();
        let to = self
            .config
            .resolve_token_address(request.output().symbol())
            .ok_or_else(|| {
                VenueError::unsupported(
                    self.config.venue_id.clone(),
                    format!("unknown token {}", request.output().symbol()),
                )
            })?
            .clone();
        Ok((from, to))
    }

    /// Flattens the protocols tree into parallel-split route hops.
    fn extract_route(&self, request: &SwapRequest, response: &OneInchResponse) -> Vec<RouteHop> {
        let amount_in = request.amount_in().get();
        let amount_out = response.to_token_amount.parse::<u128>().unwrap_or(0);

        let Some(protocols) = &response.protocols else {
            return Vec::new();
        };
        // Splits of the first route segment; deeper legs are venue-internal.
        let splits: Vec<&OneInchProtocol> = protocols
            .iter()
            .flat_map(|segment| segment.iter())
            .flat_map(|hops| hops.iter())
            .collect();

        splits
            .into_iter()
            .filter(|p| p.part > 0.0)
            .map(|p| {
                let fraction = p.part / 100.0;
                RouteHop {
                    venue: p.name.clone(),
                    input: request.input().clone(),
                    output: request.output().clone(),
                    amount_in: TokenAmount::new((amount_in as f64 * fraction) as u128),
                    amount_out: TokenAmount::new((amount_out as f64 * fraction) as u128),
                    fee_pm: 0,
                }
            })
            .collect()
    }

    /// Normalizes a 1inch response into a domain quote.
    ///
    /// # Errors
    ///
    /// Returns `VenueError::Upstream` if the output amount cannot be parsed.
    pub fn parse_response(
        &self,
        request: &SwapRequest,
        response: OneInchResponse,
    ) -> VenueResult<Quote> {
        let amount_out = response
            .to_token_amount
            .parse::<u128>()
            .map(TokenAmount::new)
            .map_err(|_| {
                VenueError::upstream(
                    self.config.venue_id.clone(),
                    None,
                    "invalid toTokenAmount in response",
                )
            })?;

        let gas = response.estimated_gas.unwrap_or(0);
        let cost =
            TokenAmount::new((gas as u128).saturating_mul(self.config.assumed_gas_price_wei));

        let mut builder =
            Quote::builder(self.config.venue_id.clone(), request.amount_in(), amount_out)
                .estimated_cost_native(cost)
                .route(self.extract_route(request, &response));

        builder = match &response.tx {
            Some(tx) => builder
                .confidence(SWAP_CONFIDENCE)
                .call_data(VenueCallData {
                    to: tx.to.clone(),
                    payload: tx.data.clone(),
                    value: TokenAmount::new(tx.value.parse::<u128>().unwrap_or(0)),
                    gas_limit: tx.gas,
                }),
            // Quote-only path approximates routing: no firm calldata.
            None => builder.confidence(QUOTE_ONLY_CONFIDENCE),
        };

        builder.build().map_err(|e| {
            VenueError::upstream(self.config.venue_id.clone(), None, e.to_string())
        })
    }
}

impl fmt::Debug for OneInchAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneInchAdapter")
            .field("venue_id", self.config.venue_id())
            .field("chains", &self.config.chains)
            .finish()
    }
}

#[async_trait]
impl QuoteAdapter for OneInchAdapter {
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

        let (from_token, to_token) = self.resolve_tokens(request)?;
        let base = self.config.base_url(request.input().chain());

        let mut params = vec![
            ("fromTokenAddress", from_token),
            ("toTokenAddress", to_token),
            ("amount", request.amount_in().to_string()),
        ];

        let url = match &self.config.wallet_address {
            Some(wallet) => {
                params.push(("fromAddress", wallet.clone()));
                params.push((
                    "slippage",
                    format!("{:.2}", self.config.slippage_pm as f64 / 10.0),
                ));
                format!("{base}/swap")
            }
            None => format!("{base}/quote"),
        };

        let response: OneInchResponse = self
            .http_client
            .get_json(&self.config.venue_id, &url, &params)
            .await?;

        self.parse_response(request, response)
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
            Token::new("DAI", ChainId::ETHEREUM, 18),
            TokenAmount::new(1_000_000_000_000_000_000),
            5,
            Duration::from_secs(3),
        )
        .unwrap()
    }

    fn quote_only_response() -> OneInchResponse {
        OneInchResponse {
            to_token_amount: "1845000000000000000000".to_string(),
            estimated_gas: Some(210_000),
            protocols: Some(vec![vec![vec![
                OneInchProtocol {
                    name: "UNISWAP_V3".to_string(),
                    part: 70.0,
                },
                OneInchProtocol {
                    name: "CURVE".to_string(),
                    part: 30.0,
                },
            ]]]),
            tx: None,
        }
    }

    #[test]
    fn quote_only_has_no_call_data_and_lower_confidence() {
        let adapter = OneInchAdapter::new(OneInchConfig::new()).unwrap();
        let quote = adapter
            .parse_response(&test_request(), quote_only_response())
            .unwrap();

        assert!(quote.call_data().is_none());
        assert!((quote.confidence() - QUOTE_ONLY_CONFIDENCE).abs() < f64::EPSILON);
        assert_eq!(quote.amount_out().get(), 1_845_000_000_000_000_000_000);
    }

    #[test]
    fn swap_response_carries_call_data() {
        let adapter = OneInchAdapter::new(OneInchConfig::new()).unwrap();
        let mut response = quote_only_response();
        response.tx = Some(OneInchTx {
            to: "0x1111111254eeb25477b68fb85ed929f73a960582".to_string(),
            data: "0x12345678".to_string(),
            value: "0".to_string(),
            gas: 250_000,
        });

        let quote = adapter.parse_response(&test_request(), response).unwrap();
        let call_data = quote.call_data().unwrap();
        assert_eq!(call_data.gas_limit, 250_000);
        assert!((quote.confidence() - SWAP_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[test]
    fn route_splits_by_part() {
        let adapter = OneInchAdapter::new(OneInchConfig::new()).unwrap();
        let quote = adapter
            .parse_response(&test_request(), quote_only_response())
            .unwrap();

        assert_eq!(quote.route().len(), 2);
        assert_eq!(quote.route()[0].venue, "UNISWAP_V3");
        assert_eq!(
            quote.route()[0].amount_in.get(),
            700_000_000_000_000_000
        );
    }

    #[test]
    fn cost_uses_assumed_gas_price() {
        let adapter = OneInchAdapter::new(OneInchConfig::new()).unwrap();
        let quote = adapter
            .parse_response(&test_request(), quote_only_response())
            .unwrap();

        assert_eq!(
            quote.estimated_cost_native().get(),
            210_000 * 30_000_000_000
        );
    }

    #[test]
    fn invalid_amount_is_upstream_error() {
        let adapter = OneInchAdapter::new(OneInchConfig::new()).unwrap();
        let mut response = quote_only_response();
        response.to_token_amount = "garbage".to_string();

        let err = adapter
            .parse_response(&test_request(), response)
            .unwrap_err();
        assert!(matches!(err, VenueError::Upstream { .. }));
    }

    #[tokio::test]
    async fn unsupported_chain_rejected_without_call() {
        let adapter = OneInchAdapter::new(OneInchConfig::new()).unwrap();
        let request = SwapRequest::new(
            Token::new("WETH", ChainId::ARBITRUM, 18),
            Token::new("DAI", ChainId::ARBITRUM, 18),
            TokenAmount::new(1),
            5,
            Duration::from_secs(3),
        )
        .unwrap();

        let err = adapter.quote(&request).await.unwrap_err();
        assert!(matches!(err, VenueError::Unsupported { .. }));
    }
}
