//! # 0x Protocol Adapter
//!
//! [`QuoteAdapter`] implementation for the 0x DEX aggregator.
//!
//! # Features
//!
//! - HTTP client for the 0x API (api.0x.org and per-chain subdomains)
//! - Quote endpoint integration (/swap/v1/quote)
//! - Multi-chain support (Ethereum, Polygon, Arbitrum, Optimism, Base)
//! - Gas cost estimation from `estimatedGas` x `gasPrice`
//! - Route hop extraction from the `sources` split
//! - Firm call data (`to`/`data`/`value`/`gas`) attached to every quote

use crate::domain::entities::quote::{Quote, RouteHop, VenueCallData};
use crate::domain::entities::SwapRequest;
use crate::domain::value_objects::{ChainId, TokenAmount, VenueId};
use crate::infrastructure::venues::error::{VenueError, VenueResult};
use crate::infrastructure::venues::http_client::HttpClient;
use crate::infrastructure::venues::traits::QuoteAdapter;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Default timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Default confidence for firm 0x quotes.
const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Returns the API subdomain serving a chain, if 0x covers it.
fn api_subdomain(chain: ChainId) -> Option<&'static str> {
    match chain.get() {
        1 => Some("api"),
        10 => Some("optimism"),
        137 => Some("polygon"),
        8453 => Some("base"),
        42161 => Some("arbitrum"),
        _ => None,
    }
}

/// Source of liquidity in a 0x quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroXSource {
    /// Name of the liquidity source (e.g. `"Uniswap_V3"`).
    pub name: String,
    /// Proportion of the trade routed through this source (`"0"` to `"1"`).
    pub proportion: String,
}

/// Response from the 0x quote endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeroXQuoteResponse {
    /// Estimated price impact as a percentage string.
    pub estimated_price_impact: Option<String>,
    /// Contract address to send the transaction to.
    pub to: String,
    /// Calldata for the transaction.
    pub data: String,
    /// Native value to send with the transaction.
    pub value: String,
    /// Gas limit.
    pub gas: Option<String>,
    /// Estimated gas.
    pub estimated_gas: Option<String>,
    /// Gas price in wei.
    pub gas_price: Option<String>,
    /// Amount of buy token received.
    pub buy_amount: String,
    /// Amount of sell token sent.
    pub sell_amount: String,
    /// Liquidity sources used.
    pub sources: Option<Vec<ZeroXSource>>,
}

/// Configuration for the 0x adapter.
///
/// # Examples
///
/// ```
/// use swap_router::infrastructure::venues::dex::zero_x::ZeroXConfig;
/// use swap_router::domain::value_objects::ChainId;
///
/// let config = ZeroXConfig::new("my-api-key")
///     .with_chains(vec![ChainId::ETHEREUM, ChainId::POLYGON])
///     .with_timeout_ms(3000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZeroXConfig {
    venue_id: VenueId,
    api_key: String,
    chains: Vec<ChainId>,
    base_url: Option<String>,
    timeout_ms: u64,
    slippage_pm: u32,
    confidence: f64,
    taker_address: Option<String>,
    token_addresses: HashMap<String, String>,
}

impl ZeroXConfig {
    /// Creates a new 0x configuration.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            venue_id: VenueId::new("0x-aggregator"),
            api_key: api_key.into(),
            chains: vec![ChainId::ETHEREUM],
            base_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            slippage_pm: 5,
            confidence: DEFAULT_CONFIDENCE,
            taker_address: None,
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

    /// Sets a base URL override, bypassing the per-chain subdomain.
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

    /// Sets the taker address included in quote requests.
    #[must_use]
    pub fn with_taker_address(mut self, address: impl Into<String>) -> Self {
        self.taker_address = Some(address.into());
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

    /// Returns the request timeout in milliseconds.
    #[inline]
    #[must_use]
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Returns the base URL for a chain.
    #[must_use]
    pub fn base_url(&self, chain: ChainId) -> Option<String> {
        if let Some(url) = &self.base_url {
            return Some(url.clone());
        }
        api_subdomain(chain).map(|sub| format!("https://{sub}.0x.org"))
    }

    /// Resolves a token symbol to an address.
    #[must_use]
    pub fn resolve_token_address(&self, symbol: &str) -> Option<&String> {
        self.token_addresses.get(symbol)
    }
}

/// Common mainnet token addresses, overridable per deployment.
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
    map.insert(
        "WBTC".to_string(),
        "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599".to_string(),
    );
    map
}

/// 0x Protocol DEX aggregator adapter.
pub struct ZeroXAdapter {
    config: ZeroXConfig,
    http_client: HttpClient,
}

impl ZeroXAdapter {
    /// Creates a new 0x adapter.
    ///
    /// # Errors
    ///
    /// Returns `VenueError::Internal` if the API key is malformed or the
    /// HTTP client cannot be created.
    pub fn new(config: ZeroXConfig) -> VenueResult<Self> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| VenueError::internal(config.venue_id.clone(), "invalid API key format"))?;
        headers.insert("0x-api-key", api_key);
        let http_client = HttpClient::with_headers(&config.venue_id, config.timeout_ms, headers)?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ZeroXConfig {
        &self.config
    }

    fn quote_url(&self, chain: ChainId) -> VenueResult<String> {
        self.config
            .base_url(chain)
            .map(|base| format!("{base}/swap/v1/quote"))
            .ok_or_else(|| {
                VenueError::unsupported(
                    self.config.venue_id.clone(),
                    format!("chain {chain} not served"),
                )
            })
    }

    fn resolve_tokens(&self, request: &SwapRequest) -> VenueResult<(String, String)> {
        let sell = self
            .config
            .resolve_token_address(request.input().symbol())
            .ok_or_else(|| {
                VenueError::unsupported(
                    self.config.venue_id.clone(),
                    format!("unknown token {}", request.input().symbol()),
                )
            })?
            .clone();
        let buy = self
            .config
            .resolve_token_address(request.output().symbol())
            .ok_or_else(|| {
                VenueError::unsupported(
                    self.config.venue_id.clone(),
                    format!("unknown token {}", request.output().symbol()),
                )
            })?
            .clone();
        Ok((sell, buy))
    }

    fn parse_amount(&self, value: &str, field: &str) -> VenueResult<TokenAmount> {
        value.parse::<u128>().map(TokenAmount::new).map_err(|_| {
            VenueError::upstream(
                self.config.venue_id.clone(),
                None,
                format!("invalid {field} in response"),
            )
        })
    }

    /// Converts 0x's percentage price impact into per-mille.
    fn parse_price_impact(&self, response: &ZeroXQuoteResponse) -> u32 {
        response
            .estimated_price_impact
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .map(|pct| (pct * 10.0).round().max(0.0) as u32)
            .unwrap_or(0)
    }

    /// Estimates the execution cost in wei from the response gas figures.
    fn estimate_cost(&self, response: &ZeroXQuoteResponse) -> TokenAmount {
        let gas = response
            .estimated_gas
            .as_deref()
            .and_then(|g| g.parse::<u128>().ok());
        let gas_price = response
            .gas_price
            .as_deref()
            .and_then(|p| p.parse::<u128>().ok());
        match (gas, gas_price) {
            (Some(g), Some(p)) => TokenAmount::new(g.saturating_mul(p)),
            _ => TokenAmount::ZERO,
        }
    }

    /// Splits the order across the reported liquidity sources.
    fn extract_route(&self, request: &SwapRequest, response: &ZeroXQuoteResponse) -> Vec<RouteHop> {
        let amount_in = request.amount_in().get();
        let amount_out = self
            .parse_amount(&response.buy_amount, "buyAmount")
            .map(TokenAmount::get)
            .unwrap_or(0);

        response
            .sources
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|source| {
                let proportion = source.proportion.parse::<f64>().ok()?;
                if proportion <= 0.0 {
                    return None;
                }
                Some(RouteHop {
                    venue: source.name.clone(),
                    input: request.input().clone(),
                    output: request.output().clone(),
                    amount_in: TokenAmount::new((amount_in as f64 * proportion) as u128),
                    amount_out: TokenAmount::new((amount_out as f64 * proportion) as u128),
                    fee_pm: 0,
                })
            })
            .collect()
    }

    /// Normalizes a 0x response into a domain quote.
    ///
    /// # Errors
    ///
    /// Returns `VenueError::Upstream` if mandatory amounts cannot be parsed.
    pub fn parse_quote_response(
        &self,
        request: &SwapRequest,
        response: ZeroXQuoteResponse,
    ) -> VenueResult<Quote> {
        let amount_out = self.parse_amount(&response.buy_amount, "buyAmount")?;
        let value = self.parse_amount(&response.value, "value").unwrap_or(TokenAmount::ZERO);
        let gas_limit = response
            .gas
            .as_deref()
            .or(response.estimated_gas.as_deref())
            .and_then(|g| g.parse::<u64>().ok())
            .unwrap_or(0);

        let call_data = VenueCallData {
            to: response.to.clone(),
            payload: response.data.clone(),
            value,
            gas_limit,
        };

        Quote::builder(self.config.venue_id.clone(), request.amount_in(), amount_out)
            .price_impact_pm(self.parse_price_impact(&response))
            .estimated_cost_native(self.estimate_cost(&response))
            .route(self.extract_route(request, &response))
            .confidence(self.config.confidence)
            .call_data(call_data)
            .build()
            .map_err(|e| {
                VenueError::upstream(self.config.venue_id.clone(), None, e.to_string())
            })
    }
}

impl fmt::Debug for ZeroXAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZeroXAdapter")
            .field("venue_id", self.config.venue_id())
            .field("chains", &self.config.chains)
            .finish()
    }
}

#[async_trait]
impl QuoteAdapter for ZeroXAdapter {
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

        let (sell_token, buy_token) = self.resolve_tokens(request)?;
        let url = self.quote_url(request.input().chain())?;

        let mut params = vec![
            ("sellToken", sell_token),
            ("buyToken", buy_token),
            ("sellAmount", request.amount_in().to_string()),
            (
                "slippagePercentage",
                format!("{:.4}", self.config.slippage_pm as f64 / 1_000.0),
            ),
        ];
        if let Some(taker) = &self.config.taker_address {
            params.push(("takerAddress", taker.clone()));
        }

        let response: ZeroXQuoteResponse = self
            .http_client
            .get_json(&self.config.venue_id, &url, &params)
            .await?;

        self.parse_quote_response(request, response)
    }
}
