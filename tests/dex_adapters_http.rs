//! Venue adapter behavior against a stub HTTP server.

use serde_json::json;
use std::time::Duration;
use swap_router::domain::entities::SwapRequest;
use swap_router::domain::value_objects::{ChainId, Token, TokenAmount};
use swap_router::infrastructure::venues::dex::{
    OneInchAdapter, OneInchConfig, ParaSwapAdapter, ParaSwapConfig, ZeroXAdapter, ZeroXConfig,
};
use swap_router::infrastructure::venues::error::VenueError;
use swap_router::infrastructure::venues::traits::QuoteAdapter;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn weth_usdc_request() -> SwapRequest {
    SwapRequest::new(
        Token::new("WETH", ChainId::ETHEREUM, 18),
        Token::new("USDC", ChainId::ETHEREUM, 6),
        TokenAmount::new(1_000_000_000_000_000_000),
        10,
        Duration::from_secs(3),
    )
    .expect("valid request")
}

fn zero_x_body() -> serde_json::Value {
    json!({
        "estimatedPriceImpact": "0.3",
        "to": "0xdef1c0ded9bec7f1a1670819833240f027b25eff",
        "data": "0xd9627aa40000",
        "value": "0",
        "gas": "180000",
        "estimatedGas": "165000",
        "gasPrice": "25000000000",
        "buyAmount": "1850500000",
        "sellAmount": "1000000000000000000",
        "sources": [
            { "name": "Uniswap_V3", "proportion": "1" }
        ]
    })
}

#[tokio::test]
async fn zero_x_happy_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/swap/v1/quote"))
        .and(query_param("sellAmount", "1000000000000000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zero_x_body()))
        .mount(&server)
        .await;

    let adapter = ZeroXAdapter::new(
        ZeroXConfig::new("test-key").with_base_url(server.uri()),
    )
    .expect("adapter");

    let quote = adapter.quote(&weth_usdc_request()).await.expect("quote");
    assert_eq!(quote.amount_out().get(), 1_850_500_000);
    assert_eq!(quote.price_impact_pm(), 3);
    assert_eq!(quote.route().len(), 1);
    let call_data = quote.call_data().expect("firm call data");
    assert!(call_data.to.starts_with("0xdef1"));
}

#[tokio::test]
async fn zero_x_server_error_is_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/swap/v1/quote"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let adapter = ZeroXAdapter::new(
        ZeroXConfig::new("test-key").with_base_url(server.uri()),
    )
    .expect("adapter");

    let err = adapter.quote(&weth_usdc_request()).await.unwrap_err();
    assert!(matches!(
        err,
        VenueError::Upstream {
            status: Some(500),
            ..
        }
    ));
}

#[tokio::test]
async fn zero_x_429_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/swap/v1/quote"))
        .respond_with(
            ResponseTemplate::new(429).insert_header("retry-after", "2"),
        )
        .mount(&server)
        .await;

    let adapter = ZeroXAdapter::new(
        ZeroXConfig::new("test-key").with_base_url(server.uri()),
    )
    .expect("adapter");

    let err = adapter.quote(&weth_usdc_request()).await.unwrap_err();
    assert!(matches!(
        err,
        VenueError::RateLimited {
            retry_after_ms: Some(2_000),
            ..
        }
    ));
}

#[tokio::test]
async fn zero_x_slow_upstream_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/swap/v1/quote"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(zero_x_body())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let adapter = ZeroXAdapter::new(
        ZeroXConfig::new("test-key")
            .with_base_url(server.uri())
            .with_timeout_ms(100),
    )
    .expect("adapter");

    let err = adapter.quote(&weth_usdc_request()).await.unwrap_err();
    assert!(matches!(err, VenueError::Timeout { .. }));
}

#[tokio::test]
async fn zero_x_garbage_payload_is_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/swap/v1/quote"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let adapter = ZeroXAdapter::new(
        ZeroXConfig::new("test-key").with_base_url(server.uri()),
    )
    .expect("adapter");

    let err = adapter.quote(&weth_usdc_request()).await.unwrap_err();
    assert!(matches!(err, VenueError::Upstream { .. }));
}

#[tokio::test]
async fn one_inch_quote_endpoint_without_wallet() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "toTokenAmount": "1849000000",
            "estimatedGas": 210000,
            "protocols": [[[
                { "name": "UNISWAP_V3", "part": 100.0 }
            ]]]
        })))
        .mount(&server)
        .await;

    let adapter = OneInchAdapter::new(
        OneInchConfig::new().with_base_url(server.uri()),
    )
    .expect("adapter");

    let quote = adapter.quote(&weth_usdc_request()).await.expect("quote");
    assert_eq!(quote.amount_out().get(), 1_849_000_000);
    assert!(quote.call_data().is_none());
    assert_eq!(quote.route().len(), 1);
}

#[tokio::test]
async fn one_inch_swap_endpoint_with_wallet() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/swap"))
        .and(query_param(
            "fromAddress",
            "0x1111111111111111111111111111111111111111",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "toTokenAmount": "1849000000",
            "estimatedGas": 210000,
            "protocols": [[[
                { "name": "UNISWAP_V3", "part": 100.0 }
            ]]],
            "tx": {
                "to": "0x1111111254eeb25477b68fb85ed929f73a960582",
                "data": "0x12345678",
                "value": "0",
                "gas": 250000
            }
        })))
        .mount(&server)
        .await;

    let adapter = OneInchAdapter::new(
        OneInchConfig::new()
            .with_base_url(server.uri())
            .with_wallet_address("0x1111111111111111111111111111111111111111"),
    )
    .expect("adapter");

    let quote = adapter.quote(&weth_usdc_request()).await.expect("quote");
    let call_data = quote.call_data().expect("firm call data");
    assert_eq!(call_data.gas_limit, 250_000);
}

#[tokio::test]
async fn paraswap_prices_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prices"))
        .and(query_param("side", "SELL"))
        .and(query_param("network", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "priceRoute": {
                "srcAmount": "1000000000000000000",
                "destAmount": "1848000000",
                "srcUSD": "1850.00",
                "destUSD": "1848.00",
                "gasCost": "4200000000000000",
                "bestRoute": [{
                    "percent": 100.0,
                    "swaps": [{
                        "swapExchanges": [{
                            "exchange": "UniswapV3",
                            "percent": 100.0,
                            "srcAmount": "1000000000000000000",
                            "destAmount": "1848000000"
                        }]
                    }]
                }]
            }
        })))
        .mount(&server)
        .await;

    let adapter = ParaSwapAdapter::new(
        ParaSwapConfig::new().with_base_url(server.uri()),
    )
    .expect("adapter");

    let quote = adapter.quote(&weth_usdc_request()).await.expect("quote");
    assert_eq!(quote.amount_out().get(), 1_848_000_000);
    assert_eq!(quote.price_impact_pm(), 1);
    assert_eq!(quote.route().len(), 1);
    assert!(quote.call_data().is_none());
}

#[tokio::test]
async fn paraswap_builds_transaction_when_wallet_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "priceRoute": {
                "srcAmount": "1000000000000000000",
                "destAmount": "1848000000",
                "gasCost": "4200000000000000"
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/transactions/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "to": "0xdef171fe48cf0115b1d80b88dc8eab59176fee57",
            "data": "0xfeedface",
            "value": "0",
            "gas": "400000"
        })))
        .mount(&server)
        .await;

    let adapter = ParaSwapAdapter::new(
        ParaSwapConfig::new()
            .with_base_url(server.uri())
            .with_user_address("0x2222222222222222222222222222222222222222"),
    )
    .expect("adapter");

    let quote = adapter.quote(&weth_usdc_request()).await.expect("quote");
    let call_data = quote.call_data().expect("firm call data");
    assert_eq!(call_data.gas_limit, 400_000);
    assert!(call_data.to.starts_with("0xdef171"));
}
