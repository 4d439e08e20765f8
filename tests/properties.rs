//! Property tests for quote invariants and net-output ranking.

use proptest::prelude::*;
use swap_router::application::services::fee_calculator::FeeCalculator;
use swap_router::domain::entities::quote::{Quote, RouteHop};
use swap_router::domain::value_objects::{ChainId, Token, TokenAmount, VenueId};
use swap_router::infrastructure::pricing::StaticPriceTable;

fn token(symbol: &str) -> Token {
    Token::new(symbol, ChainId::ETHEREUM, 18)
}

/// Builds a token-chained route where each hop's output feeds the next.
fn chained_route(amounts: &[u128]) -> Vec<RouteHop> {
    let symbols = ["WETH", "USDC", "DAI", "USDT", "WBTC"];
    amounts
        .windows(2)
        .enumerate()
        .map(|(i, pair)| RouteHop {
            venue: format!("pool-{i}"),
            input: token(symbols[i % symbols.len()]),
            output: token(symbols[(i + 1) % symbols.len()]),
            amount_in: TokenAmount::new(pair[0]),
            amount_out: TokenAmount::new(pair[1]),
            fee_pm: 3,
        })
        .collect()
}

proptest! {
    #[test]
    fn chained_routes_always_build(
        amounts in proptest::collection::vec(1u128..1_000_000_000, 2..5)
    ) {
        let route = chained_route(&amounts);
        let quote = Quote::builder(
            VenueId::new("venue"),
            TokenAmount::new(amounts[0]),
            TokenAmount::new(amounts[amounts.len() - 1]),
        )
        .route(route)
        .build();

        prop_assert!(quote.is_ok());
    }

    #[test]
    fn broken_links_always_rejected(
        amounts in proptest::collection::vec(10u128..1_000_000_000, 3..5),
        break_at in 0usize..3,
        delta in 1u128..5,
    ) {
        let mut route = chained_route(&amounts);
        let break_at = break_at % (route.len() - 1);
        // Desynchronize one link: the next hop no longer receives what the
        // previous one produced.
        let broken = route[break_at].amount_out.get() + delta;
        route[break_at + 1].amount_in = TokenAmount::new(broken + 1);
        route[break_at + 1].input = route[break_at].output.clone();

        let quote = Quote::builder(
            VenueId::new("venue"),
            TokenAmount::new(amounts[0]),
            TokenAmount::new(amounts[amounts.len() - 1]),
        )
        .route(route)
        .build();

        prop_assert!(quote.is_err());
    }

    #[test]
    fn net_output_monotonic_in_gross_output(
        out_low in 0u128..1_000_000_000_000,
        bump in 1u128..1_000_000_000,
        fee_pm in 0u32..1_000,
        cost in 0u128..1_000_000_000_000_000_000,
    ) {
        let calculator = FeeCalculator::new(fee_pm);
        let prices = StaticPriceTable::new();
        prices.set("ETH", "USDC", rust_decimal::Decimal::from(2_000));
        let usdc = Token::new("USDC", ChainId::ETHEREUM, 6);

        let quote_for = |out: u128| {
            Quote::builder(
                VenueId::new("venue"),
                TokenAmount::new(1_000),
                TokenAmount::new(out),
            )
            .estimated_cost_native(TokenAmount::new(cost))
            .build()
            .expect("valid quote")
        };

        let low = calculator.net_output(&quote_for(out_low), &usdc, &prices);
        let high = calculator.net_output(&quote_for(out_low + bump), &usdc, &prices);

        // Same fee and cost: more gross output never ranks worse.
        prop_assert!(high.net >= low.net);
    }

    #[test]
    fn platform_fee_never_increases_net(
        out in 0u128..1_000_000_000_000,
        fee_pm in 0u32..1_000,
    ) {
        let prices = StaticPriceTable::new();
        let usdc = Token::new("USDC", ChainId::ETHEREUM, 6);
        let quote = Quote::builder(
            VenueId::new("venue"),
            TokenAmount::new(1_000),
            TokenAmount::new(out),
        )
        .build()
        .expect("valid quote");

        let with_fee = FeeCalculator::new(fee_pm).net_output(&quote, &usdc, &prices);
        let without_fee = FeeCalculator::new(0).net_output(&quote, &usdc, &prices);

        prop_assert!(with_fee.net <= without_fee.net);
    }

    #[test]
    fn per_mille_fraction_never_exceeds_whole(
        amount in 0u128..u128::MAX / 1_000,
        pm in 0u32..=1_000,
    ) {
        let fraction = TokenAmount::new(amount).mul_per_mille(pm);
        prop_assert!(fraction.get() <= amount);
    }
}
