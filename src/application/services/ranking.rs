//! # Quote Ranking
//!
//! Net-output ranking of collected quotes.
//!
//! Quotes sort descending by net output; ties break on higher confidence,
//! then lower estimated execution cost. Ranking is a pure, single-threaded
//! pass after collection.

use crate::application::services::fee_calculator::{FeeCalculator, NetOutput};
use crate::domain::entities::Quote;
use crate::domain::value_objects::Token;
use crate::infrastructure::pricing::PriceReference;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A quote with its ranking information.
#[derive(Debug, Clone, Serialize)]
pub struct RankedQuote {
    /// The quote being ranked.
    pub quote: Quote,
    /// The net-output figure used for ranking.
    pub net: NetOutput,
    /// The rank (1 = best).
    pub rank: usize,
}

impl RankedQuote {
    /// Returns true if this quote is the best (rank 1).
    #[must_use]
    pub fn is_best(&self) -> bool {
        self.rank == 1
    }
}

impl fmt::Display for RankedQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RankedQuote(#{} net={} quote={})",
            self.rank, self.net.net, self.quote
        )
    }
}

/// Ranks quotes by net output, descending.
///
/// Ties break by higher confidence, then by lower estimated execution cost.
#[must_use]
pub fn rank_quotes(
    quotes: Vec<Quote>,
    output_token: &Token,
    calculator: &FeeCalculator,
    prices: &dyn PriceReference,
) -> Vec<RankedQuote> {
    let mut scored: Vec<(Quote, NetOutput)> = quotes
        .into_iter()
        .map(|q| {
            let net = calculator.net_output(&q, output_token, prices);
            (q, net)
        })
        .collect();

    scored.sort_by(|(qa, na), (qb, nb)| {
        nb.net
            .cmp(&na.net)
            .then_with(|| {
                qb.confidence()
                    .partial_cmp(&qa.confidence())
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| qa.estimated_cost_native().cmp(&qb.estimated_cost_native()))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(index, (quote, net))| RankedQuote {
            quote,
            net,
            rank: index + 1,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ChainId, TokenAmount, VenueId};
    use crate::infrastructure::pricing::StaticPriceTable;
    use rust_decimal::Decimal;

    fn usdc() -> Token {
        Token::new("USDC", ChainId::ETHEREUM, 6)
    }

    fn quote(venue: &str, amount_out: u128, confidence: f64, cost_native: u128) -> Quote {
        Quote::builder(
            VenueId::new(venue),
            TokenAmount::new(1_000),
            TokenAmount::new(amount_out),
        )
        .confidence(confidence)
        .estimated_cost_native(TokenAmount::new(cost_native))
        .build()
        .unwrap()
    }

    fn rank(quotes: Vec<Quote>) -> Vec<RankedQuote> {
        let calculator = FeeCalculator::new(0);
        let prices = StaticPriceTable::new();
        rank_quotes(quotes, &usdc(), &calculator, &prices)
    }

    #[test]
    fn sorts_by_net_output_descending() {
        let ranked = rank(vec![
            quote("a", 95, 0.9, 0),
            quote("b", 100, 0.9, 0),
            quote("c", 90, 0.9, 0),
        ]);

        let outputs: Vec<u128> = ranked.iter().map(|r| r.quote.amount_out().get()).collect();
        assert_eq!(outputs, vec![100, 95, 90]);
        assert!(ranked[0].is_best());
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn tie_breaks_on_confidence() {
        let ranked = rank(vec![
            quote("low-conf", 100, 0.7, 0),
            quote("high-conf", 100, 0.95, 0),
        ]);

        assert_eq!(ranked[0].quote.venue_id().as_str(), "high-conf");
    }

    #[test]
    fn tie_breaks_on_cost_after_confidence() {
        let ranked = rank(vec![
            quote("expensive", 100, 0.9, 500),
            quote("cheap", 100, 0.9, 100),
        ]);

        assert_eq!(ranked[0].quote.venue_id().as_str(), "cheap");
    }

    #[test]
    fn empty_input_empty_output() {
        assert!(rank(vec![]).is_empty());
    }

    #[test]
    fn cost_adjustment_changes_order() {
        let calculator = FeeCalculator::new(0);
        let prices = StaticPriceTable::new();
        prices.set("ETH", "USDC", Decimal::from(2_000));

        // "gross-winner" quotes 2 USDC more but burns 0.005 ETH (= 10 USDC)
        // more in gas; net it loses.
        let ranked = rank_quotes(
            vec![
                quote("gross-winner", 1_002_000_000, 0.9, 6_000_000_000_000_000),
                quote("net-winner", 1_000_000_000, 0.9, 1_000_000_000_000_000),
            ],
            &usdc(),
            &calculator,
            &prices,
        );

        assert_eq!(ranked[0].quote.venue_id().as_str(), "net-winner");
    }
}
