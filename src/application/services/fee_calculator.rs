//! # Fee & Net-Output Calculator
//!
//! Pure computation of a quote's comparable net output:
//!
//! ```text
//! net = amount_out x (1 - platform_fee) - execution_cost_in_output_terms
//! ```
//!
//! Execution cost is converted from native gas-token units into output-token
//! terms through the price reference. When the reference lacks the pair, the
//! result falls back to the fee-adjusted raw output and is flagged
//! cost-unadjusted so callers can weight it accordingly.
//!
//! Deterministic, no side effects, no network.

use crate::domain::entities::Quote;
use crate::domain::value_objects::Token;
use crate::infrastructure::pricing::PriceReference;
use rust_decimal::Decimal;
use serde::Serialize;

/// A quote's net output in output-token base units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetOutput {
    /// Fee- and cost-adjusted output, in output-token base units. May go
    /// negative when execution cost exceeds the output.
    pub net: Decimal,
    /// Execution cost converted into output-token base units (zero when
    /// unadjusted).
    pub cost_in_output: Decimal,
    /// False when no price reference was available and the cost could not be
    /// deducted.
    pub cost_adjusted: bool,
}

/// Pure fee and net-output calculator.
///
/// # Examples
///
/// ```
/// use swap_router::application::services::fee_calculator::FeeCalculator;
///
/// let calculator = FeeCalculator::new(3); // 0.3% platform fee
/// assert_eq!(calculator.platform_fee_pm(), 3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FeeCalculator {
    platform_fee_pm: u32,
}

impl FeeCalculator {
    /// Creates a calculator with the platform fee in per-mille.
    #[must_use]
    pub const fn new(platform_fee_pm: u32) -> Self {
        Self { platform_fee_pm }
    }

    /// Returns the platform fee in per-mille.
    #[inline]
    #[must_use]
    pub const fn platform_fee_pm(&self) -> u32 {
        self.platform_fee_pm
    }

    /// Computes the comparable net output of a quote.
    ///
    /// `output_token` is the token the caller receives; its chain determines
    /// the native gas token whose price converts the execution cost.
    #[must_use]
    pub fn net_output(
        &self,
        quote: &Quote,
        output_token: &Token,
        prices: &dyn PriceReference,
    ) -> NetOutput {
        let gross = quote.amount_out().to_decimal();
        let fee_keep = Decimal::from(1_000u32.saturating_sub(self.platform_fee_pm));
        let after_fee = gross * fee_keep / Decimal::ONE_THOUSAND;

        if quote.estimated_cost_native().is_zero() {
            return NetOutput {
                net: after_fee,
                cost_in_output: Decimal::ZERO,
                cost_adjusted: true,
            };
        }

        let chain = output_token.chain();
        match prices.price(chain.native_symbol(), output_token.symbol()) {
            Some(price) => {
                let cost_native_units = quote
                    .estimated_cost_native()
                    .to_units(chain.native_decimals());
                let cost_output_units = cost_native_units * price;
                let scale = Decimal::from(
                    10u64
                        .checked_pow(u32::from(output_token.decimals()))
                        .unwrap_or(u64::MAX),
                );
                let cost_in_output = cost_output_units * scale;
                NetOutput {
                    net: after_fee - cost_in_output,
                    cost_in_output,
                    cost_adjusted: true,
                }
            }
            None => NetOutput {
                net: after_fee,
                cost_in_output: Decimal::ZERO,
                cost_adjusted: false,
            },
        }
    }
}
