//! Side-effect free pricing against a curve snapshot.
//!
//! The curve is a constant product `k = (quote_balance + virtual_liquidity) *
//! coin_balance`, fee-less. Outputs are always rounded down so every
//! rounding error stays in the pool.

use crate::entities::CurveState;
use crate::enums::TradeDirection;
use crate::error::CurveError;
use crate::math::constant_product::{calculate_in_amount, calculate_out_amount};
use crate::math::fixed_point::{add, ratio_deviation_bps, sub, to_u64};
use serde::{Deserialize, Serialize};

/// Result of pricing a trade. Carries the reserves the curve would hold if
/// the trade were applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub direction: TradeDirection,
    /// Quote units for a buy, coin units for a sell.
    pub amount_in: u64,
    /// Coin units for a buy, quote units for a sell.
    pub amount_out: u64,
    /// Distance between execution price and pre-trade spot price.
    /// Informational only.
    pub price_impact_bps: u64,
    pub coin_balance_after: u64,
    pub quote_balance_after: u64,
    pub effective_quote_after: u128,
}

/// Pure pricing functions over [`CurveState`].
pub struct QuoteEngine;

impl QuoteEngine {
    /// Prices a trade of `amount_in` in `direction`.
    ///
    /// # Errors
    /// - [`CurveError::PoolMigrated`] if the curve has migrated.
    /// - [`CurveError::ZeroAmount`] if `amount_in` is zero.
    /// - [`CurveError::ZeroOutput`] if the output rounds down to zero.
    /// - [`CurveError::InsufficientLiquidity`] if a buy would drain the coin
    ///   reserve or a sell would pay out at least the whole real quote reserve.
    /// - [`CurveError::ExceedsCirculatingSupply`] if a sell offers more coins
    ///   than exist outside the pool.
    /// - [`CurveError::ExceedsReserveCapacity`] if a buy would overflow the
    ///   quote reserve.
    pub fn quote(
        state: &CurveState,
        direction: TradeDirection,
        amount_in: u64,
    ) -> Result<Quote, CurveError> {
        if state.is_migrated() {
            return Err(CurveError::PoolMigrated);
        }
        if amount_in == 0 {
            return Err(CurveError::ZeroAmount);
        }
        match direction {
            TradeDirection::Buy => Self::quote_buy(state, amount_in),
            TradeDirection::Sell => Self::quote_sell(state, amount_in),
        }
    }

    /// Prices the cheapest buy that returns at least `coin_out` coins.
    ///
    /// The returned quote's `amount_in` is the maximum a client needs to
    /// offer; its `amount_out` may exceed `coin_out` by rounding.
    ///
    /// # Errors
    /// Same as [`QuoteEngine::quote`]; [`CurveError::InsufficientLiquidity`]
    /// when `coin_out` is not below the coin reserve.
    pub fn quote_buy_exact_out(state: &CurveState, coin_out: u64) -> Result<Quote, CurveError> {
        if state.is_migrated() {
            return Err(CurveError::PoolMigrated);
        }
        if coin_out == 0 {
            return Err(CurveError::ZeroAmount);
        }
        let quote_in = calculate_in_amount(
            coin_out as u128,
            state.effective_quote_reserve(),
            state.coin_balance as u128,
        )?;
        check_capacity(state, quote_in)?;
        let quote = Self::quote_buy(state, to_u64(quote_in, "exact-out quote input")?)?;
        if quote.amount_out < coin_out {
            return Err(CurveError::InvariantViolation(format!(
                "exact-out buy of {} yields only {}",
                coin_out, quote.amount_out
            )));
        }
        Ok(quote)
    }

    fn quote_buy(state: &CurveState, quote_in: u64) -> Result<Quote, CurveError> {
        check_capacity(state, quote_in as u128)?;
        let effective_quote = state.effective_quote_reserve();
        let coin_balance = state.coin_balance as u128;

        let coin_out = calculate_out_amount(quote_in as u128, effective_quote, coin_balance)?;
        if coin_out >= coin_balance {
            return Err(CurveError::InsufficientLiquidity {
                requested: coin_out,
                available: coin_balance,
            });
        }
        if coin_out == 0 {
            return Err(CurveError::ZeroOutput);
        }

        let quote_balance_after = to_u64(
            add(state.quote_balance as u128, quote_in as u128, "quote balance")?,
            "quote balance",
        )?;
        let coin_balance_after =
            to_u64(sub(coin_balance, coin_out, "coin balance")?, "coin balance")?;
        let price_impact_bps =
            ratio_deviation_bps(quote_in as u128, coin_out, effective_quote, coin_balance)?;

        Ok(Quote {
            direction: TradeDirection::Buy,
            amount_in: quote_in,
            amount_out: to_u64(coin_out, "coin out")?,
            price_impact_bps,
            coin_balance_after,
            quote_balance_after,
            effective_quote_after: add(effective_quote, quote_in as u128, "effective quote")?,
        })
    }

    fn quote_sell(state: &CurveState, coin_in: u64) -> Result<Quote, CurveError> {
        let circulating = state.circulating_supply();
        if coin_in > circulating {
            return Err(CurveError::ExceedsCirculatingSupply {
                amount: coin_in,
                circulating,
            });
        }

        let effective_quote = state.effective_quote_reserve();
        let coin_balance = state.coin_balance as u128;

        let quote_out = calculate_out_amount(coin_in as u128, coin_balance, effective_quote)?;
        if quote_out == 0 {
            return Err(CurveError::ZeroOutput);
        }
        // Only the real reserve is payable; virtual liquidity never leaves.
        if quote_out >= state.quote_balance as u128 {
            return Err(CurveError::InsufficientLiquidity {
                requested: quote_out,
                available: state.quote_balance as u128,
            });
        }

        let coin_balance_after = to_u64(
            add(coin_balance, coin_in as u128, "coin balance")?,
            "coin balance",
        )?;
        let quote_balance_after = to_u64(
            sub(state.quote_balance as u128, quote_out, "quote balance")?,
            "quote balance",
        )?;
        let price_impact_bps =
            ratio_deviation_bps(quote_out, coin_in as u128, effective_quote, coin_balance)?;

        Ok(Quote {
            direction: TradeDirection::Sell,
            amount_in: coin_in,
            amount_out: to_u64(quote_out, "quote out")?,
            price_impact_bps,
            coin_balance_after,
            quote_balance_after,
            effective_quote_after: sub(effective_quote, quote_out, "effective quote")?,
        })
    }
}

fn check_capacity(state: &CurveState, quote_in: u128) -> Result<(), CurveError> {
    let headroom = u64::MAX - state.quote_balance;
    if quote_in > headroom as u128 {
        return Err(CurveError::ExceedsReserveCapacity {
            amount: quote_in,
            headroom,
        });
    }
    Ok(())
}

/// Applies an accepted quote to the ledger.
///
/// # Errors
/// Propagates [`CurveState::apply_buy`]/[`CurveState::apply_sell`] errors and
/// reports an [`CurveError::InvariantViolation`] if the resulting reserves
/// differ from the ones the quote predicted.
pub fn apply_quote(state: &mut CurveState, quote: &Quote) -> Result<(), CurveError> {
    let mut next = *state;
    match quote.direction {
        TradeDirection::Buy => next.apply_buy(quote.amount_in, quote.amount_out)?,
        TradeDirection::Sell => next.apply_sell(quote.amount_in, quote.amount_out)?,
    }
    next.check_invariants()?;
    if next.coin_balance != quote.coin_balance_after
        || next.quote_balance != quote.quote_balance_after
    {
        return Err(CurveError::InvariantViolation(format!(
            "ledger ({}, {}) diverged from quote ({}, {})",
            next.coin_balance,
            next.quote_balance,
            quote.coin_balance_after,
            quote.quote_balance_after
        )));
    }
    *state = next;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constant_product::calculate_k;
    use crate::params::LaunchParams;

    fn scenario_a() -> CurveState {
        CurveState::launch(
            &LaunchParams::default()
                .with_virtual_liquidity(500_000_000_000)
                .with_total_supply(1_000_000_000_000_000_000)
                .with_target(5_000_000_000_000),
        )
    }

    #[test]
    fn test_scenario_a_buy() {
        let state = scenario_a();
        let q = QuoteEngine::quote(&state, TradeDirection::Buy, 1_000_000_000_000).unwrap();
        // coin_out = floor(1e18 * 1e12 / 1.5e12) = 666_666_666_666_666_666
        assert_eq!(q.amount_out, 666_666_666_666_666_666);
        assert_eq!(q.quote_balance_after, 1_000_000_000_000);
        assert_eq!(q.coin_balance_after, 333_333_333_333_333_334);
        assert_eq!(q.effective_quote_after, 1_500_000_000_000);
        // exec 1e12 / 6.67e17 = 1.5e-6 vs spot 5e-7 -> +200%
        assert_eq!(q.price_impact_bps, 20_000);

        let mut next = state;
        apply_quote(&mut next, &q).unwrap();
        assert!(!next.is_migratable());
    }

    #[test]
    fn test_zero_amount() {
        let state = scenario_a();
        assert_eq!(
            QuoteEngine::quote(&state, TradeDirection::Buy, 0).unwrap_err(),
            CurveError::ZeroAmount
        );
    }

    #[test]
    fn test_migrated_rejects_quotes() {
        let mut state = scenario_a();
        state.migrated = true;
        assert_eq!(
            QuoteEngine::quote(&state, TradeDirection::Sell, 1).unwrap_err(),
            CurveError::PoolMigrated
        );
        assert_eq!(
            QuoteEngine::quote_buy_exact_out(&state, 1).unwrap_err(),
            CurveError::PoolMigrated
        );
    }

    #[test]
    fn test_sell_needs_circulating_supply() {
        let state = scenario_a();
        let err = QuoteEngine::quote(&state, TradeDirection::Sell, 10).unwrap_err();
        assert!(matches!(err, CurveError::ExceedsCirculatingSupply { .. }));
    }

    #[test]
    fn test_sell_cannot_pay_virtual_liquidity() {
        let mut state = scenario_a();
        let buy = QuoteEngine::quote(&state, TradeDirection::Buy, 1_000_000_000_000).unwrap();
        apply_quote(&mut state, &buy).unwrap();
        // Selling everything back returns the full real reserve (minus rounding
        // at most), which hits the `>= quote_balance` guard or is just below it.
        match QuoteEngine::quote(&state, TradeDirection::Sell, buy.amount_out) {
            Ok(q) => assert!(q.amount_out < state.quote_balance),
            Err(e) => assert!(matches!(e, CurveError::InsufficientLiquidity { .. })),
        }
    }

    #[test]
    fn test_dust_buy_rejected() {
        let state = CurveState::launch(
            &LaunchParams::default()
                .with_total_supply(1_000)
                .with_virtual_liquidity(1_000_000_000),
        );
        assert_eq!(
            QuoteEngine::quote(&state, TradeDirection::Buy, 1).unwrap_err(),
            CurveError::ZeroOutput
        );
    }

    #[test]
    fn test_round_trip_never_profits() {
        let mut state = scenario_a();
        let x = 123_456_789_012u64;
        let buy = QuoteEngine::quote(&state, TradeDirection::Buy, x).unwrap();
        apply_quote(&mut state, &buy).unwrap();
        let sell = QuoteEngine::quote(&state, TradeDirection::Sell, buy.amount_out / 2).unwrap();
        apply_quote(&mut state, &sell).unwrap();
        let sell2 = QuoteEngine::quote(&state, TradeDirection::Sell, buy.amount_out / 4).unwrap();
        assert!(sell.amount_out + sell2.amount_out <= x);
    }

    #[test]
    fn test_k_non_decreasing_within_one_unit() {
        let mut state = scenario_a();
        let k0 = calculate_k(state.effective_quote_reserve(), state.coin_balance as u128);
        let q = QuoteEngine::quote(&state, TradeDirection::Buy, 777_777_777).unwrap();
        apply_quote(&mut state, &q).unwrap();
        let k1 = calculate_k(state.effective_quote_reserve(), state.coin_balance as u128);
        assert!(k1 >= k0);
        // Rounding never costs more than one coin unit at the new quote reserve.
        assert!(k1 - k0 < primitive_types::U256::from(state.effective_quote_reserve()));
    }

    #[test]
    fn test_exact_out() {
        let state = scenario_a();
        let want = 1_000_000_000_000_000u64;
        let q = QuoteEngine::quote_buy_exact_out(&state, want).unwrap();
        assert!(q.amount_out >= want);
        // One unit less of quote must not be enough.
        let cheaper = QuoteEngine::quote(&state, TradeDirection::Buy, q.amount_in - 1).unwrap();
        assert!(cheaper.amount_out < want);
    }

    #[test]
    fn test_exact_out_drain() {
        let state = scenario_a();
        let err = QuoteEngine::quote_buy_exact_out(&state, state.coin_balance).unwrap_err();
        assert!(matches!(err, CurveError::InsufficientLiquidity { .. }));
    }

    #[test]
    fn test_buy_past_reserve_capacity_is_input_error() {
        let mut state = CurveState::launch(&LaunchParams::default());
        let whale = QuoteEngine::quote(&state, TradeDirection::Buy, u64::MAX - 10).unwrap();
        apply_quote(&mut state, &whale).unwrap();

        let err =
            QuoteEngine::quote(&state, TradeDirection::Buy, 1_000_000_000_000_000).unwrap_err();
        assert_eq!(
            err,
            CurveError::ExceedsReserveCapacity {
                amount: 1_000_000_000_000_000,
                headroom: 10
            }
        );
        assert!(!err.is_fatal());

        let err = QuoteEngine::quote_buy_exact_out(&state, state.coin_balance / 2).unwrap_err();
        assert!(matches!(err, CurveError::ExceedsReserveCapacity { .. }));
    }

    #[test]
    fn test_apply_quote_detects_divergence() {
        let mut state = scenario_a();
        let mut q = QuoteEngine::quote(&state, TradeDirection::Buy, 1_000).unwrap();
        q.coin_balance_after += 1;
        let before = state;
        assert!(matches!(
            apply_quote(&mut state, &q).unwrap_err(),
            CurveError::InvariantViolation(_)
        ));
        assert_eq!(state, before);
    }
}
