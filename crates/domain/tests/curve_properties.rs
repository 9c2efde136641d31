//! Property tests for the bonding curve.
//!
//! 1. Reserve bounds hold after every accepted trade.
//! 2. `k` never decreases and grows by less than one output unit.
//! 3. Buying then selling the proceeds never returns more than was paid.
//! 4. `can_migrate` tracks the quote threshold exactly; `migrated` is sticky.

use launchpad_domain::math::constant_product::calculate_k;
use launchpad_domain::{
    CurveError, CurveState, LaunchParams, MigrationState, QuoteEngine, TradeDirection,
    apply_quote,
};
use primitive_types::U256;
use proptest::prelude::*;

fn launch(virtual_liquidity: u64, target: u64) -> CurveState {
    CurveState::launch(
        &LaunchParams::default()
            .with_virtual_liquidity(virtual_liquidity)
            .with_target(target),
    )
}

fn k_of(state: &CurveState) -> U256 {
    calculate_k(state.effective_quote_reserve(), state.coin_balance as u128)
}

#[derive(Debug, Clone)]
enum Op {
    Buy(u64),
    /// Sell a fraction (per mille) of the circulating supply.
    SellPermille(u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u64..=2_000_000_000_000u64).prop_map(Op::Buy),
        (1u16..=1000u16).prop_map(Op::SellPermille),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn reserves_stay_in_bounds(
        virtual_liquidity in 1_000_000u64..=1_000_000_000_000u64,
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let mut state = launch(virtual_liquidity, 5_000_000_000_000);
        for op in ops {
            let quote = match op {
                Op::Buy(q) => QuoteEngine::quote(&state, TradeDirection::Buy, q),
                Op::SellPermille(p) => {
                    let amount = state.circulating_supply() / 1000 * p as u64;
                    QuoteEngine::quote(&state, TradeDirection::Sell, amount)
                }
            };
            let Ok(quote) = quote else { continue };
            let before = state;
            apply_quote(&mut state, &quote).map_err(|e| TestCaseError::fail(e.to_string()))?;

            prop_assert!(state.coin_balance <= state.total_supply);
            prop_assert!(state.coin_balance > 0);
            match quote.direction {
                TradeDirection::Buy => prop_assert!(state.quote_balance > before.quote_balance),
                TradeDirection::Sell => prop_assert!(state.quote_balance < before.quote_balance),
            }
        }
    }

    #[test]
    fn constant_product_within_rounding(
        virtual_liquidity in 1_000_000u64..=1_000_000_000_000u64,
        warmup in 0u64..=3_000_000_000_000u64,
        amount in 1u64..=1_000_000_000_000u64,
        sell in any::<bool>(),
    ) {
        let mut state = launch(virtual_liquidity, 5_000_000_000_000);
        if warmup > 0 {
            if let Ok(q) = QuoteEngine::quote(&state, TradeDirection::Buy, warmup) {
                apply_quote(&mut state, &q).map_err(|e| TestCaseError::fail(e.to_string()))?;
            }
        }
        let (direction, amount) = if sell {
            (TradeDirection::Sell, amount.min(state.circulating_supply()))
        } else {
            (TradeDirection::Buy, amount)
        };
        let Ok(quote) = QuoteEngine::quote(&state, direction, amount) else {
            return Ok(());
        };
        let k_before = k_of(&state);
        apply_quote(&mut state, &quote).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let k_after = k_of(&state);

        prop_assert!(k_after >= k_before);
        // The floored output loses strictly less than one unit of the
        // output side, priced at the post-trade reserve of the input side.
        let tolerance = match direction {
            TradeDirection::Buy => U256::from(state.effective_quote_reserve()),
            TradeDirection::Sell => U256::from(state.coin_balance),
        };
        prop_assert!(k_after - k_before < tolerance);
    }

    #[test]
    fn round_trip_never_favours_trader(
        virtual_liquidity in 1_000_000u64..=1_000_000_000_000u64,
        warmup in 0u64..=3_000_000_000_000u64,
        x in 1_000u64..=2_000_000_000_000u64,
    ) {
        let mut state = launch(virtual_liquidity, 5_000_000_000_000);
        if warmup > 0 {
            if let Ok(q) = QuoteEngine::quote(&state, TradeDirection::Buy, warmup) {
                apply_quote(&mut state, &q).map_err(|e| TestCaseError::fail(e.to_string()))?;
            }
        }
        let Ok(buy) = QuoteEngine::quote(&state, TradeDirection::Buy, x) else {
            return Ok(());
        };
        apply_quote(&mut state, &buy).map_err(|e| TestCaseError::fail(e.to_string()))?;

        match QuoteEngine::quote(&state, TradeDirection::Sell, buy.amount_out) {
            Ok(sell) => prop_assert!(sell.amount_out <= x),
            // Paying back the whole real reserve is refused outright.
            Err(CurveError::InsufficientLiquidity { .. }) | Err(CurveError::ZeroOutput) => {}
            Err(e) => return Err(TestCaseError::fail(e.to_string())),
        }
    }

    #[test]
    fn can_migrate_iff_threshold(
        target in 1_000_000u64..=10_000_000_000_000u64,
        buys in prop::collection::vec(1_000u64..=3_000_000_000_000u64, 1..10),
    ) {
        let mut state = launch(500_000_000_000, target);
        for q in buys {
            let Ok(quote) = QuoteEngine::quote(&state, TradeDirection::Buy, q) else {
                continue;
            };
            apply_quote(&mut state, &quote).map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(state.is_migratable(), state.quote_balance >= target);
        }
        if state.is_migratable() {
            state.mark_migrated().map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(state.migration_state(), MigrationState::Migrated);
            prop_assert!(QuoteEngine::quote(&state, TradeDirection::Buy, 1_000).is_err());
            prop_assert!(state.is_migrated());
        }
    }
}
