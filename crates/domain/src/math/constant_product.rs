use super::fixed_point::{add, mul_div, mul_div_ceil, sub};
use crate::error::CurveError;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// Calculates the output amount for a given input amount in a constant product pool (x * y = k).
///
/// formula: dy = floor(y * dx / (x + dx))
///
/// Flooring the output is the same as rounding the post-trade `reserve_out`
/// up, so `k` never decreases across a trade.
pub fn calculate_out_amount(
    amount_in: u128,
    reserve_in: u128,
    reserve_out: u128,
) -> Result<u128, CurveError> {
    if amount_in == 0 {
        return Ok(0);
    }
    if reserve_in == 0 && reserve_out == 0 {
        return Err(CurveError::DivisionByZero);
    }
    let new_reserve_in = add(reserve_in, amount_in, "reserve in after trade")?;
    mul_div(reserve_out, amount_in, new_reserve_in)
}

/// Smallest input that yields at least `amount_out` from the pool.
///
/// formula: dx = ceil(x * dy / (y - dy))
pub fn calculate_in_amount(
    amount_out: u128,
    reserve_in: u128,
    reserve_out: u128,
) -> Result<u128, CurveError> {
    if amount_out == 0 {
        return Ok(0);
    }
    if amount_out >= reserve_out {
        return Err(CurveError::InsufficientLiquidity {
            requested: amount_out,
            available: reserve_out,
        });
    }
    let remaining_out = sub(reserve_out, amount_out, "reserve out after trade")?;
    mul_div_ceil(reserve_in, amount_out, remaining_out)
}

/// Calculates the constant product K
pub fn calculate_k(reserve0: u128, reserve1: u128) -> U256 {
    U256::from(reserve0) * U256::from(reserve1)
}

/// Calculates the spot price of one unit of `reserve_out`'s asset in `reserve_in` units.
/// Price = reserve_in / reserve_out
pub fn calculate_spot_price(reserve_in: u128, reserve_out: u128) -> Result<Decimal, CurveError> {
    let r_in =
        Decimal::from_u128(reserve_in).ok_or(CurveError::ArithmeticOverflow("spot price input"))?;
    let r_out = Decimal::from_u128(reserve_out)
        .ok_or(CurveError::ArithmeticOverflow("spot price output"))?;

    if r_out.is_zero() {
        return Err(CurveError::DivisionByZero);
    }

    r_in.checked_div(r_out)
        .ok_or(CurveError::ArithmeticOverflow("spot price division"))
}
