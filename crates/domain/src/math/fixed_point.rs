//! Deterministic integer arithmetic for token amounts.
//!
//! All balance-affecting computations run on unsigned integers in the
//! token's smallest unit (9-decimal fixed point). Products are formed in a
//! 256-bit intermediate so `a * b / d` never overflows before the division.

use crate::error::CurveError;
use primitive_types::U256;

/// Decimal places of every amount handled by the curve.
pub const DECIMALS: u8 = 9;

/// One whole token expressed in smallest units.
pub const SCALE: u64 = 1_000_000_000;

/// Basis points in 100%.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Computes `floor(a * b / denom)` with a 256-bit intermediate product.
///
/// # Errors
/// Returns [`CurveError::DivisionByZero`] when `denom` is zero and
/// [`CurveError::ArithmeticOverflow`] when the quotient does not fit in `u128`.
pub fn mul_div(a: u128, b: u128, denom: u128) -> Result<u128, CurveError> {
    if denom == 0 {
        return Err(CurveError::DivisionByZero);
    }
    let product = U256::from(a) * U256::from(b);
    narrow(product / U256::from(denom), "mul_div quotient")
}

/// Computes `ceil(a * b / denom)` with a 256-bit intermediate product.
///
/// # Errors
/// Same conditions as [`mul_div`].
pub fn mul_div_ceil(a: u128, b: u128, denom: u128) -> Result<u128, CurveError> {
    if denom == 0 {
        return Err(CurveError::DivisionByZero);
    }
    let product = U256::from(a) * U256::from(b);
    let (quotient, remainder) = product.div_mod(U256::from(denom));
    let quotient = if remainder.is_zero() {
        quotient
    } else {
        quotient + U256::one()
    };
    narrow(quotient, "mul_div_ceil quotient")
}

/// Narrows a `u128` intermediate back into a `u64` amount.
///
/// # Errors
/// Returns [`CurveError::ArithmeticOverflow`] tagged with `context` if the
/// value exceeds `u64::MAX`.
pub fn to_u64(value: u128, context: &'static str) -> Result<u64, CurveError> {
    u64::try_from(value).map_err(|_| CurveError::ArithmeticOverflow(context))
}

/// Checked `u128` addition.
///
/// # Errors
/// Returns [`CurveError::ArithmeticOverflow`] tagged with `context`.
pub fn add(a: u128, b: u128, context: &'static str) -> Result<u128, CurveError> {
    a.checked_add(b).ok_or(CurveError::ArithmeticOverflow(context))
}

/// Checked `u128` subtraction. Underflow means the caller's math is wrong,
/// so it is reported as an overflow-class error too.
///
/// # Errors
/// Returns [`CurveError::ArithmeticOverflow`] tagged with `context`.
pub fn sub(a: u128, b: u128, context: &'static str) -> Result<u128, CurveError> {
    a.checked_sub(b).ok_or(CurveError::ArithmeticOverflow(context))
}

/// Relative deviation `|lhs - rhs| / rhs` in basis points, rounded down,
/// where both sides are ratios given as `numerator / denominator`.
///
/// # Errors
/// Returns [`CurveError::DivisionByZero`] if either denominator or the
/// reference ratio is zero, [`CurveError::ArithmeticOverflow`] if the
/// result does not fit in `u64`.
pub fn ratio_deviation_bps(
    lhs_num: u128,
    lhs_den: u128,
    rhs_num: u128,
    rhs_den: u128,
) -> Result<u64, CurveError> {
    if lhs_den == 0 || rhs_den == 0 || rhs_num == 0 {
        return Err(CurveError::DivisionByZero);
    }
    // lhs / rhs = (lhs_num * rhs_den) / (lhs_den * rhs_num)
    let cross_lhs = U256::from(lhs_num) * U256::from(rhs_den);
    let cross_rhs = U256::from(lhs_den) * U256::from(rhs_num);
    let diff = if cross_lhs >= cross_rhs {
        cross_lhs - cross_rhs
    } else {
        cross_rhs - cross_lhs
    };
    let scaled = diff
        .checked_mul(U256::from(BPS_DENOMINATOR))
        .ok_or(CurveError::ArithmeticOverflow("price impact scaling"))?;
    let bps = narrow(scaled / cross_rhs, "price impact bps")?;
    to_u64(bps, "price impact bps")
}

fn narrow(value: U256, context: &'static str) -> Result<u128, CurveError> {
    if value.bits() > 128 {
        return Err(CurveError::ArithmeticOverflow(context));
    }
    Ok(value.low_u128())
}
