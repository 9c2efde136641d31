//! Fixed-point arithmetic and constant-product curve formulas.
//!
//! Nothing in this module uses floating point. [`fixed_point`] provides the
//! wide-intermediate `mul_div` primitives; [`constant_product`] builds the
//! `x * y = k` swap formulas on top of them.

pub mod constant_product;
pub mod fixed_point;

pub use fixed_point::{BPS_DENOMINATOR, DECIMALS, SCALE, mul_div, mul_div_ceil};
