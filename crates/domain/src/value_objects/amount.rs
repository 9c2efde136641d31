use crate::error::CurveError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw token amount together with the decimal scale it is expressed in.
///
/// Only used at the display boundary; the curve itself works on bare `u64`
/// smallest units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount {
    pub raw: u64,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: u64, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Converts a human-readable amount (e.g. `1.5`) into smallest units,
    /// truncating digits beyond `decimals`.
    pub fn from_decimal(d: Decimal, decimals: u8) -> Result<Self, CurveError> {
        if d.is_sign_negative() {
            return Err(CurveError::InvalidParameters(format!(
                "negative amount {d}"
            )));
        }
        let multiplier = Decimal::from(10u64.pow(decimals as u32));
        let raw = d
            .checked_mul(multiplier)
            .and_then(|scaled| scaled.trunc().to_u64())
            .ok_or(CurveError::ArithmeticOverflow("amount from decimal"))?;
        Ok(Self { raw, decimals })
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::from_i128_with_scale(self.raw as i128, self.decimals as u32)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}
