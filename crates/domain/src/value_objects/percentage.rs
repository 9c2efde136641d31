use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A percentage in the `0..=100` range, e.g. bonding-curve progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Percentage(pub Decimal);

impl Percentage {
    pub const HUNDRED: Self = Self(Decimal::ONE_HUNDRED);

    /// `numerator / denominator * 100` rounded to four places and capped at
    /// 100. A zero denominator counts as complete.
    pub fn capped_ratio(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 || numerator >= denominator {
            return Self::HUNDRED;
        }
        let ratio = Decimal::from(numerator) / Decimal::from(denominator);
        Self((ratio * Decimal::ONE_HUNDRED).round_dp(4))
    }

    pub fn from_bps(bps: u32) -> Self {
        Self(Decimal::from(bps) / Decimal::from(100))
    }

    pub fn to_bps(&self) -> u32 {
        (self.0 * Decimal::from(100)).to_u32().unwrap_or(0)
    }
}
