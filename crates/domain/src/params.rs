//! Launch parameters fixed for the lifetime of a pool.

use crate::error::CurveError;
use crate::math::{DECIMALS, SCALE};
use serde::{Deserialize, Serialize};

/// Curve shape chosen at launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchParams {
    /// Fixed mint of the meme token, in smallest units.
    pub total_supply: u64,
    /// Constant added to the quote reserve for pricing only.
    pub virtual_liquidity: u64,
    /// Real quote reserve at which the pool becomes migratable.
    pub target_quote_liquidity: u64,
    /// Decimal places of both assets.
    pub decimals: u8,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            total_supply: 1_000_000_000 * SCALE,
            virtual_liquidity: 500 * SCALE,
            target_quote_liquidity: 5_000 * SCALE,
            decimals: DECIMALS,
        }
    }
}

impl LaunchParams {
    /// Validates the parameters.
    ///
    /// # Errors
    /// Returns [`CurveError::InvalidParameters`] when a field is zero, the
    /// effective quote reserve at the target does not fit a `u64` amount, or
    /// the decimals exceed what `u64` amounts can express.
    pub fn validate(&self) -> Result<(), CurveError> {
        if self.total_supply == 0 {
            return Err(CurveError::InvalidParameters(
                "total supply must be positive".into(),
            ));
        }
        if self.virtual_liquidity == 0 {
            // With no virtual quote the first buy could take the whole supply.
            return Err(CurveError::InvalidParameters(
                "virtual liquidity must be positive".into(),
            ));
        }
        if self.target_quote_liquidity == 0 {
            return Err(CurveError::InvalidParameters(
                "target quote liquidity must be positive".into(),
            ));
        }
        if self
            .target_quote_liquidity
            .checked_add(self.virtual_liquidity)
            .is_none()
        {
            return Err(CurveError::InvalidParameters(format!(
                "target {} plus virtual liquidity {} overflows the quote reserve",
                self.target_quote_liquidity, self.virtual_liquidity
            )));
        }
        if self.decimals > 19 {
            return Err(CurveError::InvalidParameters(format!(
                "decimals {} exceed the u64 range",
                self.decimals
            )));
        }
        Ok(())
    }

    /// Sets the virtual liquidity.
    #[must_use]
    pub fn with_virtual_liquidity(mut self, virtual_liquidity: u64) -> Self {
        self.virtual_liquidity = virtual_liquidity;
        self
    }

    /// Sets the migration target.
    #[must_use]
    pub fn with_target(mut self, target_quote_liquidity: u64) -> Self {
        self.target_quote_liquidity = target_quote_liquidity;
        self
    }

    /// Sets the total supply.
    #[must_use]
    pub fn with_total_supply(mut self, total_supply: u64) -> Self {
        self.total_supply = total_supply;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_launch() {
        let p = LaunchParams::default();
        assert_eq!(p.total_supply, 1_000_000_000_000_000_000);
        assert_eq!(p.virtual_liquidity, 500_000_000_000);
        assert_eq!(p.target_quote_liquidity, 5_000_000_000_000);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_fields() {
        let p = LaunchParams::default();
        assert!(p.with_total_supply(0).validate().is_err());
        assert!(p.with_virtual_liquidity(0).validate().is_err());
        assert!(p.with_target(0).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unreachable_target() {
        let p = LaunchParams::default().with_target(u64::MAX);
        assert!(matches!(
            p.validate(),
            Err(CurveError::InvalidParameters(_))
        ));
        assert!(
            p.with_target(u64::MAX - p.virtual_liquidity)
                .validate()
                .is_ok()
        );
    }
}
