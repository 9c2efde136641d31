use crate::entities::curve_state::CurveState;
use crate::enums::MigrationState;
use crate::error::CurveError;
use crate::math::constant_product::calculate_spot_price;
use crate::migration::MigrationAck;
use crate::params::LaunchParams;
use crate::value_objects::{MarketView, Price};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolId(pub Uuid);

impl PoolId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PoolId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PoolId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A bonding-curve launch pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub coin_type: String,
    pub quote_type: String,
    pub decimals: u8,

    pub curve: CurveState,

    /// Number of trades booked; the next trade gets this as its sequence.
    pub trade_count: u64,

    pub created_at: DateTime<Utc>,
    pub last_trade_at: Option<DateTime<Utc>>,

    /// Set together with `curve.migrated`.
    pub migration: Option<MigrationAck>,
}

impl Pool {
    /// Creates a pool holding the whole supply and no real quote.
    ///
    /// # Errors
    /// Returns [`CurveError::InvalidParameters`] if `params` fail validation.
    pub fn launch(
        id: PoolId,
        coin_type: impl Into<String>,
        quote_type: impl Into<String>,
        params: &LaunchParams,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CurveError> {
        params.validate()?;
        let coin_type = coin_type.into();
        let quote_type = quote_type.into();
        if coin_type.is_empty() || quote_type.is_empty() {
            return Err(CurveError::InvalidParameters(
                "coin and quote types must be named".into(),
            ));
        }
        if coin_type == quote_type {
            return Err(CurveError::InvalidParameters(
                "coin and quote types must differ".into(),
            ));
        }
        Ok(Self {
            id,
            coin_type,
            quote_type,
            decimals: params.decimals,
            curve: CurveState::launch(params),
            trade_count: 0,
            created_at,
            last_trade_at: None,
            migration: None,
        })
    }

    #[must_use]
    pub fn can_migrate(&self) -> bool {
        self.curve.is_migratable()
    }

    #[must_use]
    pub fn migrated(&self) -> bool {
        self.curve.is_migrated()
    }

    #[must_use]
    pub fn state(&self) -> MigrationState {
        self.curve.migration_state()
    }

    /// Launch parameters recovered from the curve.
    #[must_use]
    pub fn params(&self) -> LaunchParams {
        LaunchParams {
            total_supply: self.curve.total_supply,
            virtual_liquidity: self.curve.virtual_liquidity,
            target_quote_liquidity: self.curve.target_quote_liquidity,
            decimals: self.decimals,
        }
    }

    /// Quote units per coin unit at the current effective reserves.
    pub fn spot_price(&self) -> Result<Price, CurveError> {
        calculate_spot_price(
            self.curve.effective_quote_reserve(),
            self.curve.coin_balance as u128,
        )
        .map(Price::new)
    }

    /// Display figures for dashboards.
    pub fn market_view(&self) -> Result<MarketView, CurveError> {
        let spot_price = self.spot_price()?;
        let market_cap = spot_price
            .value
            .checked_mul(Decimal::from(self.curve.total_supply))
            .ok_or(CurveError::ArithmeticOverflow("market cap"))?;
        Ok(MarketView {
            spot_price,
            market_cap: market_cap.round_dp(self.decimals as u32),
            bonding_curve_progress: self.curve.bonding_curve_progress(),
            circulating_supply: self.curve.circulating_supply(),
        })
    }
}
