//! Reserve ledger of a bonding-curve pool.

use crate::enums::MigrationState;
use crate::error::CurveError;
use crate::params::LaunchParams;
use crate::value_objects::Percentage;
use serde::{Deserialize, Serialize};

/// Balances and thresholds that drive pricing.
///
/// Only the real reserves change after launch. `virtual_liquidity`,
/// `target_quote_liquidity` and `total_supply` are fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveState {
    /// Real coin reserve held by the pool.
    pub coin_balance: u64,
    /// Real quote reserve held by the pool.
    pub quote_balance: u64,
    /// Pricing-only offset on the quote side.
    pub virtual_liquidity: u64,
    /// Real quote reserve at which the pool can migrate.
    pub target_quote_liquidity: u64,
    /// Total mint of the coin.
    pub total_supply: u64,
    /// Set once by migration, never cleared.
    pub migrated: bool,
}

impl CurveState {
    /// Fresh curve: the whole supply in the pool and no real quote.
    #[must_use]
    pub fn launch(params: &LaunchParams) -> Self {
        Self {
            coin_balance: params.total_supply,
            quote_balance: 0,
            virtual_liquidity: params.virtual_liquidity,
            target_quote_liquidity: params.target_quote_liquidity,
            total_supply: params.total_supply,
            migrated: false,
        }
    }

    /// Quote reserve used for pricing: real balance plus virtual liquidity.
    #[must_use]
    pub fn effective_quote_reserve(&self) -> u128 {
        self.quote_balance as u128 + self.virtual_liquidity as u128
    }

    #[must_use]
    pub fn is_migrated(&self) -> bool {
        self.migrated
    }

    /// True once the real quote reserve reached the target and the pool has
    /// not migrated yet. Always derived, never stored.
    #[must_use]
    pub fn is_migratable(&self) -> bool {
        !self.migrated && self.quote_balance >= self.target_quote_liquidity
    }

    #[must_use]
    pub fn migration_state(&self) -> MigrationState {
        if self.migrated {
            MigrationState::Migrated
        } else if self.is_migratable() {
            MigrationState::Migratable
        } else {
            MigrationState::Bonding
        }
    }

    /// `min(100, quote_balance / target * 100)`.
    #[must_use]
    pub fn bonding_curve_progress(&self) -> Percentage {
        Percentage::capped_ratio(self.quote_balance, self.target_quote_liquidity)
    }

    /// Coins held by traders.
    #[must_use]
    pub fn circulating_supply(&self) -> u64 {
        self.total_supply.saturating_sub(self.coin_balance)
    }

    /// Books a validated buy: `quote_in` enters, `coin_out` leaves.
    ///
    /// Intended for the trade executor only, after the quote engine produced
    /// the amounts. The state is untouched when an error is returned.
    ///
    /// # Errors
    /// [`CurveError::PoolMigrated`] on a migrated pool,
    /// [`CurveError::InvariantViolation`] if the amounts would break the
    /// reserve bounds.
    pub fn apply_buy(&mut self, quote_in: u64, coin_out: u64) -> Result<(), CurveError> {
        if self.migrated {
            return Err(CurveError::PoolMigrated);
        }
        if quote_in == 0 {
            return Err(CurveError::InvariantViolation(
                "buy must strictly increase the quote balance".into(),
            ));
        }
        let quote_balance = self.quote_balance.checked_add(quote_in).ok_or_else(|| {
            CurveError::InvariantViolation(format!(
                "quote balance {} + {} overflows",
                self.quote_balance, quote_in
            ))
        })?;
        let coin_balance = self.coin_balance.checked_sub(coin_out).ok_or_else(|| {
            CurveError::InvariantViolation(format!(
                "coin out {} exceeds coin balance {}",
                coin_out, self.coin_balance
            ))
        })?;

        self.quote_balance = quote_balance;
        self.coin_balance = coin_balance;
        Ok(())
    }

    /// Books a validated sell: `coin_in` enters, `quote_out` leaves.
    ///
    /// # Errors
    /// Same conditions as [`CurveState::apply_buy`].
    pub fn apply_sell(&mut self, coin_in: u64, quote_out: u64) -> Result<(), CurveError> {
        if self.migrated {
            return Err(CurveError::PoolMigrated);
        }
        if quote_out == 0 {
            return Err(CurveError::InvariantViolation(
                "sell must strictly decrease the quote balance".into(),
            ));
        }
        let coin_balance = self
            .coin_balance
            .checked_add(coin_in)
            .filter(|balance| *balance <= self.total_supply)
            .ok_or_else(|| {
                CurveError::InvariantViolation(format!(
                    "coin balance {} + {} exceeds total supply {}",
                    self.coin_balance, coin_in, self.total_supply
                ))
            })?;
        let quote_balance = self.quote_balance.checked_sub(quote_out).ok_or_else(|| {
            CurveError::InvariantViolation(format!(
                "quote out {} exceeds quote balance {}",
                quote_out, self.quote_balance
            ))
        })?;

        self.coin_balance = coin_balance;
        self.quote_balance = quote_balance;
        Ok(())
    }

    /// Flips the terminal flag.
    ///
    /// # Errors
    /// [`CurveError::NotMigratable`] unless the curve is currently migratable.
    pub fn mark_migrated(&mut self) -> Result<(), CurveError> {
        if !self.is_migratable() {
            return Err(CurveError::NotMigratable(self.migration_state()));
        }
        self.migrated = true;
        Ok(())
    }

    /// Checks the static reserve bounds.
    ///
    /// # Errors
    /// [`CurveError::InvariantViolation`] describing the first broken bound.
    pub fn check_invariants(&self) -> Result<(), CurveError> {
        if self.coin_balance > self.total_supply {
            return Err(CurveError::InvariantViolation(format!(
                "coin balance {} above total supply {}",
                self.coin_balance, self.total_supply
            )));
        }
        Ok(())
    }
}
