//! Repository implementations for database persistence.
//!
//! This module provides repository patterns for storing and retrieving
//! launch pools and their trade logs.

mod pool_repository;
mod trade_repository;

pub use pool_repository::{PoolRecord, PoolRepository};
pub use trade_repository::{TradeRepository, TradeRow};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::{Executor, PgPool};
use std::sync::Arc;

/// Database connection wrapper for repositories.
#[derive(Clone)]
pub struct Database {
    pool: Arc<PgPool>,
}

impl Database {
    /// Creates a new Database wrapper from a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Creates a new database connection from a connection string.
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    ///
    /// # Errors
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates a PoolRepository instance.
    #[must_use]
    pub fn pools(&self) -> PoolRepository {
        PoolRepository::new(self.pool.clone())
    }

    /// Creates a TradeRepository instance.
    #[must_use]
    pub fn trades(&self) -> TradeRepository {
        TradeRepository::new(self.pool.clone())
    }

    /// Runs database migrations.
    ///
    /// # Errors
    /// Returns an error if migrations fail.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        // Unprepared so the multi-statement script runs in one round trip.
        self.pool
            .as_ref()
            .execute(include_str!("../../migrations/001_initial_schema.sql"))
            .await?;
        Ok(())
    }
}

/// Smallest-unit amount as a `NUMERIC` column value.
pub(crate) fn amount_to_numeric(amount: u64) -> Decimal {
    Decimal::from(amount)
}

/// `NUMERIC` column value back to a smallest-unit amount.
pub(crate) fn numeric_to_amount(value: Decimal, column: &str) -> Result<u64, sqlx::Error> {
    if !value.fract().is_zero() {
        return Err(sqlx::Error::Decode(
            format!("{column} is not an integer: {value}").into(),
        ));
    }
    value.to_u64().ok_or_else(|| {
        sqlx::Error::Decode(format!("{column} is outside the u64 range: {value}").into())
    })
}
