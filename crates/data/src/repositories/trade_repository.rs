//! Trade log repository.

use super::{amount_to_numeric, numeric_to_amount};
use launchpad_domain::value_objects::Price;
use launchpad_domain::{PoolId, TradeDirection, TradeRecord};
use rust_decimal::Decimal;
use sqlx::postgres::{PgExecutor, PgRow};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use uuid::Uuid;

/// Database record for a booked trade.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRow {
    /// Transaction digest.
    pub digest: String,
    /// Pool the trade belongs to.
    pub pool_id: Uuid,
    /// Position in the pool's log.
    pub sequence: i64,
    /// `buy` or `sell`.
    pub kind: String,
    /// Trader address.
    pub trader_address: String,
    /// Coin amount.
    pub coin_amount: Decimal,
    /// Quote amount.
    pub quote_amount: Decimal,
    /// Execution price.
    pub price_at_trade: Decimal,
    /// Booking time in milliseconds.
    pub timestamp_ms: i64,
}

impl TradeRow {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            digest: row.try_get("digest")?,
            pool_id: row.try_get("pool_id")?,
            sequence: row.try_get("sequence")?,
            kind: row.try_get("kind")?,
            trader_address: row.try_get("trader_address")?,
            coin_amount: row.try_get("coin_amount")?,
            quote_amount: row.try_get("quote_amount")?,
            price_at_trade: row.try_get("price_at_trade")?,
            timestamp_ms: row.try_get("timestamp_ms")?,
        })
    }

    /// Builds the row for a domain trade.
    ///
    /// # Errors
    /// Returns an encode error if the sequence exceeds `i64`.
    pub fn from_domain(trade: &TradeRecord) -> Result<Self, sqlx::Error> {
        Ok(Self {
            digest: trade.digest.clone(),
            pool_id: trade.pool_id.0,
            sequence: i64::try_from(trade.sequence)
                .map_err(|e| sqlx::Error::Encode(Box::new(e)))?,
            kind: trade.kind.as_str().to_string(),
            trader_address: trade.trader_address.clone(),
            coin_amount: amount_to_numeric(trade.coin_amount),
            quote_amount: amount_to_numeric(trade.quote_amount),
            price_at_trade: trade.price_at_trade.value,
            timestamp_ms: trade.timestamp_ms,
        })
    }

    /// Converts the row back into a domain trade.
    ///
    /// # Errors
    /// Returns a decode error for unknown kinds or out-of-range values.
    pub fn into_domain(self) -> Result<TradeRecord, sqlx::Error> {
        let kind: TradeDirection = self
            .kind
            .parse()
            .map_err(|e: String| sqlx::Error::Decode(e.into()))?;
        Ok(TradeRecord {
            digest: self.digest,
            pool_id: PoolId(self.pool_id),
            sequence: u64::try_from(self.sequence)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            kind,
            trader_address: self.trader_address,
            coin_amount: numeric_to_amount(self.coin_amount, "coin_amount")?,
            quote_amount: numeric_to_amount(self.quote_amount, "quote_amount")?,
            price_at_trade: Price::new(self.price_at_trade),
            timestamp_ms: self.timestamp_ms,
        })
    }
}

/// Repository for the append-only trade log.
#[derive(Clone)]
pub struct TradeRepository {
    pool: Arc<PgPool>,
}

impl TradeRepository {
    /// Creates a new TradeRepository.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Finds a pool's trades ordered by `(timestamp_ms, digest)`.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_by_pool(&self, pool_id: Uuid) -> Result<Vec<TradeRow>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM pool_trades WHERE pool_id = $1 ORDER BY timestamp_ms, digest",
        )
        .bind(pool_id)
        .fetch_all(self.pool.as_ref())
        .await?;
        rows.iter().map(TradeRow::from_row).collect()
    }

    /// Appends a trade.
    ///
    /// # Errors
    /// Returns an error if the query fails or the digest already exists.
    pub async fn insert(&self, row: &TradeRow) -> Result<(), sqlx::Error> {
        Self::insert_with(self.pool.as_ref(), row).await
    }

    /// Same as [`TradeRepository::insert`] on any executor.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn insert_with<'c, E>(executor: E, row: &TradeRow) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query(
            r#"
            INSERT INTO pool_trades (digest, pool_id, sequence, kind, trader_address,
                                     coin_amount, quote_amount, price_at_trade, timestamp_ms)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&row.digest)
        .bind(row.pool_id)
        .bind(row.sequence)
        .bind(&row.kind)
        .bind(&row.trader_address)
        .bind(row.coin_amount)
        .bind(row.quote_amount)
        .bind(row.price_at_trade)
        .bind(row.timestamp_ms)
        .execute(executor)
        .await?;
        Ok(())
    }
}
