//! Pool repository for launch pool persistence.

use super::{amount_to_numeric, numeric_to_amount};
use launchpad_domain::{CurveState, MigrationAck, Pool, PoolId};
use rust_decimal::Decimal;
use sqlx::postgres::{PgExecutor, PgRow};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use uuid::Uuid;

/// Database record for a launch pool.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolRecord {
    /// Pool identifier.
    pub id: Uuid,
    /// Meme coin type.
    pub coin_type: String,
    /// Quote currency type.
    pub quote_type: String,
    /// Decimals of both assets.
    pub decimals: i16,
    /// Real coin reserve.
    pub coin_balance: Decimal,
    /// Real quote reserve.
    pub quote_balance: Decimal,
    /// Pricing-only quote offset.
    pub virtual_liquidity: Decimal,
    /// Migration threshold.
    pub target_quote_liquidity: Decimal,
    /// Total mint.
    pub total_supply: Decimal,
    /// Terminal migration flag.
    pub migrated: bool,
    /// Trades booked so far.
    pub trade_count: i64,
    /// Migration acknowledgment as JSON.
    pub migration_ack: Option<String>,
    /// Launch timestamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Last trade timestamp.
    pub last_trade_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl PoolRecord {
    /// Creates a PoolRecord from a database row.
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            coin_type: row.try_get("coin_type")?,
            quote_type: row.try_get("quote_type")?,
            decimals: row.try_get("decimals")?,
            coin_balance: row.try_get("coin_balance")?,
            quote_balance: row.try_get("quote_balance")?,
            virtual_liquidity: row.try_get("virtual_liquidity")?,
            target_quote_liquidity: row.try_get("target_quote_liquidity")?,
            total_supply: row.try_get("total_supply")?,
            migrated: row.try_get("migrated")?,
            trade_count: row.try_get("trade_count")?,
            migration_ack: row.try_get("migration_ack")?,
            created_at: row.try_get("created_at")?,
            last_trade_at: row.try_get("last_trade_at")?,
        })
    }

    /// Builds the record for a domain pool.
    ///
    /// # Errors
    /// Returns an error if the migration acknowledgment cannot be encoded.
    pub fn from_domain(pool: &Pool) -> Result<Self, sqlx::Error> {
        let migration_ack = pool
            .migration
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        Ok(Self {
            id: pool.id.0,
            coin_type: pool.coin_type.clone(),
            quote_type: pool.quote_type.clone(),
            decimals: i16::from(pool.decimals),
            coin_balance: amount_to_numeric(pool.curve.coin_balance),
            quote_balance: amount_to_numeric(pool.curve.quote_balance),
            virtual_liquidity: amount_to_numeric(pool.curve.virtual_liquidity),
            target_quote_liquidity: amount_to_numeric(pool.curve.target_quote_liquidity),
            total_supply: amount_to_numeric(pool.curve.total_supply),
            migrated: pool.curve.migrated,
            trade_count: i64::try_from(pool.trade_count)
                .map_err(|e| sqlx::Error::Encode(Box::new(e)))?,
            migration_ack,
            created_at: pool.created_at,
            last_trade_at: pool.last_trade_at,
        })
    }

    /// Converts the record back into a domain pool.
    ///
    /// # Errors
    /// Returns a decode error if a stored value is out of range.
    pub fn into_domain(self) -> Result<Pool, sqlx::Error> {
        let migration = self
            .migration_ack
            .as_deref()
            .map(serde_json::from_str::<MigrationAck>)
            .transpose()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let decimals =
            u8::try_from(self.decimals).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let trade_count =
            u64::try_from(self.trade_count).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Pool {
            id: PoolId(self.id),
            coin_type: self.coin_type,
            quote_type: self.quote_type,
            decimals,
            curve: CurveState {
                coin_balance: numeric_to_amount(self.coin_balance, "coin_balance")?,
                quote_balance: numeric_to_amount(self.quote_balance, "quote_balance")?,
                virtual_liquidity: numeric_to_amount(self.virtual_liquidity, "virtual_liquidity")?,
                target_quote_liquidity: numeric_to_amount(
                    self.target_quote_liquidity,
                    "target_quote_liquidity",
                )?,
                total_supply: numeric_to_amount(self.total_supply, "total_supply")?,
                migrated: self.migrated,
            },
            trade_count,
            created_at: self.created_at,
            last_trade_at: self.last_trade_at,
            migration,
        })
    }
}

/// Repository for pool CRUD operations.
#[derive(Clone)]
pub struct PoolRepository {
    pool: Arc<PgPool>,
}

impl PoolRepository {
    /// Creates a new PoolRepository.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Finds all pools, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_all(&self) -> Result<Vec<PoolRecord>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM launch_pools ORDER BY created_at, id")
            .fetch_all(self.pool.as_ref())
            .await?;
        rows.iter().map(PoolRecord::from_row).collect()
    }

    /// Creates or updates a pool record.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn upsert(&self, record: &PoolRecord) -> Result<(), sqlx::Error> {
        Self::upsert_with(self.pool.as_ref(), record).await
    }

    /// Same as [`PoolRepository::upsert`] on any executor, e.g. an open
    /// transaction.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn upsert_with<'c, E>(executor: E, record: &PoolRecord) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query(
            r#"
            INSERT INTO launch_pools (id, coin_type, quote_type, decimals, coin_balance,
                                      quote_balance, virtual_liquidity, target_quote_liquidity,
                                      total_supply, migrated, trade_count, migration_ack,
                                      created_at, last_trade_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (id) DO UPDATE SET
                coin_balance = EXCLUDED.coin_balance,
                quote_balance = EXCLUDED.quote_balance,
                migrated = EXCLUDED.migrated,
                trade_count = EXCLUDED.trade_count,
                migration_ack = EXCLUDED.migration_ack,
                last_trade_at = EXCLUDED.last_trade_at,
                updated_at = NOW()
            "#,
        )
        .bind(record.id)
        .bind(&record.coin_type)
        .bind(&record.quote_type)
        .bind(record.decimals)
        .bind(record.coin_balance)
        .bind(record.quote_balance)
        .bind(record.virtual_liquidity)
        .bind(record.target_quote_liquidity)
        .bind(record.total_supply)
        .bind(record.migrated)
        .bind(record.trade_count)
        .bind(&record.migration_ack)
        .bind(record.created_at)
        .bind(record.last_trade_at)
        .execute(executor)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use launchpad_domain::{LaunchParams, MigrationGate, MigrationStep};

    fn pool() -> Pool {
        Pool::launch(
            PoolId::new(),
            "MEME",
            "SUI",
            &LaunchParams::default(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_record_keeps_fresh_pool() {
        let p = pool();
        let record = PoolRecord::from_domain(&p).unwrap();
        assert_eq!(record.coin_balance, Decimal::from(p.curve.total_supply));
        assert!(record.migration_ack.is_none());
        assert_eq!(record.into_domain().unwrap(), p);
    }

    #[test]
    fn test_record_keeps_migration_ack() {
        let mut p = pool();
        p.curve
            .apply_buy(p.curve.target_quote_liquidity, 1_000)
            .unwrap();
        let MigrationStep::Handoff(snapshot) = MigrationGate::begin(&p).unwrap() else {
            panic!("pool should be migratable");
        };
        MigrationGate::complete(&mut p, &snapshot, "dex:1", Utc::now()).unwrap();

        let record = PoolRecord::from_domain(&p).unwrap();
        assert!(record.migrated);
        assert!(record.migration_ack.is_some());
        assert_eq!(record.into_domain().unwrap(), p);
    }

    #[test]
    fn test_negative_balance_rejected() {
        let mut record = PoolRecord::from_domain(&pool()).unwrap();
        record.quote_balance = Decimal::NEGATIVE_ONE;
        assert!(record.into_domain().is_err());
    }
}
