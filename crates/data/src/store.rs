//! PostgreSQL implementation of the executor's persistence boundary.

use crate::repositories::{Database, PoolRecord, PoolRepository, TradeRepository, TradeRow};
use async_trait::async_trait;
use launchpad_domain::{Pool, PoolId, TradeRecord};
use launchpad_execution::error::StoreError;
use launchpad_execution::store::PoolStore;
use tracing::{debug, warn};

/// [`PoolStore`] backed by the `launch_pools` and `pool_trades` tables.
#[derive(Clone)]
pub struct PgPoolStore {
    db: Database,
}

impl PgPoolStore {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Connects and applies the schema.
    ///
    /// # Errors
    /// Returns an error if the connection or the migration fails.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let db = Database::connect(database_url).await?;
        db.migrate().await?;
        Ok(Self::new(db))
    }
}

fn store_error(op: &'static str, err: sqlx::Error) -> StoreError {
    warn!(op, error = %err, "Database operation failed");
    StoreError::new(format!("{op}: {err}"))
}

#[async_trait]
impl PoolStore for PgPoolStore {
    async fn save_pool(&self, pool: &Pool) -> Result<(), StoreError> {
        let record = PoolRecord::from_domain(pool).map_err(|e| store_error("save_pool", e))?;
        self.db
            .pools()
            .upsert(&record)
            .await
            .map_err(|e| store_error("save_pool", e))?;
        debug!(pool_id = %pool.id, "Pool saved");
        Ok(())
    }

    async fn append_trade(&self, trade: &TradeRecord) -> Result<(), StoreError> {
        let row = TradeRow::from_domain(trade).map_err(|e| store_error("append_trade", e))?;
        self.db
            .trades()
            .insert(&row)
            .await
            .map_err(|e| store_error("append_trade", e))
    }

    async fn commit_trade(&self, pool: &Pool, trade: &TradeRecord) -> Result<(), StoreError> {
        let record = PoolRecord::from_domain(pool).map_err(|e| store_error("commit_trade", e))?;
        let row = TradeRow::from_domain(trade).map_err(|e| store_error("commit_trade", e))?;

        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| store_error("commit_trade", e))?;
        TradeRepository::insert_with(&mut *tx, &row)
            .await
            .map_err(|e| store_error("commit_trade", e))?;
        PoolRepository::upsert_with(&mut *tx, &record)
            .await
            .map_err(|e| store_error("commit_trade", e))?;
        tx.commit()
            .await
            .map_err(|e| store_error("commit_trade", e))?;

        debug!(pool_id = %pool.id, digest = %trade.digest, "Trade committed");
        Ok(())
    }

    async fn load_pools(&self) -> Result<Vec<Pool>, StoreError> {
        let records = self
            .db
            .pools()
            .find_all()
            .await
            .map_err(|e| store_error("load_pools", e))?;
        records
            .into_iter()
            .map(PoolRecord::into_domain)
            .collect::<Result<_, _>>()
            .map_err(|e| store_error("load_pools", e))
    }

    async fn load_trades(&self, pool_id: PoolId) -> Result<Vec<TradeRecord>, StoreError> {
        let rows = self
            .db
            .trades()
            .find_by_pool(pool_id.0)
            .await
            .map_err(|e| store_error("load_trades", e))?;
        rows.into_iter()
            .map(TradeRow::into_domain)
            .collect::<Result<_, _>>()
            .map_err(|e| store_error("load_trades", e))
    }
}
