//! Persistence boundary.
//!
//! The executor writes through a [`PoolStore`] while it still holds the pool
//! lock; a trade becomes visible only after the store accepted it.

mod memory;

pub use memory::InMemoryPoolStore;

use crate::error::StoreError;
use async_trait::async_trait;
use launchpad_domain::{Pool, PoolId, TradeRecord};

/// Durable storage for pools and their trade logs.
#[async_trait]
pub trait PoolStore: Send + Sync {
    /// Inserts or replaces a pool.
    async fn save_pool(&self, pool: &Pool) -> Result<(), StoreError>;

    /// Appends a trade to its pool's log.
    async fn append_trade(&self, trade: &TradeRecord) -> Result<(), StoreError>;

    /// Writes the post-trade pool and the trade record together.
    ///
    /// The default appends then saves; stores with transactions should
    /// override it so both writes land or neither does.
    async fn commit_trade(&self, pool: &Pool, trade: &TradeRecord) -> Result<(), StoreError> {
        self.append_trade(trade).await?;
        self.save_pool(pool).await
    }

    /// Loads every pool.
    async fn load_pools(&self) -> Result<Vec<Pool>, StoreError>;

    /// Loads a pool's trades in booking order.
    async fn load_trades(&self, pool_id: PoolId) -> Result<Vec<TradeRecord>, StoreError>;
}
