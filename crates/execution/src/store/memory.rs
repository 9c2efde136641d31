//! In-process store used by the CLI simulator and tests.

use super::PoolStore;
use crate::error::StoreError;
use async_trait::async_trait;
use launchpad_domain::{Pool, PoolId, TradeRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Volatile [`PoolStore`] backed by hash maps.
///
/// Writes can be made to fail with [`InMemoryPoolStore::set_fail_writes`]
/// to exercise the executor's rollback path.
#[derive(Default)]
pub struct InMemoryPoolStore {
    pools: RwLock<HashMap<PoolId, Pool>>,
    trades: RwLock<HashMap<PoolId, Vec<TradeRecord>>>,
    fail_writes: AtomicBool,
    writes: AtomicU64,
}

impl InMemoryPoolStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful write calls.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Stored copy of a pool.
    pub async fn pool(&self, pool_id: PoolId) -> Option<Pool> {
        self.pools.read().await.get(&pool_id).cloned()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::new("in-memory store is rejecting writes"));
        }
        Ok(())
    }
}

#[async_trait]
impl PoolStore for InMemoryPoolStore {
    async fn save_pool(&self, pool: &Pool) -> Result<(), StoreError> {
        self.check_writable()?;
        self.pools.write().await.insert(pool.id, pool.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(pool_id = %pool.id, "Pool saved");
        Ok(())
    }

    async fn append_trade(&self, trade: &TradeRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        self.trades
            .write()
            .await
            .entry(trade.pool_id)
            .or_default()
            .push(trade.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn commit_trade(&self, pool: &Pool, trade: &TradeRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        // Both maps under their write locks so readers never see half a commit.
        let mut pools = self.pools.write().await;
        let mut trades = self.trades.write().await;
        trades.entry(trade.pool_id).or_default().push(trade.clone());
        pools.insert(pool.id, pool.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(pool_id = %pool.id, digest = %trade.digest, "Trade committed");
        Ok(())
    }

    async fn load_pools(&self) -> Result<Vec<Pool>, StoreError> {
        Ok(self.pools.read().await.values().cloned().collect())
    }

    async fn load_trades(&self, pool_id: PoolId) -> Result<Vec<TradeRecord>, StoreError> {
        let mut trades = self
            .trades
            .read()
            .await
            .get(&pool_id)
            .cloned()
            .unwrap_or_default();
        trades.sort();
        Ok(trades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use launchpad_domain::LaunchParams;

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

    #[tokio::test]
    async fn test_save_and_load() {
        let store = InMemoryPoolStore::new();
        let p = pool();
        store.save_pool(&p).await.unwrap();
        let loaded = store.load_pools().await.unwrap();
        assert_eq!(loaded, vec![p.clone()]);
        assert_eq!(store.pool(p.id).await, Some(p));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let store = InMemoryPoolStore::new();
        store.set_fail_writes(true);
        assert!(store.save_pool(&pool()).await.is_err());
        assert!(store.load_pools().await.unwrap().is_empty());
        store.set_fail_writes(false);
        assert!(store.save_pool(&pool()).await.is_ok());
    }
}
