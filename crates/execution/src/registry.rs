//! Pool registry with one lock per pool.

use crate::error::TradeError;
use crate::migration::HandoffReceipt;
use launchpad_domain::{MigrationSnapshot, Pool, PoolId, TradeRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Venue acknowledged the handoff but the migrated pool is not stored yet.
#[derive(Debug, Clone)]
pub(crate) struct PendingHandoff {
    pub snapshot: MigrationSnapshot,
    pub receipt: HandoffReceipt,
}

/// Authoritative state of one pool, guarded by the pool lock.
#[derive(Debug)]
pub(crate) struct Ledger {
    pub pool: Pool,
    /// Set while the real reserves are out for handoff; trades are refused.
    pub migration_in_flight: bool,
    pub pending_handoff: Option<PendingHandoff>,
    /// Last booked timestamp; new trades never go below it.
    pub last_timestamp_ms: i64,
}

pub(crate) struct PoolSlot {
    pub id: PoolId,
    /// Exclusive per-pool trade lock.
    pub ledger: Arc<Mutex<Ledger>>,
    /// Serialises `migrate()` calls so one handoff runs at a time.
    pub migration_lock: Arc<Mutex<()>>,
    /// Last committed pool, read by quotes without taking the trade lock.
    pub published: RwLock<Pool>,
    /// Committed trades in booking order.
    pub trades: RwLock<Vec<TradeRecord>>,
}

impl PoolSlot {
    fn new(pool: Pool, trades: Vec<TradeRecord>) -> Self {
        let last_timestamp_ms = trades.last().map_or(i64::MIN, |t| t.timestamp_ms);
        Self {
            id: pool.id,
            ledger: Arc::new(Mutex::new(Ledger {
                pool: pool.clone(),
                migration_in_flight: false,
                pending_handoff: None,
                last_timestamp_ms,
            })),
            migration_lock: Arc::new(Mutex::new(())),
            published: RwLock::new(pool),
            trades: RwLock::new(trades),
        }
    }
}

/// Map from pool id to slot. The map lock is held only to look slots up.
#[derive(Default)]
pub(crate) struct PoolRegistry {
    pools: RwLock<HashMap<PoolId, Arc<PoolSlot>>>,
}

impl PoolRegistry {
    pub async fn insert(
        &self,
        pool: Pool,
        trades: Vec<TradeRecord>,
    ) -> Result<Arc<PoolSlot>, TradeError> {
        let mut pools = self.pools.write().await;
        if pools.contains_key(&pool.id) {
            return Err(TradeError::PoolAlreadyExists(pool.id));
        }
        let slot = Arc::new(PoolSlot::new(pool, trades));
        pools.insert(slot.id, slot.clone());
        Ok(slot)
    }

    pub async fn get(&self, pool_id: PoolId) -> Result<Arc<PoolSlot>, TradeError> {
        self.pools
            .read()
            .await
            .get(&pool_id)
            .cloned()
            .ok_or(TradeError::PoolNotFound(pool_id))
    }

    pub async fn slots(&self) -> Vec<Arc<PoolSlot>> {
        self.pools.read().await.values().cloned().collect()
    }
}
