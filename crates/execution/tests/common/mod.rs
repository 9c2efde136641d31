#![allow(dead_code)]

use async_trait::async_trait;
use launchpad_domain::{MigrationSnapshot, Pool, PoolId, TradeDirection, TradeRecord};
use launchpad_execution::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::{Mutex, Notify};

pub const SCALE: u64 = 1_000_000_000;

/// Fails the first `failures` calls, then succeeds.
#[derive(Default)]
pub struct FlakyHandoff {
    failures: AtomicU32,
    calls: AtomicU32,
}

impl FlakyHandoff {
    pub fn failing(failures: u32) -> Self {
        Self {
            failures: AtomicU32::new(failures),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LiquidityHandoff for FlakyHandoff {
    async fn provision(
        &self,
        snapshot: &MigrationSnapshot,
    ) -> Result<HandoffReceipt, HandoffError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(HandoffError::new("venue unavailable"));
        }
        Ok(HandoffReceipt {
            external_ref: format!("dex:{}:{call}", snapshot.pool_id),
        })
    }
}

/// Parks inside `provision` until released.
#[derive(Default)]
pub struct BlockingHandoff {
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl LiquidityHandoff for BlockingHandoff {
    async fn provision(
        &self,
        snapshot: &MigrationSnapshot,
    ) -> Result<HandoffReceipt, HandoffError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(HandoffReceipt {
            external_ref: format!("dex:{}", snapshot.pool_id),
        })
    }
}

/// In-memory store whose `commit_trade` parks for one chosen pool.
#[derive(Default)]
pub struct GatedStore {
    pub inner: InMemoryPoolStore,
    gated: Mutex<Option<PoolId>>,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedStore {
    pub async fn gate(&self, pool_id: PoolId) {
        *self.gated.lock().await = Some(pool_id);
    }
}

#[async_trait]
impl PoolStore for GatedStore {
    async fn save_pool(&self, pool: &Pool) -> Result<(), StoreError> {
        self.inner.save_pool(pool).await
    }

    async fn append_trade(&self, trade: &TradeRecord) -> Result<(), StoreError> {
        self.inner.append_trade(trade).await
    }

    async fn commit_trade(&self, pool: &Pool, trade: &TradeRecord) -> Result<(), StoreError> {
        let gated = *self.gated.lock().await == Some(pool.id);
        if gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.commit_trade(pool, trade).await
    }

    async fn load_pools(&self) -> Result<Vec<Pool>, StoreError> {
        self.inner.load_pools().await
    }

    async fn load_trades(&self, pool_id: PoolId) -> Result<Vec<TradeRecord>, StoreError> {
        self.inner.load_trades(pool_id).await
    }
}

pub fn executor_with(
    store: Arc<dyn PoolStore>,
    handoff: Arc<dyn LiquidityHandoff>,
) -> TradeExecutor {
    TradeExecutor::new(store, handoff, ExecutorConfig::default())
}

pub fn buy(pool_id: PoolId, amount_in: u64) -> TradeRequest {
    TradeRequest {
        pool_id,
        direction: TradeDirection::Buy,
        amount_in,
        min_amount_out: 0,
        trader: "0xbuyer".into(),
    }
}

pub fn sell(pool_id: PoolId, amount_in: u64) -> TradeRequest {
    TradeRequest {
        pool_id,
        direction: TradeDirection::Sell,
        amount_in,
        min_amount_out: 0,
        trader: "0xseller".into(),
    }
}
