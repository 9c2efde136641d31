//! Trade executor: the only path that mutates a pool.
//!
//! Trades on one pool are serialised by that pool's lock; trades on
//! different pools never contend. Every mutation is computed on a copy of
//! the pool and installed only after the store accepted it, so a failed
//! trade leaves nothing behind.

use crate::config::ExecutorConfig;
use crate::error::TradeError;
use crate::lifecycle::{LaunchedData, LifecycleTracker, MigratedData};
use crate::migration::LiquidityHandoff;
use crate::registry::{Ledger, PendingHandoff, PoolRegistry, PoolSlot};
use crate::store::PoolStore;
use chrono::{DateTime, Utc};
use launchpad_domain::value_objects::Percentage;
use launchpad_domain::{
    LaunchParams, MigrationAck, MigrationGate, MigrationState, MigrationStatus, MigrationStep,
    Pool, PoolId, Quote, QuoteEngine, TradeDirection, TradeRecord, apply_quote,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// A trade submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub pool_id: PoolId,
    pub direction: TradeDirection,
    /// Quote paid on a buy, coins paid on a sell.
    pub amount_in: u64,
    /// Smallest acceptable output.
    pub min_amount_out: u64,
    pub trader: String,
}

/// Row of [`TradeExecutor::list_pools`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub id: PoolId,
    pub coin_type: String,
    pub quote_type: String,
    pub state: MigrationState,
    pub bonding_curve_progress: Percentage,
    pub quote_balance: u64,
    pub trade_count: u64,
    pub created_at: DateTime<Utc>,
}

impl From<&Pool> for PoolSummary {
    fn from(pool: &Pool) -> Self {
        Self {
            id: pool.id,
            coin_type: pool.coin_type.clone(),
            quote_type: pool.quote_type.clone(),
            state: pool.state(),
            bonding_curve_progress: pool.curve.bonding_curve_progress(),
            quote_balance: pool.curve.quote_balance,
            trade_count: pool.trade_count,
            created_at: pool.created_at,
        }
    }
}

struct Inner {
    registry: PoolRegistry,
    store: Arc<dyn PoolStore>,
    handoff: Arc<dyn LiquidityHandoff>,
    lifecycle: Arc<LifecycleTracker>,
    config: ExecutorConfig,
}

/// Service owning every pool. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct TradeExecutor {
    inner: Arc<Inner>,
}

impl TradeExecutor {
    /// Creates an executor with no pools.
    pub fn new(
        store: Arc<dyn PoolStore>,
        handoff: Arc<dyn LiquidityHandoff>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: PoolRegistry::default(),
                store,
                handoff,
                lifecycle: Arc::new(LifecycleTracker::with_event_limit(
                    config.event_history_limit,
                )),
                config,
            }),
        }
    }

    /// Creates an executor and reloads every pool and trade log from `store`.
    ///
    /// # Errors
    /// Fails if the store cannot be read or holds the same pool twice.
    pub async fn restore(
        store: Arc<dyn PoolStore>,
        handoff: Arc<dyn LiquidityHandoff>,
        config: ExecutorConfig,
    ) -> Result<Self, TradeError> {
        let executor = Self::new(store.clone(), handoff, config);
        let pools = store.load_pools().await?;
        let count = pools.len();

        for mut pool in pools {
            pool.curve.check_invariants().map_err(|e| {
                error!(pool_id = %pool.id, error = %e, "Stored pool violates curve invariants");
                TradeError::from(e)
            })?;
            let trades = store.load_trades(pool.id).await?;
            let next_sequence = trades
                .iter()
                .map(|t| t.sequence.saturating_add(1))
                .max()
                .unwrap_or(0)
                .max(pool.trade_count);
            if next_sequence != pool.trade_count || trades.len() as u64 != pool.trade_count {
                warn!(
                    pool_id = %pool.id,
                    trade_count = pool.trade_count,
                    stored_trades = trades.len(),
                    next_sequence,
                    "Trade log differs from pool trade count"
                );
            }
            // The next trade takes `trade_count` as its sequence.
            pool.trade_count = next_sequence;
            executor.inner.lifecycle.restore_pool(&pool, &trades).await;
            executor.inner.registry.insert(pool, trades).await?;
        }

        info!(pools = count, "Restored pools from store");
        Ok(executor)
    }

    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.inner.config
    }

    /// Lifecycle events recorded by this executor.
    #[must_use]
    pub fn lifecycle(&self) -> Arc<LifecycleTracker> {
        self.inner.lifecycle.clone()
    }

    /// Launches a new pool with `params` or the configured defaults.
    ///
    /// # Errors
    /// [`CurveError::InvalidParameters`](launchpad_domain::CurveError) for
    /// bad parameters, [`TradeError::Persistence`] if the store rejects it.
    pub async fn launch_pool(
        &self,
        coin_type: impl Into<String>,
        quote_type: impl Into<String>,
        params: Option<LaunchParams>,
    ) -> Result<Pool, TradeError> {
        let params = params.unwrap_or(self.inner.config.launch);
        let pool = Pool::launch(PoolId::new(), coin_type, quote_type, &params, Utc::now())?;

        self.inner.store.save_pool(&pool).await.map_err(|e| {
            warn!(pool_id = %pool.id, error = %e, "Failed to persist launched pool");
            TradeError::from(e)
        })?;
        self.inner.registry.insert(pool.clone(), Vec::new()).await?;

        self.inner
            .lifecycle
            .record_launched(
                pool.id,
                LaunchedData {
                    coin_type: pool.coin_type.clone(),
                    quote_type: pool.quote_type.clone(),
                    params,
                },
            )
            .await;
        Ok(pool)
    }

    /// Last committed snapshot of a pool.
    pub async fn get_pool(&self, pool_id: PoolId) -> Result<Pool, TradeError> {
        let slot = self.inner.registry.get(pool_id).await?;
        let pool = slot.published.read().await.clone();
        Ok(pool)
    }

    /// Every pool, oldest first.
    pub async fn list_pools(&self) -> Vec<PoolSummary> {
        let mut summaries = Vec::new();
        for slot in self.inner.registry.slots().await {
            summaries.push(PoolSummary::from(&*slot.published.read().await));
        }
        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        summaries
    }

    /// A pool's trades ordered by `(timestamp_ms, digest)`.
    pub async fn trades(&self, pool_id: PoolId) -> Result<Vec<TradeRecord>, TradeError> {
        let slot = self.inner.registry.get(pool_id).await?;
        let trades = slot.trades.read().await.clone();
        Ok(trades)
    }

    /// Quotes a trade against the last committed reserves. Takes no trade lock.
    pub async fn get_quote(
        &self,
        pool_id: PoolId,
        direction: TradeDirection,
        amount: u64,
    ) -> Result<Quote, TradeError> {
        let slot = self.inner.registry.get(pool_id).await?;
        let curve = slot.published.read().await.curve;
        let quote = QuoteEngine::quote(&curve, direction, amount)?;
        debug!(
            pool_id = %pool_id,
            direction = %direction,
            amount_in = amount,
            amount_out = quote.amount_out,
            price_impact_bps = quote.price_impact_bps,
            "Quoted trade"
        );
        Ok(quote)
    }

    /// Smallest buy that yields at least `coin_out`.
    pub async fn quote_buy_exact_out(
        &self,
        pool_id: PoolId,
        coin_out: u64,
    ) -> Result<Quote, TradeError> {
        let slot = self.inner.registry.get(pool_id).await?;
        let curve = slot.published.read().await.curve;
        Ok(QuoteEngine::quote_buy_exact_out(&curve, coin_out)?)
    }

    /// Executes a trade under the pool lock.
    ///
    /// Dropping the returned future before the lock is acquired abandons
    /// the trade. Once acquired, the trade runs to completion on its own
    /// task whether or not the caller still waits for it.
    ///
    /// # Errors
    /// Curve rejections, [`TradeError::SlippageExceeded`],
    /// [`TradeError::MigrationInProgress`] and the retryable
    /// [`TradeError::Persistence`]. No state changes on any error.
    pub async fn execute_trade(&self, request: TradeRequest) -> Result<TradeRecord, TradeError> {
        let slot = self.inner.registry.get(request.pool_id).await?;
        let ledger = slot.ledger.clone().lock_owned().await;

        let inner = self.inner.clone();
        tokio::spawn(async move { inner.trade_locked(ledger, &slot, request).await })
            .await
            .map_err(|e| TradeError::Internal(format!("trade task failed: {e}")))?
    }

    pub async fn get_migration_status(
        &self,
        pool_id: PoolId,
    ) -> Result<MigrationStatus, TradeError> {
        let pool = self.get_pool(pool_id).await?;
        Ok(MigrationStatus::of(&pool))
    }

    /// Migrates a pool to external liquidity.
    ///
    /// Idempotent per pool: after the first success every call returns the
    /// same acknowledgment without touching the venue again. A failed
    /// handoff leaves the pool migratable.
    ///
    /// # Errors
    /// [`CurveError::NotMigratable`](launchpad_domain::CurveError) while
    /// bonding, [`TradeError::Handoff`] or [`TradeError::Persistence`]
    /// (both retryable).
    pub async fn migrate(&self, pool_id: PoolId) -> Result<MigrationAck, TradeError> {
        let slot = self.inner.registry.get(pool_id).await?;
        let serial = slot.migration_lock.clone().lock_owned().await;

        let inner = self.inner.clone();
        tokio::spawn(async move {
            let result = inner.migrate_serialised(&slot).await;
            drop(serial);
            result
        })
        .await
        .map_err(|e| TradeError::Internal(format!("migration task failed: {e}")))?
    }

    /// Pools whose quote reserve reached the target and that have not migrated.
    pub async fn migratable_pools(&self) -> Vec<PoolId> {
        let mut ids = Vec::new();
        for slot in self.inner.registry.slots().await {
            if slot.published.read().await.can_migrate() {
                ids.push(slot.id);
            }
        }
        ids.sort();
        ids
    }
}

impl Inner {
    async fn trade_locked(
        &self,
        mut ledger: OwnedMutexGuard<Ledger>,
        slot: &PoolSlot,
        request: TradeRequest,
    ) -> Result<TradeRecord, TradeError> {
        let pool_id = request.pool_id;
        let (next, trade, transition) = self
            .prepare_trade(&ledger, request)
            .map_err(|e| self.report(pool_id, e))?;

        self.store.commit_trade(&next, &trade).await.map_err(|e| {
            warn!(pool_id = %pool_id, error = %e, "Trade not persisted, rolled back");
            TradeError::from(e)
        })?;

        ledger.last_timestamp_ms = trade.timestamp_ms;
        ledger.pool = next.clone();
        *slot.published.write().await = next.clone();
        slot.trades.write().await.push(trade.clone());
        drop(ledger);

        info!(
            pool_id = %pool_id,
            digest = %trade.digest,
            kind = %trade.kind,
            coin_amount = trade.coin_amount,
            quote_amount = trade.quote_amount,
            quote_balance = next.curve.quote_balance,
            "Trade executed"
        );

        self.lifecycle.record_trade(&trade).await;
        if let Some(transition) = transition {
            self.lifecycle
                .record_transition(pool_id, transition, next.curve.quote_balance)
                .await;
        }
        Ok(trade)
    }

    /// Quote, slippage check and mutation on a copy of the pool.
    fn prepare_trade(
        &self,
        ledger: &Ledger,
        request: TradeRequest,
    ) -> Result<(Pool, TradeRecord, Option<launchpad_domain::Transition>), TradeError> {
        if ledger.migration_in_flight || ledger.pending_handoff.is_some() {
            return Err(TradeError::MigrationInProgress(request.pool_id));
        }

        let quote = QuoteEngine::quote(&ledger.pool.curve, request.direction, request.amount_in)?;
        if quote.amount_out < request.min_amount_out {
            return Err(TradeError::SlippageExceeded {
                expected_min: request.min_amount_out,
                actual: quote.amount_out,
            });
        }

        let mut next = ledger.pool.clone();
        let before = next.state();
        apply_quote(&mut next.curve, &quote)?;

        let now = Utc::now();
        let timestamp_ms = now.timestamp_millis().max(ledger.last_timestamp_ms);
        let trade = TradeRecord::from_quote(
            request.pool_id,
            next.trade_count,
            &quote,
            request.trader,
            timestamp_ms,
            Uuid::new_v4(),
        )?;
        next.trade_count += 1;
        next.last_trade_at = Some(DateTime::from_timestamp_millis(timestamp_ms).unwrap_or(now));

        let transition = MigrationGate::observe(before, &next.curve);
        Ok((next, trade, transition))
    }

    async fn migrate_serialised(&self, slot: &PoolSlot) -> Result<MigrationAck, TradeError> {
        let pool_id = slot.id;
        let snapshot = {
            let mut ledger = slot.ledger.lock().await;
            if let Some(pending) = ledger.pending_handoff.take() {
                debug!(pool_id = %pool_id, "Completing acknowledged handoff");
                return self.finish_migration(slot, &mut ledger, pending).await;
            }
            match MigrationGate::begin(&ledger.pool).map_err(|e| self.report(pool_id, e.into()))? {
                MigrationStep::Done(ack) => {
                    debug!(pool_id = %pool_id, "Pool already migrated");
                    return Ok(ack);
                }
                MigrationStep::Handoff(snapshot) => {
                    ledger.migration_in_flight = true;
                    snapshot
                }
            }
        };

        info!(
            pool_id = %pool_id,
            coin_amount = snapshot.coin_amount,
            quote_amount = snapshot.quote_amount,
            "Handing off pool reserves"
        );
        // The trade lock is not held across the venue call.
        let outcome = self.handoff.provision(&snapshot).await;

        let mut ledger = slot.ledger.lock().await;
        match outcome {
            Ok(receipt) => {
                self.finish_migration(slot, &mut ledger, PendingHandoff { snapshot, receipt })
                    .await
            }
            Err(e) => {
                ledger.migration_in_flight = false;
                drop(ledger);
                self.lifecycle
                    .record_migration_failed(pool_id, e.to_string())
                    .await;
                Err(e.into())
            }
        }
    }

    async fn finish_migration(
        &self,
        slot: &PoolSlot,
        ledger: &mut Ledger,
        pending: PendingHandoff,
    ) -> Result<MigrationAck, TradeError> {
        let pool_id = slot.id;
        let mut next = ledger.pool.clone();
        let ack = match MigrationGate::complete(
            &mut next,
            &pending.snapshot,
            pending.receipt.external_ref.clone(),
            Utc::now(),
        ) {
            Ok(ack) => ack,
            Err(e) => {
                ledger.migration_in_flight = false;
                return Err(self.report(pool_id, e.into()));
            }
        };

        if let Err(e) = self.store.save_pool(&next).await {
            warn!(
                pool_id = %pool_id,
                error = %e,
                "Migration acknowledged by venue but not persisted"
            );
            // Trading stays blocked; the next migrate() retries the write only.
            ledger.pending_handoff = Some(pending);
            return Err(e.into());
        }

        ledger.pool = next.clone();
        ledger.migration_in_flight = false;
        *slot.published.write().await = next;

        self.lifecycle
            .record_migrated(
                pool_id,
                MigratedData {
                    coin_amount: ack.coin_amount,
                    quote_amount: ack.quote_amount,
                    external_ref: ack.external_ref.clone(),
                },
            )
            .await;
        Ok(ack)
    }

    /// Logs invariant-class failures before they are returned.
    fn report(&self, pool_id: PoolId, err: TradeError) -> TradeError {
        if err.is_fatal() {
            error!(pool_id = %pool_id, error = %err, "Curve invariant violated");
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::SimulatedHandoff;
    use crate::store::InMemoryPoolStore;
    use launchpad_domain::CurveError;

    fn executor() -> (TradeExecutor, Arc<InMemoryPoolStore>) {
        let store = Arc::new(InMemoryPoolStore::new());
        let executor = TradeExecutor::new(
            store.clone(),
            Arc::new(SimulatedHandoff::default()),
            ExecutorConfig::default(),
        );
        (executor, store)
    }

    fn buy(pool_id: PoolId, amount_in: u64) -> TradeRequest {
        TradeRequest {
            pool_id,
            direction: TradeDirection::Buy,
            amount_in,
            min_amount_out: 0,
            trader: "0xalice".into(),
        }
    }

    #[tokio::test]
    async fn test_launch_and_list() {
        let (executor, store) = executor();
        let pool = executor.launch_pool("MEME", "SUI", None).await.unwrap();

        assert_eq!(executor.get_pool(pool.id).await.unwrap(), pool);
        assert_eq!(store.pool(pool.id).await, Some(pool.clone()));
        let summaries = executor.list_pools().await;
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].state, MigrationState::Bonding);
    }

    #[tokio::test]
    async fn test_launch_rejects_bad_params() {
        let (executor, _) = executor();
        let params = LaunchParams::default().with_target(0);
        let err = executor
            .launch_pool("MEME", "SUI", Some(params))
            .await
            .unwrap_err();
        assert!(matches!(err, TradeError::Curve(CurveError::InvalidParameters(_))));
        assert!(executor.list_pools().await.is_empty());
    }

    #[tokio::test]
    async fn test_trade_matches_quote() {
        let (executor, _) = executor();
        let pool = executor.launch_pool("MEME", "SUI", None).await.unwrap();
        let quote = executor
            .get_quote(pool.id, TradeDirection::Buy, 1_000_000_000)
            .await
            .unwrap();

        let trade = executor.execute_trade(buy(pool.id, 1_000_000_000)).await.unwrap();
        assert_eq!(trade.coin_amount, quote.amount_out);
        assert_eq!(trade.sequence, 0);

        let after = executor.get_pool(pool.id).await.unwrap();
        assert_eq!(after.curve.coin_balance, quote.coin_balance_after);
        assert_eq!(after.trade_count, 1);
        assert!(after.last_trade_at.is_some());
    }

    #[tokio::test]
    async fn test_slippage_leaves_pool_untouched() {
        let (executor, store) = executor();
        let pool = executor.launch_pool("MEME", "SUI", None).await.unwrap();
        let writes = store.write_count();

        let mut request = buy(pool.id, 1_000);
        request.min_amount_out = u64::MAX;
        let err = executor.execute_trade(request).await.unwrap_err();

        assert!(matches!(err, TradeError::SlippageExceeded { .. }));
        assert_eq!(executor.get_pool(pool.id).await.unwrap(), pool);
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn test_unknown_pool() {
        let (executor, _) = executor();
        let id = PoolId::new();
        assert!(matches!(
            executor.execute_trade(buy(id, 1)).await,
            Err(TradeError::PoolNotFound(p)) if p == id
        ));
        assert!(matches!(executor.migrate(id).await, Err(TradeError::PoolNotFound(_))));
    }

    #[tokio::test]
    async fn test_migrate_bonding_pool_rejected() {
        let (executor, _) = executor();
        let pool = executor.launch_pool("MEME", "SUI", None).await.unwrap();
        let err = executor.migrate(pool.id).await.unwrap_err();
        assert!(matches!(
            err,
            TradeError::Curve(CurveError::NotMigratable(MigrationState::Bonding))
        ));
        assert!(executor.migratable_pools().await.is_empty());
    }
}
