//! Lifecycle tracker for pool history.

use super::{
    EventData, LaunchedData, MigratedData, MigrationFailedData, PoolEvent, PoolEventType,
    TradeData, TransitionData,
};
use launchpad_domain::{MigrationState, Pool, PoolId, TradeDirection, TradeRecord, Transition};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Trading activity of one pool.
#[derive(Debug, Clone)]
pub struct PoolActivity {
    /// Pool.
    pub pool: PoolId,
    /// When the pool was launched.
    pub launched_at: chrono::DateTime<chrono::Utc>,
    /// When the pool migrated.
    pub migrated_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Number of buys.
    pub buy_count: u64,
    /// Number of sells.
    pub sell_count: u64,
    /// Quote paid in by buys.
    pub buy_volume_quote: u128,
    /// Quote paid out by sells.
    pub sell_volume_quote: u128,
    /// Distinct trader addresses.
    pub unique_traders: usize,
    /// Failed migration attempts.
    pub migration_failures: u32,
}

/// Events kept per pool when no limit is configured.
pub const DEFAULT_EVENT_LIMIT: usize = 1_000;

/// Tracks lifecycle events for all pools.
///
/// Only the most recent events of each pool are kept; the full trade history
/// lives in the trade log.
pub struct LifecycleTracker {
    /// Most recent events by pool, oldest first.
    events: Arc<RwLock<HashMap<PoolId, VecDeque<PoolEvent>>>>,
    /// Per-pool event cap.
    event_limit: usize,
    /// Activity summaries.
    activity: Arc<RwLock<HashMap<PoolId, PoolActivity>>>,
    /// Trader sets backing `unique_traders`.
    traders: Arc<RwLock<HashMap<PoolId, HashSet<String>>>>,
}

impl LifecycleTracker {
    /// Creates a new lifecycle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::with_event_limit(DEFAULT_EVENT_LIMIT)
    }

    /// Creates a tracker keeping at most `event_limit` events per pool.
    #[must_use]
    pub fn with_event_limit(event_limit: usize) -> Self {
        Self {
            events: Arc::new(RwLock::new(HashMap::new())),
            event_limit: event_limit.max(1),
            activity: Arc::new(RwLock::new(HashMap::new())),
            traders: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Records a pool launch.
    pub async fn record_launched(&self, pool: PoolId, data: LaunchedData) {
        let event = PoolEvent::new(
            PoolEventType::Launched,
            pool,
            EventData::Launched(data.clone()),
        );
        let launched_at = event.timestamp;
        self.add_event(pool, event).await;

        self.activity.write().await.insert(
            pool,
            PoolActivity {
                pool,
                launched_at,
                migrated_at: None,
                buy_count: 0,
                sell_count: 0,
                buy_volume_quote: 0,
                sell_volume_quote: 0,
                unique_traders: 0,
                migration_failures: 0,
            },
        );

        info!(
            pool_id = %pool,
            coin_type = %data.coin_type,
            target = data.params.target_quote_liquidity,
            "Pool launched"
        );
    }

    /// Rebuilds the activity summary of a pool reloaded from the store.
    ///
    /// No events are replayed; the event history starts empty.
    pub async fn restore_pool(&self, pool: &Pool, trades: &[TradeRecord]) {
        let mut activity = PoolActivity {
            pool: pool.id,
            launched_at: pool.created_at,
            migrated_at: pool.migration.as_ref().map(|ack| ack.migrated_at),
            buy_count: 0,
            sell_count: 0,
            buy_volume_quote: 0,
            sell_volume_quote: 0,
            unique_traders: 0,
            migration_failures: 0,
        };
        let mut traders = HashSet::new();
        for trade in trades {
            match trade.kind {
                TradeDirection::Buy => {
                    activity.buy_count += 1;
                    activity.buy_volume_quote += trade.quote_amount as u128;
                }
                TradeDirection::Sell => {
                    activity.sell_count += 1;
                    activity.sell_volume_quote += trade.quote_amount as u128;
                }
            }
            traders.insert(trade.trader_address.clone());
        }
        activity.unique_traders = traders.len();

        self.activity.write().await.insert(pool.id, activity);
        self.traders.write().await.insert(pool.id, traders);
        debug!(pool_id = %pool.id, trades = trades.len(), "Pool activity restored");
    }

    /// Records a booked trade.
    pub async fn record_trade(&self, trade: &TradeRecord) {
        let pool = trade.pool_id;
        let event = PoolEvent::new(
            PoolEventType::Traded,
            pool,
            EventData::Trade(TradeData {
                digest: trade.digest.clone(),
                kind: trade.kind,
                trader: trade.trader_address.clone(),
                coin_amount: trade.coin_amount,
                quote_amount: trade.quote_amount,
            }),
        );
        self.add_event(pool, event).await;

        let unique_traders = {
            let mut traders = self.traders.write().await;
            let set = traders.entry(pool).or_default();
            set.insert(trade.trader_address.clone());
            set.len()
        };

        if let Some(activity) = self.activity.write().await.get_mut(&pool) {
            match trade.kind {
                TradeDirection::Buy => {
                    activity.buy_count += 1;
                    activity.buy_volume_quote += trade.quote_amount as u128;
                }
                TradeDirection::Sell => {
                    activity.sell_count += 1;
                    activity.sell_volume_quote += trade.quote_amount as u128;
                }
            }
            activity.unique_traders = unique_traders;
        }

        debug!(
            pool_id = %pool,
            digest = %trade.digest,
            kind = %trade.kind,
            "Trade recorded"
        );
    }

    /// Records a migration state change observed after a trade.
    pub async fn record_transition(
        &self,
        pool: PoolId,
        transition: Transition,
        quote_balance: u64,
    ) {
        let event_type = match transition.to {
            MigrationState::Migratable => PoolEventType::BecameMigratable,
            MigrationState::Bonding => PoolEventType::ReturnedToBonding,
            // Only `migrate()` reaches Migrated and it records its own event.
            MigrationState::Migrated => return,
        };
        let event = PoolEvent::new(
            event_type,
            pool,
            EventData::Transition(TransitionData {
                from: transition.from,
                to: transition.to,
                quote_balance,
            }),
        );
        self.add_event(pool, event).await;

        info!(
            pool_id = %pool,
            from = %transition.from,
            to = %transition.to,
            quote_balance,
            "Migration state changed"
        );
    }

    /// Records a completed migration.
    pub async fn record_migrated(&self, pool: PoolId, data: MigratedData) {
        let event = PoolEvent::new(
            PoolEventType::Migrated,
            pool,
            EventData::Migrated(data.clone()),
        );
        let migrated_at = event.timestamp;
        self.add_event(pool, event).await;

        if let Some(activity) = self.activity.write().await.get_mut(&pool) {
            activity.migrated_at = Some(migrated_at);
        }

        info!(
            pool_id = %pool,
            coin_amount = data.coin_amount,
            quote_amount = data.quote_amount,
            external_ref = %data.external_ref,
            "Pool migrated"
        );
    }

    /// Records a failed migration attempt.
    pub async fn record_migration_failed(&self, pool: PoolId, reason: impl Into<String>) {
        let reason = reason.into();
        let event = PoolEvent::new(
            PoolEventType::MigrationFailed,
            pool,
            EventData::MigrationFailed(MigrationFailedData {
                reason: reason.clone(),
            }),
        );
        self.add_event(pool, event).await;

        if let Some(activity) = self.activity.write().await.get_mut(&pool) {
            activity.migration_failures += 1;
        }

        warn!(pool_id = %pool, reason = %reason, "Migration attempt failed");
    }

    /// Adds an event to the tracker.
    async fn add_event(&self, pool: PoolId, event: PoolEvent) {
        let mut events = self.events.write().await;
        let history = events.entry(pool).or_default();
        history.push_back(event);
        while history.len() > self.event_limit {
            history.pop_front();
        }
    }

    /// Gets all events for a pool.
    pub async fn get_events(&self, pool: &PoolId) -> Vec<PoolEvent> {
        self.events
            .read()
            .await
            .get(pool)
            .map(|history| history.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Gets the activity summary for a pool.
    pub async fn get_activity(&self, pool: &PoolId) -> Option<PoolActivity> {
        self.activity.read().await.get(pool).cloned()
    }

    /// Gets aggregate statistics.
    pub async fn get_aggregate_stats(&self) -> AggregateStats {
        let activity = self.activity.read().await;

        let mut stats = AggregateStats::default();

        for pool in activity.values() {
            stats.total_pools += 1;
            if pool.migrated_at.is_some() {
                stats.migrated_pools += 1;
            }
            stats.total_trades += pool.buy_count + pool.sell_count;
            stats.total_buy_volume_quote += pool.buy_volume_quote;
            stats.total_sell_volume_quote += pool.sell_volume_quote;
            stats.migration_failures += pool.migration_failures;
        }

        stats
    }
}

impl Default for LifecycleTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate statistics across all pools.
#[derive(Debug, Clone, Default)]
pub struct AggregateStats {
    /// Pools tracked.
    pub total_pools: u32,
    /// Pools that migrated.
    pub migrated_pools: u32,
    /// Trades booked.
    pub total_trades: u64,
    /// Quote paid in by buys.
    pub total_buy_volume_quote: u128,
    /// Quote paid out by sells.
    pub total_sell_volume_quote: u128,
    /// Failed migration attempts.
    pub migration_failures: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_domain::LaunchParams;
    use launchpad_domain::value_objects::Price;
    use rust_decimal::Decimal;

    fn trade(pool: PoolId, kind: TradeDirection, trader: &str, quote: u64) -> TradeRecord {
        TradeRecord {
            digest: format!("{quote:016x}"),
            pool_id: pool,
            sequence: 0,
            kind,
            trader_address: trader.into(),
            coin_amount: 100,
            quote_amount: quote,
            price_at_trade: Price::new(Decimal::ONE),
            timestamp_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_lifecycle_tracker() {
        let tracker = LifecycleTracker::new();
        let pool = PoolId::new();

        tracker
            .record_launched(
                pool,
                LaunchedData {
                    coin_type: "MEME".into(),
                    quote_type: "SUI".into(),
                    params: LaunchParams::default(),
                },
            )
            .await;
        tracker
            .record_trade(&trade(pool, TradeDirection::Buy, "alice", 50))
            .await;
        tracker
            .record_trade(&trade(pool, TradeDirection::Buy, "bob", 30))
            .await;
        tracker
            .record_trade(&trade(pool, TradeDirection::Sell, "alice", 20))
            .await;

        let events = tracker.get_events(&pool).await;
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].event_type, PoolEventType::Launched);

        let activity = tracker.get_activity(&pool).await.unwrap();
        assert_eq!(activity.buy_count, 2);
        assert_eq!(activity.sell_count, 1);
        assert_eq!(activity.buy_volume_quote, 80);
        assert_eq!(activity.sell_volume_quote, 20);
        assert_eq!(activity.unique_traders, 2);
    }

    #[tokio::test]
    async fn test_event_history_is_capped() {
        let tracker = LifecycleTracker::with_event_limit(2);
        let pool = PoolId::new();

        for quote in [10, 20, 30] {
            tracker
                .record_trade(&trade(pool, TradeDirection::Buy, "alice", quote))
                .await;
        }

        let events = tracker.get_events(&pool).await;
        assert_eq!(events.len(), 2);
        let EventData::Trade(oldest) = &events[0].data else {
            panic!("expected a trade event");
        };
        assert_eq!(oldest.quote_amount, 20);
    }

    #[tokio::test]
    async fn test_restore_pool_rebuilds_activity() {
        let tracker = LifecycleTracker::new();
        let pool = Pool::launch(
            PoolId::new(),
            "MEME",
            "SUI",
            &LaunchParams::default(),
            chrono::Utc::now(),
        )
        .unwrap();
        let trades = vec![
            trade(pool.id, TradeDirection::Buy, "alice", 50),
            trade(pool.id, TradeDirection::Sell, "bob", 20),
        ];

        tracker.restore_pool(&pool, &trades).await;
        tracker
            .record_trade(&trade(pool.id, TradeDirection::Buy, "alice", 5))
            .await;

        let activity = tracker.get_activity(&pool.id).await.unwrap();
        assert_eq!(activity.launched_at, pool.created_at);
        assert_eq!(activity.buy_count, 2);
        assert_eq!(activity.buy_volume_quote, 55);
        assert_eq!(activity.sell_count, 1);
        assert_eq!(activity.unique_traders, 2);
        assert!(activity.migrated_at.is_none());
        assert_eq!(tracker.get_aggregate_stats().await.total_pools, 1);
    }

    #[tokio::test]
    async fn test_transition_and_migration_events() {
        let tracker = LifecycleTracker::new();
        let pool = PoolId::new();

        tracker
            .record_transition(
                pool,
                Transition {
                    from: MigrationState::Bonding,
                    to: MigrationState::Migratable,
                },
                10,
            )
            .await;
        tracker.record_migration_failed(pool, "venue offline").await;
        tracker
            .record_migrated(
                pool,
                MigratedData {
                    coin_amount: 1,
                    quote_amount: 10,
                    external_ref: "dex-1".into(),
                },
            )
            .await;

        let types: Vec<_> = tracker
            .get_events(&pool)
            .await
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(
            types,
            vec![
                PoolEventType::BecameMigratable,
                PoolEventType::MigrationFailed,
                PoolEventType::Migrated
            ]
        );
    }
}
