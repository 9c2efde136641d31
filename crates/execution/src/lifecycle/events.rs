//! Lifecycle events for pool tracking.

use launchpad_domain::{LaunchParams, MigrationState, PoolId, TradeDirection};
use serde::{Deserialize, Serialize};

/// Type of lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEventType {
    /// Pool was launched.
    Launched,
    /// A trade was booked.
    Traded,
    /// Quote reserve reached the migration target.
    BecameMigratable,
    /// A sell took the quote reserve back below the target.
    ReturnedToBonding,
    /// Pool migrated to external liquidity.
    Migrated,
    /// A migration handoff attempt failed.
    MigrationFailed,
}

/// A lifecycle event for a pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolEvent {
    /// Event ID.
    pub id: String,
    /// Event type.
    pub event_type: PoolEventType,
    /// Pool the event belongs to.
    pub pool: PoolId,
    /// Timestamp.
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Event-specific data.
    pub data: EventData,
}

impl PoolEvent {
    /// Creates a new lifecycle event.
    pub fn new(event_type: PoolEventType, pool: PoolId, data: EventData) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type,
            pool,
            timestamp: chrono::Utc::now(),
            data,
        }
    }
}

/// Event-specific data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventData {
    /// Launch data.
    Launched(LaunchedData),
    /// Trade data.
    Trade(TradeData),
    /// Migration state change.
    Transition(TransitionData),
    /// Migration completed.
    Migrated(MigratedData),
    /// Migration handoff failed.
    MigrationFailed(MigrationFailedData),
}

/// Data for pool launched event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchedData {
    /// Coin type.
    pub coin_type: String,
    /// Quote type.
    pub quote_type: String,
    /// Curve parameters.
    pub params: LaunchParams,
}

/// Data for trade event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeData {
    /// Trade digest.
    pub digest: String,
    /// Buy or sell.
    pub kind: TradeDirection,
    /// Trader address.
    pub trader: String,
    /// Coin amount.
    pub coin_amount: u64,
    /// Quote amount.
    pub quote_amount: u64,
}

/// Data for a migration state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionData {
    /// Previous state.
    pub from: MigrationState,
    /// New state.
    pub to: MigrationState,
    /// Real quote reserve after the trade.
    pub quote_balance: u64,
}

/// Data for migrated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigratedData {
    /// Coins handed off.
    pub coin_amount: u64,
    /// Quote handed off.
    pub quote_amount: u64,
    /// Reference returned by the liquidity venue.
    pub external_ref: String,
}

/// Data for a failed migration attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationFailedData {
    /// Failure reason.
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_event_creation() {
        let event = PoolEvent::new(
            PoolEventType::Traded,
            PoolId::new(),
            EventData::Trade(TradeData {
                digest: "00".into(),
                kind: TradeDirection::Buy,
                trader: "0xabc".into(),
                coin_amount: 1_000,
                quote_amount: 10,
            }),
        );

        assert_eq!(event.event_type, PoolEventType::Traded);
        assert!(!event.id.is_empty());
    }
}
