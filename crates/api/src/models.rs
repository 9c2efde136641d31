//! API request/response models.
//!
//! Amounts travel as strings of smallest units so JavaScript clients never
//! round them.

use chrono::{DateTime, Utc};
use launchpad_domain::{
    LaunchParams, MigrationAck, MigrationState, MigrationStatus, Pool, PoolId, Quote,
    TradeDirection, TradeRecord,
};
use launchpad_execution::lifecycle::{
    AggregateStats, EventData, PoolActivity, PoolEvent, PoolEventType,
};
use launchpad_execution::prelude::PoolSummary;
use serde::{Deserialize, Serialize};

/// Serde adapter for `u64` amounts encoded as decimal strings.
///
/// Deserialization also accepts plain JSON numbers.
pub mod amount_str {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
            Raw::Number(n) => Ok(n),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` when the server answers.
    pub status: String,
    /// Number of registered pools.
    pub pools: usize,
}

/// Curve parameters of a launch request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchParamsBody {
    #[serde(with = "amount_str")]
    pub total_supply: u64,
    #[serde(with = "amount_str")]
    pub virtual_liquidity: u64,
    #[serde(with = "amount_str")]
    pub target_quote_liquidity: u64,
    pub decimals: u8,
}

impl From<LaunchParamsBody> for LaunchParams {
    fn from(body: LaunchParamsBody) -> Self {
        Self {
            total_supply: body.total_supply,
            virtual_liquidity: body.virtual_liquidity,
            target_quote_liquidity: body.target_quote_liquidity,
            decimals: body.decimals,
        }
    }
}

/// `POST /pools` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchPoolRequest {
    pub coin_type: String,
    pub quote_type: String,
    /// Server defaults apply when absent.
    #[serde(default)]
    pub params: Option<LaunchParamsBody>,
}

/// Derived display figures.
#[derive(Debug, Serialize, Deserialize)]
pub struct MarketResponse {
    pub spot_price: String,
    pub market_cap: String,
    /// Percentage of the migration target reached.
    pub bonding_curve_progress: String,
    #[serde(with = "amount_str")]
    pub circulating_supply: u64,
}

/// Full pool snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct PoolResponse {
    pub id: PoolId,
    pub coin_type: String,
    pub quote_type: String,
    pub decimals: u8,
    #[serde(with = "amount_str")]
    pub coin_balance: u64,
    #[serde(with = "amount_str")]
    pub quote_balance: u64,
    #[serde(with = "amount_str")]
    pub virtual_liquidity: u64,
    #[serde(with = "amount_str")]
    pub target_quote_liquidity: u64,
    #[serde(with = "amount_str")]
    pub total_supply: u64,
    pub state: MigrationState,
    pub can_migrate: bool,
    pub migrated: bool,
    pub trade_count: u64,
    pub created_at: DateTime<Utc>,
    pub last_trade_at: Option<DateTime<Utc>>,
    pub market: MarketResponse,
}

impl PoolResponse {
    /// Builds the response, computing the market view.
    ///
    /// # Errors
    /// Fails if the market figures overflow.
    pub fn from_pool(pool: &Pool) -> Result<Self, launchpad_domain::CurveError> {
        let market = pool.market_view()?;
        Ok(Self {
            id: pool.id,
            coin_type: pool.coin_type.clone(),
            quote_type: pool.quote_type.clone(),
            decimals: pool.decimals,
            coin_balance: pool.curve.coin_balance,
            quote_balance: pool.curve.quote_balance,
            virtual_liquidity: pool.curve.virtual_liquidity,
            target_quote_liquidity: pool.curve.target_quote_liquidity,
            total_supply: pool.curve.total_supply,
            state: pool.state(),
            can_migrate: pool.can_migrate(),
            migrated: pool.migrated(),
            trade_count: pool.trade_count,
            created_at: pool.created_at,
            last_trade_at: pool.last_trade_at,
            market: MarketResponse {
                spot_price: market.spot_price.value.normalize().to_string(),
                market_cap: market.market_cap.normalize().to_string(),
                bonding_curve_progress: market.bonding_curve_progress.0.normalize().to_string(),
                circulating_supply: market.circulating_supply,
            },
        })
    }
}

/// Row of `GET /pools`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PoolSummaryResponse {
    pub id: PoolId,
    pub coin_type: String,
    pub quote_type: String,
    pub state: MigrationState,
    pub bonding_curve_progress: String,
    #[serde(with = "amount_str")]
    pub quote_balance: u64,
    pub trade_count: u64,
    pub created_at: DateTime<Utc>,
}

impl From<PoolSummary> for PoolSummaryResponse {
    fn from(summary: PoolSummary) -> Self {
        Self {
            id: summary.id,
            coin_type: summary.coin_type,
            quote_type: summary.quote_type,
            state: summary.state,
            bonding_curve_progress: summary.bonding_curve_progress.0.normalize().to_string(),
            quote_balance: summary.quote_balance,
            trade_count: summary.trade_count,
            created_at: summary.created_at,
        }
    }
}

/// `GET /pools/{id}/quote` query.
#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub direction: TradeDirection,
    pub amount: u64,
}

/// `GET /pools/{id}/quote/buy-exact-out` query.
#[derive(Debug, Deserialize)]
pub struct ExactOutQuery {
    pub coin_out: u64,
}

/// Quote result.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub direction: TradeDirection,
    #[serde(with = "amount_str")]
    pub amount_in: u64,
    #[serde(with = "amount_str")]
    pub amount_out: u64,
    pub price_impact_bps: u64,
    #[serde(with = "amount_str")]
    pub coin_balance_after: u64,
    #[serde(with = "amount_str")]
    pub quote_balance_after: u64,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self {
            direction: quote.direction,
            amount_in: quote.amount_in,
            amount_out: quote.amount_out,
            price_impact_bps: quote.price_impact_bps,
            coin_balance_after: quote.coin_balance_after,
            quote_balance_after: quote.quote_balance_after,
        }
    }
}

/// `POST /pools/{id}/trades` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRequestBody {
    pub direction: TradeDirection,
    #[serde(with = "amount_str")]
    pub amount_in: u64,
    #[serde(with = "amount_str", default)]
    pub min_amount_out: u64,
    pub trader: String,
}

/// A booked trade.
#[derive(Debug, Serialize, Deserialize)]
pub struct TradeResponse {
    pub digest: String,
    pub pool_id: PoolId,
    pub sequence: u64,
    pub kind: TradeDirection,
    pub trader_address: String,
    #[serde(with = "amount_str")]
    pub coin_amount: u64,
    #[serde(with = "amount_str")]
    pub quote_amount: u64,
    pub price_at_trade: String,
    pub timestamp_ms: i64,
}

impl From<TradeRecord> for TradeResponse {
    fn from(trade: TradeRecord) -> Self {
        Self {
            digest: trade.digest,
            pool_id: trade.pool_id,
            sequence: trade.sequence,
            kind: trade.kind,
            trader_address: trade.trader_address,
            coin_amount: trade.coin_amount,
            quote_amount: trade.quote_amount,
            price_at_trade: trade.price_at_trade.value.normalize().to_string(),
            timestamp_ms: trade.timestamp_ms,
        }
    }
}

/// Terminal migration acknowledgment.
#[derive(Debug, Serialize, Deserialize)]
pub struct MigrationAckResponse {
    pub pool_id: PoolId,
    #[serde(with = "amount_str")]
    pub coin_amount: u64,
    #[serde(with = "amount_str")]
    pub quote_amount: u64,
    pub external_ref: String,
    pub migrated_at: DateTime<Utc>,
}

impl From<MigrationAck> for MigrationAckResponse {
    fn from(ack: MigrationAck) -> Self {
        Self {
            pool_id: ack.pool_id,
            coin_amount: ack.coin_amount,
            quote_amount: ack.quote_amount,
            external_ref: ack.external_ref,
            migrated_at: ack.migrated_at,
        }
    }
}

/// `GET /pools/{id}/migration`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MigrationStatusResponse {
    pub pool_id: PoolId,
    pub state: MigrationState,
    #[serde(with = "amount_str")]
    pub quote_balance: u64,
    #[serde(with = "amount_str")]
    pub target_quote_liquidity: u64,
    pub ack: Option<MigrationAckResponse>,
}

impl From<MigrationStatus> for MigrationStatusResponse {
    fn from(status: MigrationStatus) -> Self {
        Self {
            pool_id: status.pool_id,
            state: status.state,
            quote_balance: status.quote_balance,
            target_quote_liquidity: status.target_quote_liquidity,
            ack: status.ack.map(Into::into),
        }
    }
}

/// A lifecycle event.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
    pub id: String,
    pub event_type: PoolEventType,
    pub timestamp: DateTime<Utc>,
    /// Event fields, amounts as strings.
    pub details: serde_json::Value,
}

impl From<PoolEvent> for EventResponse {
    fn from(event: PoolEvent) -> Self {
        let details = match event.data {
            EventData::Launched(d) => serde_json::json!({
                "coin_type": d.coin_type,
                "quote_type": d.quote_type,
                "total_supply": d.params.total_supply.to_string(),
                "virtual_liquidity": d.params.virtual_liquidity.to_string(),
                "target_quote_liquidity": d.params.target_quote_liquidity.to_string(),
            }),
            EventData::Trade(d) => serde_json::json!({
                "digest": d.digest,
                "kind": d.kind,
                "trader": d.trader,
                "coin_amount": d.coin_amount.to_string(),
                "quote_amount": d.quote_amount.to_string(),
            }),
            EventData::Transition(d) => serde_json::json!({
                "from": d.from,
                "to": d.to,
                "quote_balance": d.quote_balance.to_string(),
            }),
            EventData::Migrated(d) => serde_json::json!({
                "coin_amount": d.coin_amount.to_string(),
                "quote_amount": d.quote_amount.to_string(),
                "external_ref": d.external_ref,
            }),
            EventData::MigrationFailed(d) => serde_json::json!({ "reason": d.reason }),
        };
        Self {
            id: event.id,
            event_type: event.event_type,
            timestamp: event.timestamp,
            details,
        }
    }
}

/// `GET /pools/{id}/activity`. Volumes are strings of quote units.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub pool_id: PoolId,
    pub launched_at: DateTime<Utc>,
    pub migrated_at: Option<DateTime<Utc>>,
    pub buy_count: u64,
    pub sell_count: u64,
    pub buy_volume_quote: String,
    pub sell_volume_quote: String,
    pub unique_traders: usize,
    pub migration_failures: u32,
}

impl From<PoolActivity> for ActivityResponse {
    fn from(activity: PoolActivity) -> Self {
        Self {
            pool_id: activity.pool,
            launched_at: activity.launched_at,
            migrated_at: activity.migrated_at,
            buy_count: activity.buy_count,
            sell_count: activity.sell_count,
            buy_volume_quote: activity.buy_volume_quote.to_string(),
            sell_volume_quote: activity.sell_volume_quote.to_string(),
            unique_traders: activity.unique_traders,
            migration_failures: activity.migration_failures,
        }
    }
}

/// `GET /stats`
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_pools: u32,
    pub migrated_pools: u32,
    pub total_trades: u64,
    pub total_buy_volume_quote: String,
    pub total_sell_volume_quote: String,
    pub migration_failures: u32,
}

impl From<AggregateStats> for StatsResponse {
    fn from(stats: AggregateStats) -> Self {
        Self {
            total_pools: stats.total_pools,
            migrated_pools: stats.migrated_pools,
            total_trades: stats.total_trades,
            total_buy_volume_quote: stats.total_buy_volume_quote.to_string(),
            total_sell_volume_quote: stats.total_sell_volume_quote.to_string(),
            migration_failures: stats.migration_failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amounts_are_strings() {
        let body = TradeRequestBody {
            direction: TradeDirection::Buy,
            amount_in: u64::MAX,
            min_amount_out: 0,
            trader: "0xabc".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["amount_in"], "18446744073709551615");
        assert_eq!(json["direction"], "buy");
    }

    #[test]
    fn test_amounts_accept_numbers_and_default() {
        let body: TradeRequestBody = serde_json::from_str(
            r#"{"direction":"sell","amount_in":1000,"trader":"0xabc"}"#,
        )
        .unwrap();
        assert_eq!(body.amount_in, 1000);
        assert_eq!(body.min_amount_out, 0);

        let bad = serde_json::from_str::<TradeRequestBody>(
            r#"{"direction":"sell","amount_in":"-1","trader":"0xabc"}"#,
        );
        assert!(bad.is_err());
    }
}
