use crate::entities::pool::PoolId;
use crate::enums::TradeDirection;
use crate::error::CurveError;
use crate::math::constant_product::calculate_spot_price;
use crate::quote::Quote;
use crate::value_objects::Price;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Immutable record of one accepted trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Transaction identifier: zero-padded hex sequence followed by a nonce,
    /// so lexical order follows booking order within a pool.
    pub digest: String,
    pub pool_id: PoolId,
    /// Position of this trade in the pool's log, starting at zero.
    pub sequence: u64,
    pub kind: TradeDirection,
    pub trader_address: String,
    pub coin_amount: u64,
    pub quote_amount: u64,
    /// Execution price in quote units per coin unit.
    pub price_at_trade: Price,
    pub timestamp_ms: i64,
}

impl TradeRecord {
    /// Builds the record for an accepted quote.
    ///
    /// # Errors
    /// Returns an arithmetic error if the execution price cannot be
    /// represented.
    pub fn from_quote(
        pool_id: PoolId,
        sequence: u64,
        quote: &Quote,
        trader_address: impl Into<String>,
        timestamp_ms: i64,
        nonce: Uuid,
    ) -> Result<Self, CurveError> {
        let (coin_amount, quote_amount) = match quote.direction {
            TradeDirection::Buy => (quote.amount_out, quote.amount_in),
            TradeDirection::Sell => (quote.amount_in, quote.amount_out),
        };
        let price_at_trade = Price::new(calculate_spot_price(
            quote_amount as u128,
            coin_amount as u128,
        )?);
        Ok(Self {
            digest: Self::digest_for(sequence, nonce),
            pool_id,
            sequence,
            kind: quote.direction,
            trader_address: trader_address.into(),
            coin_amount,
            quote_amount,
            price_at_trade,
            timestamp_ms,
        })
    }

    #[must_use]
    pub fn digest_for(sequence: u64, nonce: Uuid) -> String {
        format!("{:016x}{}", sequence, nonce.simple())
    }

    /// `(timestamp_ms, digest)`.
    #[must_use]
    pub fn ordering_key(&self) -> (i64, &str) {
        (self.timestamp_ms, self.digest.as_str())
    }
}

impl PartialOrd for TradeRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TradeRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordering_key()
            .cmp(&other.ordering_key())
            .then_with(|| self.pool_id.cmp(&other.pool_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn buy_quote() -> Quote {
        Quote {
            direction: TradeDirection::Buy,
            amount_in: 1_000,
            amount_out: 4_000,
            price_impact_bps: 0,
            coin_balance_after: 10_000,
            quote_balance_after: 1_000,
            effective_quote_after: 2_000,
        }
    }

    #[test]
    fn test_from_quote_buy() {
        let pool = PoolId::new();
        let rec =
            TradeRecord::from_quote(pool, 3, &buy_quote(), "0xtrader", 1_700, Uuid::nil()).unwrap();
        assert_eq!(rec.kind, TradeDirection::Buy);
        assert_eq!(rec.coin_amount, 4_000);
        assert_eq!(rec.quote_amount, 1_000);
        assert_eq!(rec.price_at_trade.value, dec!(0.25));
        assert!(rec.digest.starts_with("0000000000000003"));
    }

    #[test]
    fn test_ordering_follows_sequence_within_same_ms() {
        let pool = PoolId::new();
        let q = buy_quote();
        let a = TradeRecord::from_quote(pool, 9, &q, "a", 10, Uuid::new_v4()).unwrap();
        let b = TradeRecord::from_quote(pool, 10, &q, "b", 10, Uuid::new_v4()).unwrap();
        assert!(a < b);
        let c = TradeRecord::from_quote(pool, 11, &q, "c", 9, Uuid::new_v4()).unwrap();
        assert!(c < a);
    }
}
