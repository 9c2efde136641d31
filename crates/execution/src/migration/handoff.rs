//! External liquidity provisioning.

use crate::error::HandoffError;
use async_trait::async_trait;
use launchpad_domain::MigrationSnapshot;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Acknowledgment from the external venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffReceipt {
    /// Venue-side identifier of the provisioned liquidity.
    pub external_ref: String,
}

/// Hands a migrating pool's real reserves to an external venue.
///
/// Called at most once per successful migration; a failed call leaves the
/// pool migratable and may be retried.
#[async_trait]
pub trait LiquidityHandoff: Send + Sync {
    async fn provision(&self, snapshot: &MigrationSnapshot) -> Result<HandoffReceipt, HandoffError>;
}

/// Handoff that accepts every snapshot without leaving the process.
#[derive(Debug, Clone, Default)]
pub struct SimulatedHandoff {
    venue: String,
}

impl SimulatedHandoff {
    #[must_use]
    pub fn new(venue: impl Into<String>) -> Self {
        Self {
            venue: venue.into(),
        }
    }
}

#[async_trait]
impl LiquidityHandoff for SimulatedHandoff {
    async fn provision(
        &self,
        snapshot: &MigrationSnapshot,
    ) -> Result<HandoffReceipt, HandoffError> {
        let venue = if self.venue.is_empty() {
            "simulated"
        } else {
            self.venue.as_str()
        };
        info!(
            pool_id = %snapshot.pool_id,
            coin_amount = snapshot.coin_amount,
            quote_amount = snapshot.quote_amount,
            venue,
            "Provisioning external liquidity"
        );
        Ok(HandoffReceipt {
            external_ref: format!("{venue}:{}", snapshot.pool_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_domain::PoolId;

    #[tokio::test]
    async fn test_simulated_handoff() {
        let pool_id = PoolId::new();
        let receipt = SimulatedHandoff::new("dex")
            .provision(&MigrationSnapshot {
                pool_id,
                coin_amount: 10,
                quote_amount: 20,
            })
            .await
            .unwrap();
        assert_eq!(receipt.external_ref, format!("dex:{pool_id}"));
    }
}
