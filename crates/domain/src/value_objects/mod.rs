pub mod amount;
pub mod percentage;
pub mod price;

pub use amount::Amount;
pub use percentage::Percentage;
pub use price::Price;

use serde::{Deserialize, Serialize};

/// Display-only market figures derived from a pool snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketView {
    /// Quote units per coin unit at the current reserves.
    pub spot_price: Price,
    /// Spot price times total supply, in quote smallest units.
    pub market_cap: rust_decimal::Decimal,
    /// Real quote reserve relative to the migration target.
    pub bonding_curve_progress: Percentage,
    /// Coins held outside the pool.
    pub circulating_supply: u64,
}
