pub mod curve_state;
pub mod pool;
pub mod trade;

// Re-export for easier access
pub use curve_state::CurveState;
pub use pool::{Pool, PoolId};
pub use trade::TradeRecord;
