//! Pool lifecycle tracking.
//!
//! Tracks the complete lifecycle of launch pools:
//! - Launch
//! - Trades
//! - Migration state changes
//! - Migration handoff outcomes

mod events;
mod tracker;

pub use events::*;
pub use tracker::*;
