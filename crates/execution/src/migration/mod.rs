//! Migration to external liquidity.
//!
//! - [`LiquidityHandoff`]: boundary to the venue that receives the reserves
//! - [`MigrationWorker`]: scheduler that migrates pools reaching their target
//! - [`CircuitBreaker`]: pauses the worker while the venue keeps failing

mod circuit_breaker;
mod handoff;
mod worker;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use handoff::{HandoffReceipt, LiquidityHandoff, SimulatedHandoff};
pub use worker::{MigrationWorker, SweepReport};
