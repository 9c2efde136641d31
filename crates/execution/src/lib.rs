//! Trade execution engine for bonding-curve launch pools.
//!
//! This crate owns the mutable side of the engine:
//! - Pool registry with one exclusive lock per pool
//! - Trade execution with slippage checks and all-or-nothing commits
//! - Persistence boundary for pools and trade logs
//! - Two-phase migration to external liquidity
//! - Pool lifecycle tracking

/// Prelude module for convenient imports.
pub mod prelude;

/// Executor configuration.
pub mod config;
/// Error types.
pub mod error;
/// Trade executor.
pub mod executor;
/// Pool lifecycle tracking.
pub mod lifecycle;
/// Migration handoff, worker and circuit breaker.
pub mod migration;
/// Persistence boundary.
pub mod store;

mod registry;
