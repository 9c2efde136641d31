//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use launchpad_execution::prelude::*;
//! ```

// Config
pub use crate::config::ExecutorConfig;

// Errors
pub use crate::error::{HandoffError, StoreError, TradeError};

// Executor
pub use crate::executor::{PoolSummary, TradeExecutor, TradeRequest};

// Lifecycle
pub use crate::lifecycle::{
    AggregateStats, EventData, LifecycleTracker, PoolActivity, PoolEvent, PoolEventType,
};

// Migration
pub use crate::migration::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, HandoffReceipt, LiquidityHandoff,
    MigrationWorker, SimulatedHandoff, SweepReport,
};

// Store
pub use crate::store::{InMemoryPoolStore, PoolStore};
