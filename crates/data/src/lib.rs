//! PostgreSQL persistence for launch pools.
//!
//! This crate provides:
//! - Repositories for the `launch_pools` and `pool_trades` tables
//! - [`PgPoolStore`], the transactional implementation of the executor's
//!   `PoolStore` boundary

/// Repository implementations.
pub mod repositories;
/// Executor store backed by PostgreSQL.
pub mod store;

pub use repositories::Database;
pub use store::PgPoolStore;
