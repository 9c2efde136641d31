//! Domain model of the bonding-curve launch pool.
//!
//! Pure, synchronous building blocks shared by the execution, data and API
//! crates:
//! - Fixed-point math with wide intermediates ([`math`])
//! - The reserve ledger and pool aggregate ([`entities`])
//! - Side-effect free pricing ([`quote`])
//! - The migration state machine ([`migration`])
//! - Launch parameters ([`params`]) and display value objects ([`value_objects`])

pub mod entities;
pub mod enums;
pub mod error;
pub mod math;
pub mod migration;
pub mod params;
pub mod quote;
pub mod value_objects;

pub use entities::{CurveState, Pool, PoolId, TradeRecord};
pub use enums::{MigrationState, TradeDirection};
pub use error::{CurveError, ErrorKind};
pub use migration::{
    MigrationAck, MigrationGate, MigrationSnapshot, MigrationStatus, MigrationStep, Transition,
};
pub use params::LaunchParams;
pub use quote::{Quote, QuoteEngine, apply_quote};
