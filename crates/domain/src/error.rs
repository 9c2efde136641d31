//! Error types for the bonding-curve core.
//!
//! Every fallible operation in this crate returns [`CurveError`]. Variants are
//! grouped by [`ErrorKind`] so callers can decide how to surface them without
//! matching on each variant.

use crate::enums::MigrationState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad classification of a [`CurveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Caller mistake; never retried automatically.
    Input,
    /// Legitimate pool state that blocks the request.
    State,
    /// Programming error: the quote math and the ledger disagree.
    Invariant,
}

/// Errors raised by the fixed-point math, the quote engine and the curve ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurveError {
    /// The input amount was zero.
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// The trade is so small that its output rounds down to zero.
    #[error("trade output rounds down to zero")]
    ZeroOutput,

    /// The trade would drain the curve or pay out virtual liquidity.
    #[error("insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity {
        /// Amount the trade would take out of the pool.
        requested: u128,
        /// Amount the pool can actually pay.
        available: u128,
    },

    /// A sell of more coins than exist outside the pool.
    #[error("sell of {amount} exceeds circulating supply of {circulating}")]
    ExceedsCirculatingSupply {
        /// Coins offered.
        amount: u64,
        /// Coins held outside the pool.
        circulating: u64,
    },

    /// A buy would push the quote reserve past what a `u64` amount can hold.
    #[error("quote input {amount} exceeds remaining reserve capacity {headroom}")]
    ExceedsReserveCapacity {
        /// Quote the trade would add.
        amount: u128,
        /// Quote the reserve can still take.
        headroom: u64,
    },

    /// The pool has migrated and no longer trades on the curve.
    #[error("pool has migrated")]
    PoolMigrated,

    /// `migrate()` was called on a pool that has not reached its target.
    #[error("pool is not migratable (state: {0})")]
    NotMigratable(MigrationState),

    /// A post-mutation ledger check failed.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// An intermediate or final value left the representable range.
    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(&'static str),

    /// Division with a zero denominator.
    #[error("division by zero")]
    DivisionByZero,

    /// Launch parameters rejected by validation.
    #[error("invalid launch parameters: {0}")]
    InvalidParameters(String),
}

impl CurveError {
    /// Returns the classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroAmount
            | Self::ZeroOutput
            | Self::ExceedsCirculatingSupply { .. }
            | Self::ExceedsReserveCapacity { .. }
            | Self::InvalidParameters(_) => ErrorKind::Input,
            Self::PoolMigrated | Self::NotMigratable(_) | Self::InsufficientLiquidity { .. } => {
                ErrorKind::State
            }
            Self::InvariantViolation(_) | Self::ArithmeticOverflow(_) | Self::DivisionByZero => {
                ErrorKind::Invariant
            }
        }
    }

    /// Whether this error signals a bug rather than a rejected request.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Invariant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(CurveError::ZeroAmount.kind(), ErrorKind::Input);
        assert_eq!(CurveError::PoolMigrated.kind(), ErrorKind::State);
        assert_eq!(
            CurveError::InsufficientLiquidity {
                requested: 10,
                available: 5
            }
            .kind(),
            ErrorKind::State
        );
        assert!(CurveError::ArithmeticOverflow("mul").is_fatal());
        assert!(CurveError::InvariantViolation("x".into()).is_fatal());
        assert!(!CurveError::ZeroOutput.is_fatal());
        assert_eq!(
            CurveError::ExceedsReserveCapacity {
                amount: 2,
                headroom: 1
            }
            .kind(),
            ErrorKind::Input
        );
    }

    #[test]
    fn test_error_display() {
        let err = CurveError::ExceedsCirculatingSupply {
            amount: 7,
            circulating: 3,
        };
        assert_eq!(err.to_string(), "sell of 7 exceeds circulating supply of 3");
    }
}
