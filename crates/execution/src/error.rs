//! Errors surfaced by the trade executor.

use launchpad_domain::{CurveError, ErrorKind, PoolId};
use thiserror::Error;

/// Failure reported by a [`PoolStore`](crate::store::PoolStore).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure reported by a [`LiquidityHandoff`](crate::migration::LiquidityHandoff).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct HandoffError(pub String);

impl HandoffError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors returned by [`TradeExecutor`](crate::executor::TradeExecutor).
#[derive(Debug, Clone, Error)]
pub enum TradeError {
    /// Rejected by the curve math or ledger.
    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error("pool {0} not found")]
    PoolNotFound(PoolId),

    #[error("pool {0} already exists")]
    PoolAlreadyExists(PoolId),

    /// Output below the caller's minimum.
    #[error("slippage exceeded: expected at least {expected_min}, got {actual}")]
    SlippageExceeded {
        /// Caller's `min_amount_out`.
        expected_min: u64,
        /// Output the curve would pay.
        actual: u64,
    },

    /// A migration handoff holds the pool's reserves.
    #[error("migration of pool {0} in progress")]
    MigrationInProgress(PoolId),

    /// The store rejected the write; nothing was committed.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// The external liquidity venue rejected the handoff.
    #[error("liquidity handoff failed: {0}")]
    Handoff(String),

    /// A background task failed to complete.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TradeError {
    /// Whether the same request may succeed if retried unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Persistence(_) | Self::Handoff(_) | Self::MigrationInProgress(_)
        )
    }

    /// Whether this error signals a bug rather than a rejected request.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Curve(e) => e.kind() == ErrorKind::Invariant,
            Self::Internal(_) => true,
            _ => false,
        }
    }
}

impl From<StoreError> for TradeError {
    fn from(err: StoreError) -> Self {
        Self::Persistence(err.0)
    }
}

impl From<HandoffError> for TradeError {
    fn from(err: HandoffError) -> Self {
        Self::Handoff(err.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TradeError::Persistence("db down".into()).is_retryable());
        assert!(TradeError::Handoff("venue down".into()).is_retryable());
        assert!(TradeError::MigrationInProgress(PoolId::new()).is_retryable());
        assert!(
            !TradeError::SlippageExceeded {
                expected_min: 2,
                actual: 1
            }
            .is_retryable()
        );
        assert!(!TradeError::from(CurveError::PoolMigrated).is_retryable());
    }

    #[test]
    fn test_fatal_classification() {
        assert!(TradeError::from(CurveError::InvariantViolation("x".into())).is_fatal());
        assert!(TradeError::from(CurveError::ArithmeticOverflow("y")).is_fatal());
        assert!(!TradeError::from(CurveError::ZeroAmount).is_fatal());
    }

    #[test]
    fn test_store_error_conversion() {
        let err: TradeError = StoreError::new("timeout").into();
        assert!(matches!(err, TradeError::Persistence(ref m) if m == "timeout"));
    }
}
