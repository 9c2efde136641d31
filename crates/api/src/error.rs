//! API error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use launchpad_domain::{CurveError, ErrorKind};
use launchpad_execution::error::TradeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Whether the same request may succeed later.
    pub retryable: bool,
}

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request.
    #[error("{0}")]
    BadRequest(String),

    /// Executor rejection.
    #[error(transparent)]
    Trade(#[from] TradeError),
}

impl From<CurveError> for ApiError {
    fn from(err: CurveError) -> Self {
        Self::Trade(TradeError::Curve(err))
    }
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Trade(err) => match err {
                TradeError::Curve(e) => match e.kind() {
                    ErrorKind::Input => StatusCode::BAD_REQUEST,
                    ErrorKind::State => StatusCode::CONFLICT,
                    ErrorKind::Invariant => StatusCode::INTERNAL_SERVER_ERROR,
                },
                TradeError::PoolNotFound(_) => StatusCode::NOT_FOUND,
                TradeError::PoolAlreadyExists(_) => StatusCode::CONFLICT,
                TradeError::SlippageExceeded { .. } => StatusCode::BAD_REQUEST,
                TradeError::MigrationInProgress(_)
                | TradeError::Persistence(_)
                | TradeError::Handoff(_) => StatusCode::SERVICE_UNAVAILABLE,
                TradeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Trade(err) => match err {
                TradeError::Curve(e) => match e {
                    CurveError::ZeroAmount => "zero_amount",
                    CurveError::ZeroOutput => "zero_output",
                    CurveError::InsufficientLiquidity { .. } => "insufficient_liquidity",
                    CurveError::ExceedsCirculatingSupply { .. } => "exceeds_circulating_supply",
                    CurveError::ExceedsReserveCapacity { .. } => "exceeds_reserve_capacity",
                    CurveError::PoolMigrated => "pool_migrated",
                    CurveError::NotMigratable(_) => "not_migratable",
                    CurveError::InvariantViolation(_) => "invariant_violation",
                    CurveError::ArithmeticOverflow(_) => "arithmetic_overflow",
                    CurveError::DivisionByZero => "division_by_zero",
                    CurveError::InvalidParameters(_) => "invalid_parameters",
                },
                TradeError::PoolNotFound(_) => "pool_not_found",
                TradeError::PoolAlreadyExists(_) => "pool_already_exists",
                TradeError::SlippageExceeded { .. } => "slippage_exceeded",
                TradeError::MigrationInProgress(_) => "migration_in_progress",
                TradeError::Persistence(_) => "persistence_failure",
                TradeError::Handoff(_) => "handoff_failure",
                TradeError::Internal(_) => "internal_error",
            },
        }
    }

    #[must_use]
    pub fn retryable(&self) -> bool {
        match self {
            Self::BadRequest(_) => false,
            Self::Trade(err) => err.is_retryable(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && !self.retryable() {
            error!(code = self.code(), error = %self, "Request failed");
        }
        let body = ErrorBody {
            error: self.code().to_string(),
            message: self.to_string(),
            retryable: self.retryable(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_domain::{MigrationState, PoolId};

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(CurveError::ZeroAmount).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CurveError::NotMigratable(MigrationState::Bonding)).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(TradeError::PoolNotFound(PoolId::new())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(CurveError::ExceedsReserveCapacity {
                amount: 2,
                headroom: 1
            })
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CurveError::InvariantViolation("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_retryable_is_unavailable() {
        let err = ApiError::from(TradeError::Persistence("db down".into()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.retryable());
        assert_eq!(err.code(), "persistence_failure");
    }
}
