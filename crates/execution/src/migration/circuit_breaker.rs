//! Circuit breaker guarding the external liquidity venue.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{error, info};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Handoffs allowed.
    Closed,
    /// Handoffs blocked.
    Open,
    /// Probing whether the venue recovered.
    HalfOpen,
}

/// Configuration for the circuit breaker.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Maximum consecutive failures before opening circuit.
    pub max_failures: u32,
    /// Time to wait before attempting recovery in seconds.
    pub recovery_timeout_secs: u64,
    /// Number of successful operations to close circuit.
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            max_failures: 3,
            recovery_timeout_secs: 60,
            success_threshold: 1,
        }
    }
}

#[derive(Debug)]
struct Breaker {
    state: CircuitState,
    /// Consecutive handoff failures while closed.
    failures: u32,
    /// Consecutive successes while half-open.
    successes: u32,
    opened_at: Option<Instant>,
}

/// Stops the migration worker from hammering a venue that keeps failing.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<Breaker>,
}

impl CircuitBreaker {
    /// Creates a new circuit breaker.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Breaker {
                state: CircuitState::Closed,
                failures: 0,
                successes: 0,
                opened_at: None,
            }),
        }
    }

    /// Checks if a handoff attempt is allowed, moving an open breaker to
    /// half-open once the recovery timeout elapsed.
    pub async fn is_allowed(&self) -> bool {
        let mut breaker = self.inner.lock().await;
        match breaker.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let cooled = breaker.opened_at.is_none_or(|at| {
                    at.elapsed() >= Duration::from_secs(self.config.recovery_timeout_secs)
                });
                if cooled {
                    Self::transition(&mut breaker, CircuitState::HalfOpen);
                }
                cooled
            }
        }
    }

    /// Records a successful handoff.
    pub async fn record_success(&self) {
        let mut breaker = self.inner.lock().await;
        breaker.failures = 0;
        if breaker.state == CircuitState::HalfOpen {
            breaker.successes += 1;
            if breaker.successes >= self.config.success_threshold {
                Self::transition(&mut breaker, CircuitState::Closed);
                info!("Venue recovered, resuming migrations");
            }
        }
    }

    /// Records a failed handoff.
    pub async fn record_failure(&self) {
        let mut breaker = self.inner.lock().await;
        breaker.successes = 0;
        match breaker.state {
            CircuitState::Closed => {
                breaker.failures += 1;
                if breaker.failures >= self.config.max_failures {
                    self.trip(&mut breaker, "consecutive handoff failures");
                }
            }
            CircuitState::HalfOpen => self.trip(&mut breaker, "handoff failed during recovery"),
            CircuitState::Open => {}
        }
    }

    fn trip(&self, breaker: &mut Breaker, reason: &str) {
        error!(
            reason,
            recovery_timeout_secs = self.config.recovery_timeout_secs,
            "Circuit breaker tripped, pausing migrations"
        );
        Self::transition(breaker, CircuitState::Open);
        breaker.opened_at = Some(Instant::now());
        breaker.failures = 0;
    }

    fn transition(breaker: &mut Breaker, to: CircuitState) {
        if breaker.state != to {
            info!(from = ?breaker.state, to = ?to, "Circuit breaker state changed");
            breaker.state = to;
            breaker.successes = 0;
        }
    }

    /// Gets the current state.
    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    /// Closes the breaker and clears its counters.
    pub async fn reset(&self) {
        let mut breaker = self.inner.lock().await;
        Self::transition(&mut breaker, CircuitState::Closed);
        breaker.failures = 0;
        breaker.opened_at = None;
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_circuit_breaker_closed() {
        let cb = CircuitBreaker::default();
        assert!(cb.is_allowed().await);
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_circuit_breaker_trips_on_failures() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            max_failures: 2,
            ..Default::default()
        });

        cb.record_failure().await;
        assert!(cb.is_allowed().await);

        cb.record_failure().await;
        assert!(!cb.is_allowed().await);
        assert_eq!(cb.state().await, CircuitState::Open);
    }

    #[tokio::test]
    async fn test_circuit_breaker_recovers() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            max_failures: 1,
            recovery_timeout_secs: 0,
            success_threshold: 1,
        });

        cb.record_failure().await;
        assert!(cb.is_allowed().await);
        assert_eq!(cb.state().await, CircuitState::HalfOpen);

        cb.record_success().await;
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_circuit_breaker_reset() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            max_failures: 1,
            ..Default::default()
        });

        cb.record_failure().await;
        assert!(!cb.is_allowed().await);

        cb.reset().await;
        assert!(cb.is_allowed().await);
    }
}
