//! Executor configuration.

use crate::lifecycle::DEFAULT_EVENT_LIMIT;
use crate::migration::CircuitBreakerConfig;
use launchpad_domain::LaunchParams;
use std::env;
use std::str::FromStr;
use tracing::warn;

/// Configuration for [`TradeExecutor`](crate::executor::TradeExecutor) and
/// its migration worker.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Parameters used when a launch request does not carry its own.
    pub launch: LaunchParams,
    /// Seconds between migration sweeps.
    pub migration_sweep_interval_secs: u64,
    /// Circuit breaker guarding the liquidity handoff.
    pub circuit_breaker: CircuitBreakerConfig,
    /// Lifecycle events kept per pool.
    pub event_history_limit: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            launch: LaunchParams::default(),
            migration_sweep_interval_secs: 30,
            circuit_breaker: CircuitBreakerConfig::default(),
            event_history_limit: DEFAULT_EVENT_LIMIT,
        }
    }
}

impl ExecutorConfig {
    /// Reads overrides from `LAUNCHPAD_*` environment variables.
    ///
    /// Unset variables keep their defaults; unparsable ones are logged and
    /// ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            launch: LaunchParams {
                total_supply: env_or("LAUNCHPAD_TOTAL_SUPPLY", defaults.launch.total_supply),
                virtual_liquidity: env_or(
                    "LAUNCHPAD_VIRTUAL_LIQUIDITY",
                    defaults.launch.virtual_liquidity,
                ),
                target_quote_liquidity: env_or(
                    "LAUNCHPAD_TARGET_QUOTE_LIQUIDITY",
                    defaults.launch.target_quote_liquidity,
                ),
                decimals: env_or("LAUNCHPAD_DECIMALS", defaults.launch.decimals),
            },
            migration_sweep_interval_secs: env_or(
                "LAUNCHPAD_MIGRATION_SWEEP_SECS",
                defaults.migration_sweep_interval_secs,
            ),
            circuit_breaker: CircuitBreakerConfig {
                max_failures: env_or(
                    "LAUNCHPAD_HANDOFF_MAX_FAILURES",
                    defaults.circuit_breaker.max_failures,
                ),
                recovery_timeout_secs: env_or(
                    "LAUNCHPAD_HANDOFF_RECOVERY_SECS",
                    defaults.circuit_breaker.recovery_timeout_secs,
                ),
                success_threshold: defaults.circuit_breaker.success_threshold,
            },
            event_history_limit: env_or(
                "LAUNCHPAD_EVENT_HISTORY_LIMIT",
                defaults.event_history_limit,
            ),
        }
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                warn!(key, value = %raw, error = %e, "Invalid config value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_parses_and_falls_back() {
        // Unique keys so parallel tests do not race on the same variable.
        unsafe {
            env::set_var("LAUNCHPAD_TEST_ENV_OR_OK", "42");
            env::set_var("LAUNCHPAD_TEST_ENV_OR_BAD", "forty-two");
        }
        assert_eq!(env_or("LAUNCHPAD_TEST_ENV_OR_OK", 7u64), 42);
        assert_eq!(env_or("LAUNCHPAD_TEST_ENV_OR_BAD", 7u64), 7);
        assert_eq!(env_or("LAUNCHPAD_TEST_ENV_OR_MISSING", 7u64), 7);
    }

    #[test]
    fn test_default_launch_params() {
        let config = ExecutorConfig::default();
        assert_eq!(config.launch, LaunchParams::default());
        assert!(config.migration_sweep_interval_secs > 0);
    }
}
