//! Background sweep that migrates pools once they reach their target.

use super::CircuitBreaker;
use crate::error::TradeError;
use crate::executor::TradeExecutor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Pools migrated in this sweep.
    pub migrated: usize,
    /// Pools whose migration failed.
    pub failed: usize,
    /// Whether the circuit breaker skipped the sweep.
    pub skipped: bool,
}

/// Periodically calls [`TradeExecutor::migrate`] on every migratable pool.
pub struct MigrationWorker {
    executor: TradeExecutor,
    circuit_breaker: Arc<CircuitBreaker>,
    interval: Duration,
    running: AtomicBool,
}

impl MigrationWorker {
    /// Creates a worker configured from the executor's settings.
    pub fn new(executor: TradeExecutor) -> Self {
        let config = executor.config().clone();
        Self {
            executor,
            circuit_breaker: Arc::new(CircuitBreaker::new(config.circuit_breaker)),
            interval: Duration::from_secs(config.migration_sweep_interval_secs.max(1)),
            running: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn circuit_breaker(&self) -> Arc<CircuitBreaker> {
        self.circuit_breaker.clone()
    }

    /// Runs sweeps until [`MigrationWorker::stop`] is called.
    pub async fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        let mut ticker = interval(self.interval);

        info!(
            interval_secs = self.interval.as_secs(),
            "Starting migration worker"
        );

        while self.running.load(Ordering::SeqCst) {
            ticker.tick().await;
            let report = self.sweep().await;
            if report.migrated > 0 || report.failed > 0 {
                info!(
                    migrated = report.migrated,
                    failed = report.failed,
                    "Migration sweep finished"
                );
            }
        }

        info!("Migration worker stopped");
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Migrates every currently migratable pool once.
    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let candidates = self.executor.migratable_pools().await;
        debug!(candidates = candidates.len(), "Sweeping for migratable pools");

        for pool_id in candidates {
            if !self.circuit_breaker.is_allowed().await {
                warn!("Circuit breaker open, skipping migration sweep");
                report.skipped = true;
                break;
            }

            match self.executor.migrate(pool_id).await {
                Ok(_) => {
                    report.migrated += 1;
                    self.circuit_breaker.record_success().await;
                }
                // A sell took the pool back under its target before we got to it.
                Err(TradeError::Curve(e)) if !e.is_fatal() => {
                    debug!(pool_id = %pool_id, reason = %e, "Pool no longer migratable");
                }
                Err(e) if e.is_retryable() => {
                    report.failed += 1;
                    self.circuit_breaker.record_failure().await;
                }
                Err(e) => {
                    report.failed += 1;
                    error!(pool_id = %pool_id, error = %e, "Migration failed");
                }
            }
        }

        report
    }
}
