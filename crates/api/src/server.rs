//! Server configuration and startup.

use crate::routes::create_router;
use crate::state::AppState;
use launchpad_execution::prelude::TradeExecutor;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Reads `LAUNCHPAD_HOST` and `LAUNCHPAD_PORT`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = env::var("LAUNCHPAD_HOST").unwrap_or(defaults.host);
        let port = match env::var("LAUNCHPAD_PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Invalid LAUNCHPAD_PORT, using default");
                defaults.port
            }),
            Err(_) => defaults.port,
        };
        Self { host, port }
    }

    /// `host:port` string.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// HTTP front end of the pool engine.
pub struct ApiServer {
    config: ServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Creates a server around an executor.
    #[must_use]
    pub fn new(config: ServerConfig, executor: TradeExecutor) -> Self {
        Self {
            config,
            state: AppState::new(executor),
        }
    }

    /// Serves until ctrl-c.
    ///
    /// # Errors
    /// Returns an error if the address cannot be bound or serving fails.
    pub async fn run(self) -> std::io::Result<()> {
        let addr: SocketAddr = self
            .config
            .address()
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let listener = TcpListener::bind(addr).await?;
        info!(address = %addr, "API server listening");

        axum::serve(listener, create_router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_address() {
        assert_eq!(ServerConfig::default().address(), "0.0.0.0:8080");
    }
}
