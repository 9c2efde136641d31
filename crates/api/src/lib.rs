//! REST API server and endpoints.
//!
//! This crate exposes the launch pool engine over HTTP:
//! - Pool launch, listing and market views
//! - Quotes and trade execution
//! - Migration status and triggering
//! - Lifecycle event history

/// Error types.
pub mod error;
/// Request handlers.
pub mod handlers;
/// API request/response models.
pub mod models;
/// Route definitions.
pub mod routes;
/// Server configuration and startup.
pub mod server;
/// Application state.
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use server::{ApiServer, ServerConfig};
pub use state::AppState;
