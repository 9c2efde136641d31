//! Shared application state.

use launchpad_execution::prelude::TradeExecutor;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The pool engine.
    pub executor: TradeExecutor,
}

impl AppState {
    /// Creates the state around an executor.
    #[must_use]
    pub fn new(executor: TradeExecutor) -> Self {
        Self { executor }
    }
}
