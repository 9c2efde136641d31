//! Route definitions.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        .route(
            "/pools",
            get(handlers::list_pools).post(handlers::launch_pool),
        )
        .route("/pools/{id}", get(handlers::get_pool))
        .route("/pools/{id}/quote", get(handlers::get_quote))
        .route(
            "/pools/{id}/quote/buy-exact-out",
            get(handlers::quote_buy_exact_out),
        )
        .route(
            "/pools/{id}/trades",
            get(handlers::list_trades).post(handlers::execute_trade),
        )
        .route(
            "/pools/{id}/migration",
            get(handlers::migration_status).post(handlers::migrate),
        )
        .route("/pools/{id}/events", get(handlers::pool_events))
        .route("/pools/{id}/activity", get(handlers::pool_activity))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
