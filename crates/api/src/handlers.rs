//! Request handlers.

use crate::error::ApiError;
use crate::models::{
    ActivityResponse, EventResponse, ExactOutQuery, HealthResponse, LaunchPoolRequest,
    MigrationAckResponse, MigrationStatusResponse, PoolResponse, PoolSummaryResponse, QuoteQuery,
    QuoteResponse, StatsResponse, TradeRequestBody, TradeResponse,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use launchpad_domain::PoolId;
use launchpad_execution::prelude::{TradeError, TradeRequest};
use tracing::info;

fn parse_pool_id(raw: &str) -> Result<PoolId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid pool id: {raw}")))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        pools: state.executor.list_pools().await.len(),
    })
}

/// `GET /pools`
pub async fn list_pools(State(state): State<AppState>) -> Json<Vec<PoolSummaryResponse>> {
    let pools = state.executor.list_pools().await;
    Json(pools.into_iter().map(Into::into).collect())
}

/// `POST /pools`
pub async fn launch_pool(
    State(state): State<AppState>,
    Json(request): Json<LaunchPoolRequest>,
) -> Result<(StatusCode, Json<PoolResponse>), ApiError> {
    if request.coin_type.trim().is_empty() || request.quote_type.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "coin_type and quote_type are required".to_string(),
        ));
    }
    let pool = state
        .executor
        .launch_pool(
            request.coin_type,
            request.quote_type,
            request.params.map(Into::into),
        )
        .await?;
    info!(pool_id = %pool.id, coin_type = %pool.coin_type, "Pool launched via API");
    Ok((StatusCode::CREATED, Json(PoolResponse::from_pool(&pool)?)))
}

/// `GET /pools/{id}`
pub async fn get_pool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PoolResponse>, ApiError> {
    let pool = state.executor.get_pool(parse_pool_id(&id)?).await?;
    Ok(Json(PoolResponse::from_pool(&pool)?))
}

/// `GET /pools/{id}/quote?direction=buy&amount=..`
pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let quote = state
        .executor
        .get_quote(parse_pool_id(&id)?, query.direction, query.amount)
        .await?;
    Ok(Json(quote.into()))
}

/// `GET /pools/{id}/quote/buy-exact-out?coin_out=..`
pub async fn quote_buy_exact_out(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ExactOutQuery>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let quote = state
        .executor
        .quote_buy_exact_out(parse_pool_id(&id)?, query.coin_out)
        .await?;
    Ok(Json(quote.into()))
}

/// `POST /pools/{id}/trades`
pub async fn execute_trade(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TradeRequestBody>,
) -> Result<(StatusCode, Json<TradeResponse>), ApiError> {
    let trade = state
        .executor
        .execute_trade(TradeRequest {
            pool_id: parse_pool_id(&id)?,
            direction: body.direction,
            amount_in: body.amount_in,
            min_amount_out: body.min_amount_out,
            trader: body.trader,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(trade.into())))
}

/// `GET /pools/{id}/trades`
pub async fn list_trades(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TradeResponse>>, ApiError> {
    let trades = state.executor.trades(parse_pool_id(&id)?).await?;
    Ok(Json(trades.into_iter().map(Into::into).collect()))
}

/// `GET /pools/{id}/migration`
pub async fn migration_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MigrationStatusResponse>, ApiError> {
    let status = state
        .executor
        .get_migration_status(parse_pool_id(&id)?)
        .await?;
    Ok(Json(status.into()))
}

/// `POST /pools/{id}/migration`
pub async fn migrate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MigrationAckResponse>, ApiError> {
    let ack = state.executor.migrate(parse_pool_id(&id)?).await?;
    Ok(Json(ack.into()))
}

/// `GET /pools/{id}/events`
pub async fn pool_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let pool_id = parse_pool_id(&id)?;
    // Unknown pools are a 404, not an empty list.
    state.executor.get_pool(pool_id).await?;
    let events = state.executor.lifecycle().get_events(&pool_id).await;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

/// `GET /pools/{id}/activity`
pub async fn pool_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let pool_id = parse_pool_id(&id)?;
    state.executor.get_pool(pool_id).await?;
    let activity = state
        .executor
        .lifecycle()
        .get_activity(&pool_id)
        .await
        .ok_or(TradeError::PoolNotFound(pool_id))?;
    Ok(Json(activity.into()))
}

/// `GET /stats`
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.executor.lifecycle().get_aggregate_stats().await.into())
}
