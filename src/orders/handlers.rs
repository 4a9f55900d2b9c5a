use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tracing::{error, instrument};

use super::dto::OrderResponse;
use super::service;
use crate::auth::extractors::AuthUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/orders", get(list_orders))
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

#[instrument(skip(state))]
async fn list_orders(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<OrderResponse>>, (StatusCode, String)> {
    let orders = service::my_orders(&state, user_id).await.map_err(|e| {
        error!(error = %e, %user_id, "listing orders failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
    })?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}
