use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use super::initdata::verify_init_data;
use crate::state::AppState;

/// Extracts and verifies the web-app handshake, returning the Telegram user id.
pub struct AuthUser(pub i64);

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized" })),
    )
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(unauthorized)?;

        // Mini Apps send "Authorization: tma <initData>"
        let init_data = auth.strip_prefix("tma ").ok_or_else(unauthorized)?;

        let user = verify_init_data(init_data, &state.config.bot_token).ok_or_else(|| {
            warn!("initData verification failed");
            unauthorized()
        })?;

        Ok(AuthUser(user.id))
    }
}
