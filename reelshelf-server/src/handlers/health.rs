use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::infra::app_state::AppState;
use crate::infra::errors::AppResult;

/// Liveness plus a database round trip.
pub async fn health_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Value>> {
    state.database.ping().await?;

    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "tmdbConfigured": state.config.catalog.tmdb.api_key.is_some(),
    })))
}
