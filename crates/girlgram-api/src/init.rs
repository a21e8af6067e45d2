use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use girlgram_types::api::MessageResponse;

use crate::error::ApiError;
use crate::state::{AppState, run_db};

/// GET /api/init: seed the default circles on a fresh database.
pub async fn init(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    run_db(&state, |db| db.seed_default_circles()).await?;
    Ok(Json(MessageResponse::new("Initialized successfully")))
}

/// GET /api/health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
