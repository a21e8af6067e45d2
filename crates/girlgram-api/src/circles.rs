use axum::{
    Extension, Json,
    extract::State,
    response::IntoResponse,
};
use tracing::debug;

use girlgram_types::api::{Claims, MessageResponse};

use crate::error::ApiError;
use crate::state::{AppState, run_db};
use crate::validation::PathId;

/// GET /api/circles: public.
pub async fn list_circles(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let circles = run_db(&state, |db| db.get_all_circles()).await?;
    Ok(Json(circles))
}

/// GET /api/circles/user: circles the caller has joined.
pub async fn list_user_circles(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let circles = run_db(&state, move |db| db.get_user_circles(&claims.sub)).await?;
    Ok(Json(circles))
}

/// POST /api/circles/{id}/join: joining twice is a no-op.
pub async fn join_circle(
    State(state): State<AppState>,
    PathId(circle_id): PathId,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.clone();
    let joined = run_db(&state, move |db| db.join_circle(&user_id, circle_id)).await?;

    debug!(circle_id, joined, "User {} join circle", claims.sub);
    Ok(Json(MessageResponse::new("Joined circle successfully")))
}

/// DELETE /api/circles/{id}/leave: leaving a circle never joined is a no-op.
pub async fn leave_circle(
    State(state): State<AppState>,
    PathId(circle_id): PathId,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.clone();
    let left = run_db(&state, move |db| db.leave_circle(&user_id, circle_id)).await?;

    debug!(circle_id, left, "User {} leave circle", claims.sub);
    Ok(Json(MessageResponse::new("Left circle successfully")))
}
