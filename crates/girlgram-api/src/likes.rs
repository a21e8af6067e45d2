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

/// POST /api/posts/{id}/like: liking twice keeps a single like.
pub async fn like_post(
    State(state): State<AppState>,
    PathId(post_id): PathId,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.clone();
    let added = run_db(&state, move |db| db.like_post(post_id, &user_id)).await?;

    debug!(post_id, added, "User {} like", claims.sub);
    Ok(Json(MessageResponse::new("Post liked successfully")))
}

/// DELETE /api/posts/{id}/like
pub async fn unlike_post(
    State(state): State<AppState>,
    PathId(post_id): PathId,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.clone();
    let removed = run_db(&state, move |db| db.unlike_post(post_id, &user_id)).await?;

    debug!(post_id, removed, "User {} unlike", claims.sub);
    Ok(Json(MessageResponse::new("Post unliked successfully")))
}
