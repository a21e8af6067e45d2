use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use girlgram_types::api::{Claims, CreateCommentRequest};

use crate::error::ApiError;
use crate::state::{AppState, run_db};
use crate::validation::{PathId, parse_body, required_text};

pub const MAX_COMMENT_CHARS: usize = 2000;

/// GET /api/posts/{id}/comments: newest first.
pub async fn list_comments(
    State(state): State<AppState>,
    PathId(post_id): PathId,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = run_db(&state, move |db| db.get_post_comments(post_id)).await?;
    Ok(Json(comments))
}

/// POST /api/posts/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    PathId(post_id): PathId,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const INVALID: &str = "Invalid comment data";
    let req = parse_body(payload, INVALID)?;

    let mut errors = Vec::new();
    let Some(content) =
        required_text("content", req.content.as_deref(), MAX_COMMENT_CHARS, &mut errors)
    else {
        return Err(ApiError::bad_request(INVALID, errors));
    };

    let author_id = claims.sub.clone();
    let comment = run_db(&state, move |db| db.add_comment(post_id, &author_id, &content)).await?;

    info!("Comment {} on post {} by {}", comment.id, post_id, claims.sub);
    Ok((StatusCode::CREATED, Json(comment)))
}
