use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use girlgram_types::api::{Claims, CreatePostRequest, FieldError, MessageResponse};

use crate::error::ApiError;
use crate::state::{AppState, run_db};
use crate::validation::{Limit, PathId, parse_body, required_text};

pub const MAX_POST_CHARS: usize = 5000;

/// GET /api/posts/feed: newest posts from every circle, not just joined ones.
pub async fn get_feed(
    State(state): State<AppState>,
    Limit(limit): Limit,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = run_db(&state, move |db| db.get_feed_posts(&claims.sub, limit)).await?;
    Ok(Json(posts))
}

/// GET /api/posts/circle/{id}
pub async fn get_circle_posts(
    State(state): State<AppState>,
    PathId(circle_id): PathId,
    Limit(limit): Limit,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let posts =
        run_db(&state, move |db| db.get_posts_by_circle(circle_id, &claims.sub, limit)).await?;
    Ok(Json(posts))
}

/// GET /api/posts/user/{id}: posts written by `id`, annotated for the caller.
pub async fn get_user_posts(
    State(state): State<AppState>,
    Path(author_id): Path<String>,
    Limit(limit): Limit,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let posts =
        run_db(&state, move |db| db.get_user_posts(&author_id, &claims.sub, limit)).await?;
    Ok(Json(posts))
}

/// POST /api/posts: the author is always the caller, never the body.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const INVALID: &str = "Invalid post data";
    let req = parse_body(payload, INVALID)?;

    let mut errors = Vec::new();
    let content = required_text("content", req.content.as_deref(), MAX_POST_CHARS, &mut errors);
    if req.circle_id.is_none() {
        errors.push(FieldError::new("circleId", "Required"));
    }
    let (Some(content), Some(circle_id)) = (content, req.circle_id) else {
        return Err(ApiError::bad_request(INVALID, errors));
    };
    let image_url = req.image_url.filter(|url| !url.trim().is_empty());

    let author_id = claims.sub.clone();
    let post = run_db(&state, move |db| {
        db.create_post(&author_id, circle_id, &content, image_url.as_deref())
    })
    .await?;

    info!("Post {} created by {} in circle {}", post.id, claims.sub, circle_id);
    Ok((StatusCode::CREATED, Json(post)))
}

/// DELETE /api/posts/{id}: only the author may delete. Missing and
/// foreign posts are indistinguishable to the caller.
pub async fn delete_post(
    State(state): State<AppState>,
    PathId(post_id): PathId,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.clone();
    let deleted = run_db(&state, move |db| db.delete_post(post_id, &user_id)).await?;

    if !deleted {
        return Err(ApiError::NotFound("Post not found or unauthorized".into()));
    }

    info!("Post {} deleted by {}", post_id, claims.sub);
    Ok(Json(MessageResponse::new("Post deleted successfully")))
}
