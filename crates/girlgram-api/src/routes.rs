use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, circles, comments, init, likes, posts, users};

/// Build the full HTTP surface. Routes in the protected group reject
/// unauthenticated calls before their handler runs.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/init", get(init::init))
        .route("/api/health", get(init::health))
        .route("/api/circles", get(circles::list_circles))
        .route("/api/auth/callback", post(auth::callback))
        .route("/api/auth/logout", post(auth::logout));

    let protected_routes = Router::new()
        .route("/api/auth/user", get(users::get_current_user))
        .route("/api/auth/user", patch(users::update_current_user))
        .route("/api/circles/user", get(circles::list_user_circles))
        .route("/api/circles/{id}/join", post(circles::join_circle))
        .route("/api/circles/{id}/leave", delete(circles::leave_circle))
        .route("/api/posts", post(posts::create_post))
        .route("/api/posts/feed", get(posts::get_feed))
        .route("/api/posts/circle/{id}", get(posts::get_circle_posts))
        .route("/api/posts/user/{id}", get(posts::get_user_posts))
        .route("/api/posts/{id}", delete(posts::delete_post))
        .route("/api/posts/{id}/like", post(likes::like_post))
        .route("/api/posts/{id}/like", delete(likes::unlike_post))
        .route("/api/posts/{id}/comments", get(comments::list_comments))
        .route("/api/posts/{id}/comments", post(comments::add_comment))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
