use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use girlgram_api::auth::create_session_token;
use girlgram_api::{AppState, AppStateInner, IdentityProvider, router};
use girlgram_db::Database;
use girlgram_types::models::UpsertUser;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const SESSION_SECRET: &str = "test-session-secret";

#[allow(dead_code)]
pub fn provider() -> IdentityProvider {
    IdentityProvider {
        issuer: "https://id.example.com".into(),
        audience: "girlgram".into(),
        secret: "provider-secret".into(),
    }
}

/// In-memory app with users `alice` and `bea` and the default circles.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, AppState) {
    build_app(true)
}

/// Same users as `create_test_app`, but no circles until `/api/init` runs.
#[allow(dead_code)]
pub fn create_unseeded_app() -> (Router, AppState) {
    build_app(false)
}

fn build_app(seed_circles: bool) -> (Router, AppState) {
    let db = Database::open_in_memory().expect("in-memory database");
    for id in ["alice", "bea"] {
        db.upsert_user(&UpsertUser {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            ..Default::default()
        })
        .unwrap();
    }
    if seed_circles {
        db.seed_default_circles().unwrap();
    }

    let state = Arc::new(AppStateInner {
        db,
        session_secret: SESSION_SECRET.into(),
        identity: provider(),
        secure_cookies: false,
    });

    (router(state.clone()), state)
}

pub fn bearer(user_id: &str) -> String {
    format!("Bearer {}", create_session_token(SESSION_SECRET, user_id).unwrap())
}

/// Send one request and return the status with the parsed JSON body
/// (`Value::Null` when the body is empty or not JSON).
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, bearer(user));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
