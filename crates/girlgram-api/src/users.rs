use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use tracing::info;

use girlgram_types::api::{Claims, FieldError, UpdateProfileRequest};
use girlgram_types::models::{MAX_AGE, MIN_AGE, ProfileUpdate};

use crate::error::ApiError;
use crate::state::{AppState, run_db};
use crate::validation::parse_body;

/// GET /api/auth/user
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_db(&state, move |db| db.get_user(&claims.sub))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(user))
}

/// PATCH /api/auth/user: partial profile update.
pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = parse_body(payload, "Invalid profile data")?;

    if let Some(age) = req.age {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(ApiError::bad_request(
                format!("Age must be between {} and {}", MIN_AGE, MAX_AGE),
                vec![FieldError::new("age", format!("{} is outside {}-{}", age, MIN_AGE, MAX_AGE))],
            ));
        }
    }

    let update = ProfileUpdate {
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
        profile_image_url: req.profile_image_url,
        age: req.age,
        bio: req.bio,
        interests: req.interests,
    };

    let user_id = claims.sub.clone();
    let user = run_db(&state, move |db| db.update_user_profile(&user_id, &update))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!("User {} updated profile", claims.sub);
    Ok(Json(user))
}
