use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{info, warn};

use girlgram_types::api::{AuthCallbackRequest, Claims, IdentityClaims, MessageResponse};
use girlgram_types::models::UpsertUser;

use crate::error::ApiError;
use crate::state::{AppState, IdentityProvider, run_db};
use crate::validation::parse_body;

/// Cookie holding the session token.
pub const SESSION_COOKIE: &str = "girlgram_session";

const SESSION_DAYS: i64 = 7;

/// POST /api/auth/callback: exchange an identity-provider ID token for a
/// session. The user row is upserted from the token's claims on every login.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<AuthCallbackRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = parse_body(payload, "Invalid login data")?;

    let identity = verify_id_token(&state.identity, &req.id_token).map_err(|e| {
        warn!("Rejected ID token: {}", e);
        ApiError::Unauthorized
    })?;

    let upsert = UpsertUser {
        id: identity.sub,
        email: identity.email,
        first_name: identity.first_name,
        last_name: identity.last_name,
        profile_image_url: identity.profile_image_url,
    };
    let user = run_db(&state, move |db| db.upsert_user(&upsert)).await?;

    let token = create_session_token(&state.session_secret, &user.id)?;
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(state.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_DAYS));

    info!("User {} logged in", user.id);
    Ok((jar.add(cookie), Json(user)))
}

/// POST /api/auth/logout: always answers with an expired session cookie,
/// whether or not the request carried one.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let expired = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO);
    let jar = jar.add(expired);
    (jar, Json(MessageResponse::new("Logged out successfully")))
}

pub fn verify_id_token(provider: &IdentityProvider, token: &str) -> anyhow::Result<IdentityClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[provider.issuer.as_str()]);
    validation.set_audience(&[provider.audience.as_str()]);

    let data = decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(provider.secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

pub fn create_session_token(secret: &str, user_id: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn verify_session_token(secret: &str, token: &str) -> anyhow::Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}
