use std::convert::Infallible;

use axum::{
    Json,
    extract::{FromRequestParts, Path, Query, rejection::JsonRejection},
    http::request::Parts,
};
use girlgram_db::queries::DEFAULT_LIMIT;
use girlgram_types::api::FieldError;

use crate::error::ApiError;

/// Largest page a feed request may ask for.
pub(crate) const MAX_LIMIT: u32 = 100;

/// Page size from `?limit`. Never rejects: a missing, unparsable or zero
/// value falls back to the default, and only the first `limit` counts.
#[derive(Debug, Clone, Copy)]
pub struct Limit(pub u32);

impl<S: Send + Sync> FromRequestParts<S> for Limit {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let pairs = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();
        let raw = pairs
            .iter()
            .find(|(key, _)| key == "limit")
            .map(|(_, value)| value.as_str());
        Ok(Limit(resolve_limit(raw)))
    }
}

pub(crate) fn resolve_limit(raw: Option<&str>) -> u32 {
    raw.and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_LIMIT)
        .min(MAX_LIMIT)
}

/// Numeric `{id}` path segment. A non-integer id is a JSON 400.
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for PathId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::bad_request("Invalid id", vec![FieldError::new("id", rejection.body_text())])
            })?;
        Ok(PathId(id))
    }
}

/// Unwrap a JSON body, turning syntax and type errors into a 400.
pub(crate) fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    message: &str,
) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            ApiError::bad_request(message, vec![FieldError::new("body", rejection.body_text())])
        })
}

/// Check a required text field. Records a field error and returns `None`
/// when the value is missing, blank or longer than `max_chars` once trimmed.
/// The value is returned as sent, surrounding whitespace included.
pub(crate) fn required_text(
    field: &str,
    value: Option<&str>,
    max_chars: usize,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value.map(|text| (text, text.trim())) {
        None => {
            errors.push(FieldError::new(field, "Required"));
            None
        }
        Some((_, "")) => {
            errors.push(FieldError::new(field, "Must not be empty"));
            None
        }
        Some((_, trimmed)) if trimmed.chars().count() > max_chars => {
            errors.push(FieldError::new(
                field,
                format!("Must be at most {} characters", max_chars),
            ));
            None
        }
        Some((text, _)) => Some(text.to_string()),
    }
}
