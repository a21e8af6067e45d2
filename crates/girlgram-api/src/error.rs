use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use girlgram_types::api::FieldError;
use serde::Serialize;

/// Every way a request can fail. Infrastructure failures are logged here and
/// reach the client only as a generic 500.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest {
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self::BadRequest {
            message: message.into(),
            errors,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::BadRequest { message, errors } => (StatusCode::BAD_REQUEST, message, errors),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), vec![]),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message, vec![]),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    vec![],
                )
            }
        };

        (status, Json(ErrorBody { message, errors })).into_response()
    }
}
