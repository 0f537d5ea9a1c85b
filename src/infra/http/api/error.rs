use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use crate::application::error::AppError;
use crate::application::identity::IdentityError;

/// Error envelope: `{"data": null, "errors": [{"error": "..."}]}`.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub data: Value,
    pub errors: Vec<ApiErrorMessage>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn missing_auth_token() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Missing Auth Token")
    }

    pub fn admin_forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Invalid Admin Token")
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status = match &err {
            AppError::UnknownSite { .. } | AppError::InvalidKey { .. } => StatusCode::NOT_FOUND,
            AppError::TypeMismatch { .. } => StatusCode::BAD_REQUEST,
            AppError::Auth(IdentityError::Unauthorized) => StatusCode::FORBIDDEN,
            AppError::Auth(IdentityError::Unreachable(_)) => StatusCode::BAD_GATEWAY,
            AppError::Corrupt { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Repo(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            data: Value::Null,
            errors: vec![ApiErrorMessage {
                error: self.message,
            }],
        };
        (self.status, Json(body)).into_response()
    }
}
