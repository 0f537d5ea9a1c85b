use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::{Request, request::Parts};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::ApiError;
use super::state::ApiState;

const AUTH_TOKEN_HEADER: &str = "x-auth-token";
const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// The caller's opaque auth token, taken from `X-Auth-Token`.
pub struct AuthToken(pub String);

impl<S> FromRequestParts<S> for AuthToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|token| AuthToken(token.to_string()))
            .ok_or_else(ApiError::missing_auth_token)
    }
}

/// Gate for the admin write surface: requests must present the configured
/// admin token. With no token configured the surface is disabled outright.
pub async fn admin_auth(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.admin_token.as_deref() else {
        return ApiError::admin_forbidden().into_response();
    };

    let presented = request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    match presented {
        Some(token) if token == expected => next.run(request).await,
        _ => ApiError::admin_forbidden().into_response(),
    }
}
