use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::AuthResponseData;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn refresh<AS: AuthServicePort>(
    State(state): State<AppState<AS>>,
    headers: HeaderMap,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let refresh_token = extract_refresh_token(&headers)?;

    state
        .auth_service
        .refresh_token_pair(refresh_token)
        .await
        .map_err(ApiError::from)
        .map(|session| ApiSuccess::new(StatusCode::OK, session.into()))
}

/// The refresh token travels in `Authorization`, with or without the
/// `Bearer ` prefix.
fn extract_refresh_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Missing refresh token".to_string()))?;

    Ok(value.strip_prefix("Bearer ").unwrap_or(value))
}
