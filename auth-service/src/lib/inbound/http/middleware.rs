use auth::Claims;
use auth::TokenKind;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

/// Extension type to store the authenticated identity in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: String,
}

/// Middleware that verifies the bearer access token and adds the identity
/// to request extensions.
///
/// Verification is purely cryptographic; the user store is never consulted.
pub async fn authenticate<AS: AuthServicePort>(
    State(state): State<AppState<AS>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&req)?;

    let claims = state
        .token_manager
        .verify_kind(token, TokenKind::Access)
        .map_err(|e| {
            tracing::warn!(error = %e, "Access token rejected");
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;

    req.extensions_mut().insert(identity(claims)?);

    Ok(next.run(req).await)
}

/// Identity carried by verified claims. `sub` must name the same user as
/// `user_id`.
fn identity(claims: Claims) -> Result<AuthenticatedUser, ApiError> {
    let user_id = UserId::from_string(&claims.sub).map_err(|e| {
        tracing::warn!(error = %e, "Access token subject is not a user ID");
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    if user_id.0 != claims.user_id {
        tracing::warn!(sub = %user_id, user_id = %claims.user_id, "Access token subject mismatch");
        return Err(ApiError::Unauthorized("Invalid or expired token".to_string()));
    }

    Ok(AuthenticatedUser {
        user_id,
        email: claims.email,
    })
}

fn extract_bearer_token(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization token".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid authorization format".to_string()))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(ApiError::Unauthorized(
            "Invalid authorization format".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use chrono::Duration;
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn access_claims(user_id: Uuid) -> Claims {
        Claims::new(
            user_id,
            "a@x.com",
            "artisan",
            TokenKind::Access,
            Utc::now(),
            Duration::minutes(5),
        )
    }

    fn request(authorization: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/api/auth/me");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extracts_bearer_token() {
        let req = request(Some("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&req), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            extract_bearer_token(&request(None)),
            Err(ApiError::Unauthorized(
                "Missing authorization token".to_string()
            ))
        );
    }

    #[test]
    fn test_wrong_scheme_or_empty_token() {
        for value in ["Basic dXNlcjpwYXNz", "abc.def.ghi", "Bearer ", "bearer abc"] {
            assert_eq!(
                extract_bearer_token(&request(Some(value))),
                Err(ApiError::Unauthorized(
                    "Invalid authorization format".to_string()
                )),
                "{value}"
            );
        }
    }

    #[test]
    fn test_identity_from_claims() {
        let user_id = Uuid::new_v4();

        assert_eq!(
            identity(access_claims(user_id)),
            Ok(AuthenticatedUser {
                user_id: UserId(user_id),
                email: "a@x.com".to_string(),
            })
        );
    }

    #[test]
    fn test_identity_rejects_unparseable_subject() {
        let mut claims = access_claims(Uuid::new_v4());
        claims.sub = "nope".to_string();

        assert_eq!(
            identity(claims),
            Err(ApiError::Unauthorized("Invalid or expired token".to_string()))
        );
    }

    #[test]
    fn test_identity_rejects_subject_for_other_user() {
        let mut claims = access_claims(Uuid::new_v4());
        claims.sub = Uuid::new_v4().to_string();

        assert_eq!(
            identity(claims),
            Err(ApiError::Unauthorized("Invalid or expired token".to_string()))
        );
    }
}
