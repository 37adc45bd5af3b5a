use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::AuthResponseData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::Username;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::EmailError;
use crate::user::errors::PasswordRuleError;
use crate::user::errors::UsernameError;

pub async fn register<AS: AuthServicePort>(
    State(state): State<AppState<AS>>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    state
        .auth_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|session| ApiSuccess::new(StatusCode::CREATED, session.into()))
}

/// HTTP request body for registration (raw JSON)
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    username: String,
    email: String,
    password: String,
    confirm_password: String,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterRequestError {
    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid password: {0}")]
    Password(#[from] PasswordRuleError),
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ParseRegisterRequestError> {
        let username = Username::new(self.username)?;
        let email = EmailAddress::new(self.email)?;
        let password = Password::new(self.password, &self.confirm_password)?;
        Ok(RegisterCommand::new(username, email, password))
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        match err {
            ParseRegisterRequestError::Password(PasswordRuleError::ConfirmationMismatch) => {
                ApiError::BadRequest(PasswordRuleError::ConfirmationMismatch.to_string())
            }
            _ => ApiError::UnprocessableEntity(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_valid_request_parses() {
        let command = request("alice", "a@x.com", "secret12", "secret12")
            .try_into_command()
            .unwrap();

        assert_eq!(command.username.as_str(), "alice");
        assert_eq!(command.email.as_str(), "a@x.com");
        assert_eq!(command.password.expose(), "secret12");
    }

    #[test]
    fn test_mismatch_is_bad_request() {
        let err = request("alice", "a@x.com", "secret12", "secret13")
            .try_into_command()
            .unwrap_err();

        assert_eq!(
            ApiError::from(err),
            ApiError::BadRequest("Passwords do not match".to_string())
        );
    }

    #[test]
    fn test_rule_violations_are_unprocessable() {
        let cases = [
            request("al", "a@x.com", "secret12", "secret12"),
            request("alice", "not-an-email", "secret12", "secret12"),
            request("alice", "a@x.com", "short", "short"),
        ];

        for case in cases {
            let err = case.try_into_command().unwrap_err();
            assert!(matches!(ApiError::from(err), ApiError::UnprocessableEntity(_)));
        }
    }

    #[test]
    fn test_body_uses_camel_case() {
        let body: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "alice",
            "email": "a@x.com",
            "password": "secret12",
            "confirmPassword": "secret12"
        }))
        .unwrap();

        assert!(body.try_into_command().is_ok());
    }
}
