//! Authentication endpoint handlers.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain::models::user::UserResponse;
use persistence::repositories::UserRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_login_attempt;
use crate::middleware::user_auth::AuthUser;
use crate::services::auth;
use crate::services::email::mailer_from_config;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, max = 6, message = "Code must be 6 digits"))]
    pub otp: String,

    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let users = UserRepository::new(state.pool.clone());
    let jwt = AuthUser::create_jwt_config(&state.config.jwt).map_err(ApiError::Internal)?;

    let result = auth::login(&users, &jwt, &request.email, &request.password).await;
    record_login_attempt(result.is_ok());

    let (tokens, user) = result?;
    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        user: domain::models::User::from(user).into(),
    }))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    request.validate()?;

    let users = UserRepository::new(state.pool.clone());
    let jwt = AuthUser::create_jwt_config(&state.config.jwt).map_err(ApiError::Internal)?;

    let access_token = auth::refresh_access_token(&users, &jwt, &request.refresh_token).await?;
    Ok(Json(RefreshResponse { access_token }))
}

/// POST /api/v1/auth/forgot-password
///
/// Always answers 200 with the same message so account existence is
/// not observable.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    request.validate()?;

    let users = UserRepository::new(state.pool.clone());
    let mailer = mailer_from_config(&state.config.email);

    auth::issue_reset_otp(&users, mailer.as_ref(), &request.email).await?;

    Ok(Json(MessageResponse {
        message: "If the email is registered, a reset code has been sent".to_string(),
    }))
}

/// POST /api/v1/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    request.validate()?;

    let users = UserRepository::new(state.pool.clone());
    auth::reset_password(&users, &request.email, &request.otp, &request.new_password).await?;

    tracing::info!("Password reset completed");
    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let request = LoginRequest {
            email: "user@example.com".to_string(),
            password: "Secret#123".to_string(),
        };
        assert!(request.validate().is_ok());

        let bad = LoginRequest {
            email: "not-an-email".to_string(),
            password: "x".to_string(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_reset_request_rejects_short_otp() {
        let request = ResetPasswordRequest {
            email: "user@example.com".to_string(),
            otp: "123".to_string(),
            new_password: "Secret#123".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_refresh_request_camel_case() {
        let request: RefreshRequest =
            serde_json::from_str(r#"{"refreshToken": "abc"}"#).unwrap();
        assert_eq!(request.refresh_token, "abc");
    }
}
