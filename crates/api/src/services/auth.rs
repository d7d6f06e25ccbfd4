//! Authentication flows: login, token refresh and password reset.

use serde::Serialize;
use shared::jwt::JwtConfig;
use uuid::Uuid;

use persistence::entities::UserEntity;
use persistence::repositories::UserRepository;

use crate::error::ApiError;
use crate::services::email::{self, Mailer};

/// Access and refresh tokens issued to a client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Verifies credentials and issues a token pair.
pub async fn login(
    users: &UserRepository,
    jwt: &JwtConfig,
    email: &str,
    password: &str,
) -> Result<(TokenPair, UserEntity), ApiError> {
    let email = email.trim().to_lowercase();

    let user = users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".into()))?;

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is deactivated".into()));
    }

    let matches = shared::password::verify_password(password, &user.password_hash)
        .map_err(|e| ApiError::Internal(format!("Password verification failed: {}", e)))?;
    if !matches {
        return Err(ApiError::Unauthorized("Invalid email or password".into()));
    }

    let (access_token, _) = jwt
        .generate_access_token(user.id, &user.role)
        .map_err(|e| ApiError::Internal(format!("Token generation failed: {}", e)))?;
    let (refresh_token, _) = jwt
        .generate_refresh_token(user.id, &user.role)
        .map_err(|e| ApiError::Internal(format!("Token generation failed: {}", e)))?;

    Ok((
        TokenPair {
            access_token,
            refresh_token,
        },
        user,
    ))
}

/// Issues a new access token from a valid refresh token.
///
/// The user must still exist and be active; deactivation cuts off
/// refresh immediately even though access tokens are stateless.
pub async fn refresh_access_token(
    users: &UserRepository,
    jwt: &JwtConfig,
    refresh_token: &str,
) -> Result<String, ApiError> {
    let claims = jwt
        .validate_refresh_token(refresh_token)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired refresh token".into()))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid refresh token".into()))?;

    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid refresh token".into()))?;

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is deactivated".into()));
    }

    let (access_token, _) = jwt
        .generate_access_token(user.id, &user.role)
        .map_err(|e| ApiError::Internal(format!("Token generation failed: {}", e)))?;

    Ok(access_token)
}

/// Issues a password-reset OTP and emails it to the user.
///
/// Unknown emails succeed silently so the endpoint cannot be used to
/// probe which addresses have accounts.
pub async fn issue_reset_otp(
    users: &UserRepository,
    mailer: &dyn Mailer,
    email: &str,
) -> Result<(), ApiError> {
    let email = email.trim().to_lowercase();

    let user = match users.find_by_email(&email).await? {
        Some(user) if user.is_active => user,
        _ => {
            tracing::debug!("Password reset requested for unknown or inactive email");
            return Ok(());
        }
    };

    let otp = shared::otp::generate_otp();
    let otp_hash = shared::otp::hash_otp(&otp);

    users
        .set_reset_otp(user.id, Some(&otp_hash), Some(chrono::Utc::now()))
        .await?;

    email::send_reset_otp(mailer, &user.email, &user.name, &otp)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to send reset email: {}", e)))?;

    Ok(())
}

/// Completes a password reset: checks the OTP and stores the new hash.
pub async fn reset_password(
    users: &UserRepository,
    email: &str,
    otp: &str,
    new_password: &str,
) -> Result<(), ApiError> {
    let email = email.trim().to_lowercase();

    let user = users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::Validation("Invalid email or code".into()))?;

    let (stored_hash, sent_at) = match (&user.reset_otp_hash, user.reset_otp_sent_at) {
        (Some(hash), Some(sent_at)) => (hash, sent_at),
        _ => return Err(ApiError::Validation("Invalid email or code".into())),
    };

    if !shared::otp::verify_otp(otp.trim(), stored_hash, sent_at) {
        return Err(ApiError::Validation("Invalid or expired code".into()));
    }

    shared::password::check_password_strength(new_password)?;
    let password_hash = shared::password::hash_password(new_password)?;

    users.set_password(user.id, &password_hash).await?;
    // A code is single use
    users.set_reset_otp(user.id, None, None).await?;

    Ok(())
}
