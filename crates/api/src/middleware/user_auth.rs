//! User JWT authentication middleware.
//!
//! Validates the Bearer token on protected routes and stores the
//! authenticated user in request extensions.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::user::UserRole;
use serde_json::json;
use uuid::Uuid;

use crate::app::AppState;
use crate::config::JwtAuthConfig;
use shared::jwt::JwtConfig;

/// Authenticated user information extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    /// Role from the JWT role claim.
    pub role: UserRole,
    /// JWT ID (jti) for log correlation.
    pub jti: String,
}

impl AuthUser {
    /// Validates an access token and returns user authentication info.
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, String> {
        let claims = jwt_config
            .validate_access_token(token)
            .map_err(|e| format!("Invalid token: {}", e))?;

        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token".to_string())?;

        let role = UserRole::parse(&claims.role)
            .ok_or_else(|| format!("Unknown role in token: {}", claims.role))?;

        Ok(AuthUser {
            user_id,
            role,
            jti: claims.jti,
        })
    }

    /// Creates a JwtConfig from JwtAuthConfig.
    pub fn create_jwt_config(config: &JwtAuthConfig) -> Result<JwtConfig, String> {
        JwtConfig::with_leeway(
            &config.private_key,
            &config.public_key,
            config.access_token_expiry_secs,
            config.refresh_token_expiry_secs,
            config.leeway_secs,
        )
        .map_err(|e| format!("Failed to initialize JWT config: {}", e))
    }
}

/// Middleware that requires JWT user authentication.
///
/// Rejects requests without a valid Bearer token. Authenticated user
/// information is stored in request extensions for downstream handlers
/// and the role-check middleware.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    let jwt_config = match AuthUser::create_jwt_config(&state.config.jwt) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to create JWT config: {}", e);
            return internal_error_response("Authentication service unavailable");
        }
    };

    match AuthUser::validate(&jwt_config, token) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("JWT validation failed: {}", e);
            unauthorized_response("Invalid or expired token")
        }
    }
}

/// Helper to create unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": message })),
    )
        .into_response()
}

/// Helper to create internal error response.
fn internal_error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_response() {
        let response = unauthorized_response("Missing or invalid Authorization header");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_internal_error_response() {
        let response = internal_error_response("Authentication service unavailable");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_auth_user_clone() {
        let auth = AuthUser {
            user_id: Uuid::new_v4(),
            role: UserRole::Admin,
            jti: "test_jti".to_string(),
        };
        let cloned = auth.clone();
        assert_eq!(auth.user_id, cloned.user_id);
        assert_eq!(cloned.role, UserRole::Admin);
        assert_eq!(auth.jti, cloned.jti);
    }

    #[test]
    fn test_create_jwt_config_rejects_bad_keys() {
        let config = JwtAuthConfig {
            private_key: "not a pem".to_string(),
            public_key: "not a pem".to_string(),
            access_token_expiry_secs: 3600,
            refresh_token_expiry_secs: 604800,
            leeway_secs: 30,
        };
        assert!(AuthUser::create_jwt_config(&config).is_err());
    }

    #[test]
    fn test_auth_user_debug_shows_role() {
        let auth = AuthUser {
            user_id: Uuid::new_v4(),
            role: UserRole::Superadmin,
            jti: "jti".to_string(),
        };
        let debug_str = format!("{:?}", auth);
        assert!(debug_str.contains("AuthUser"));
        assert!(debug_str.contains("Superadmin"));
    }
}
