//! Role-based access control middleware.
//!
//! Runs after [`super::user_auth::require_user_auth`] and checks the
//! authenticated user's role from request extensions.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::user::UserRole;
use serde_json::json;

use crate::middleware::user_auth::AuthUser;

/// Middleware for routes restricted to admins and superadmins.
pub async fn require_admin_role(req: Request<Body>, next: Next) -> Response {
    require_role(req, next, |role| {
        matches!(role, UserRole::Admin | UserRole::Superadmin)
    })
    .await
}

/// Middleware for routes restricted to superadmins.
pub async fn require_superadmin_role(req: Request<Body>, next: Next) -> Response {
    require_role(req, next, |role| matches!(role, UserRole::Superadmin)).await
}

/// Middleware for routes restricted to field employees.
pub async fn require_employee_role(req: Request<Body>, next: Next) -> Response {
    require_role(req, next, |role| matches!(role, UserRole::Employee)).await
}

async fn require_role(
    req: Request<Body>,
    next: Next,
    allowed: fn(UserRole) -> bool,
) -> Response {
    match req.extensions().get::<AuthUser>() {
        Some(auth) if allowed(auth.role) => next.run(req).await,
        Some(auth) => {
            tracing::debug!(user_id = %auth.user_id, role = ?auth.role, "Role check failed");
            forbidden_response()
        }
        None => {
            // Auth middleware did not run; treat as unauthenticated
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Authentication required" })),
            )
                .into_response()
        }
    }
}

fn forbidden_response() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "Insufficient permissions" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_response_status() {
        let response = forbidden_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_admin_predicate_accepts_both_tiers() {
        let allowed = |role: UserRole| matches!(role, UserRole::Admin | UserRole::Superadmin);
        assert!(allowed(UserRole::Admin));
        assert!(allowed(UserRole::Superadmin));
        assert!(!allowed(UserRole::Employee));
    }

    #[test]
    fn test_superadmin_predicate_is_exclusive() {
        let allowed = |role: UserRole| matches!(role, UserRole::Superadmin);
        assert!(allowed(UserRole::Superadmin));
        assert!(!allowed(UserRole::Admin));
        assert!(!allowed(UserRole::Employee));
    }
}
