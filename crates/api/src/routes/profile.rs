//! Own-profile endpoints shared by all roles.

use axum::{extract::State, Extension, Json};
use serde::Serialize;
use validator::Validate;

use domain::models::user::{ChangePasswordRequest, UpdateUserRequest, UserResponse, UserRole};
use domain::models::User;
use persistence::repositories::{EmployeeRepository, UserRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::AuthUser;
use crate::services::storage;

/// Profile payload. Employee-specific fields are absent for admin and
/// superadmin accounts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport_photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_photo_url: Option<String>,
}

async fn load_profile(state: &AppState, auth: &AuthUser) -> Result<ProfileResponse, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    let user = users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let mut response = ProfileResponse {
        user: User::from(user).into(),
        company_name: None,
        employee_code: None,
        mobile_number: None,
        passport_photo_url: None,
        signature_photo_url: None,
    };

    if auth.role == UserRole::Employee {
        let employees = EmployeeRepository::new(state.pool.clone());
        if let Some(profile) = employees.find_profile(auth.user_id).await? {
            let base = &state.config.storage.public_base_url;
            response.company_name = profile.company_name;
            response.employee_code = profile.employee_code;
            response.mobile_number = profile.mobile_number;
            response.passport_photo_url = profile
                .passport_photo
                .as_deref()
                .map(|p| storage::public_url(base, p));
            response.signature_photo_url = profile
                .signature_photo
                .as_deref()
                .map(|p| storage::public_url(base, p));
        }
    }

    Ok(response)
}

/// GET profile for the authenticated user.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>, ApiError> {
    Ok(Json(load_profile(&state, &auth).await?))
}

/// PUT profile for the authenticated user. Name and state only; role
/// and codes never change through this endpoint.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    request.validate()?;

    let users = UserRepository::new(state.pool.clone());
    users
        .update_profile(auth.user_id, request.name.as_deref(), request.state.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(load_profile(&state, &auth).await?))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST change-password for the authenticated user.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    request.validate()?;

    let users = UserRepository::new(state.pool.clone());
    let user = users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let matches = shared::password::verify_password(&request.old_password, &user.password_hash)
        .map_err(|e| ApiError::Internal(format!("Password verification failed: {}", e)))?;
    if !matches {
        return Err(ApiError::Unauthorized("Old password is incorrect".into()));
    }

    shared::password::check_password_strength(&request.new_password)?;
    let hash = shared::password::hash_password(&request.new_password)?;
    users.set_password(auth.user_id, &hash).await?;

    tracing::info!(user_id = %auth.user_id, "Password changed");
    Ok(Json(MessageResponse {
        message: "Password changed".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_profile_response_omits_absent_employee_fields() {
        let response = ProfileResponse {
            user: UserResponse {
                id: Uuid::new_v4(),
                email: "a@example.com".to_string(),
                name: "A".to_string(),
                role: UserRole::Admin,
                state: "Telangana".to_string(),
                global_code: "USR-0001".to_string(),
                state_code: "TE-ADM-001".to_string(),
                is_active: true,
                created_at: Utc::now(),
            },
            company_name: None,
            employee_code: None,
            mobile_number: None,
            passport_photo_url: None,
            signature_photo_url: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("companyName").is_none());
        assert_eq!(json["stateCode"], "TE-ADM-001");
    }

    #[test]
    fn test_profile_response_flattens_user_fields() {
        let response = ProfileResponse {
            user: UserResponse {
                id: Uuid::new_v4(),
                email: "e@example.com".to_string(),
                name: "E".to_string(),
                role: UserRole::Employee,
                state: "Odisha".to_string(),
                global_code: "USR-0002".to_string(),
                state_code: "OD-EMP-001".to_string(),
                is_active: true,
                created_at: Utc::now(),
            },
            company_name: Some("Acme Services".to_string()),
            employee_code: None,
            mobile_number: Some("9876543210".to_string()),
            passport_photo_url: Some("/media/passports/x.jpg".to_string()),
            signature_photo_url: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["email"], "e@example.com");
        assert_eq!(json["companyName"], "Acme Services");
        assert_eq!(json["passportPhotoUrl"], "/media/passports/x.jpg");
    }
}
