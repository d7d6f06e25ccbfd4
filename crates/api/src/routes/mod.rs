//! HTTP route handlers.

pub mod auth;
pub mod dashboard;
pub mod employees;
pub mod files;
pub mod forms;
pub mod health;
pub mod profile;
pub mod reports;
pub mod sites;
pub mod superadmin;
pub mod tasks;

use axum::extract::Multipart;
use domain::models::user::UserRole;
use persistence::repositories::UserRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::AuthUser;

/// State scope for panel queries: admins see only their own state,
/// superadmins see everything.
pub(crate) async fn panel_state_scope(
    state: &AppState,
    auth: &AuthUser,
) -> Result<Option<String>, ApiError> {
    if auth.role != UserRole::Admin {
        return Ok(None);
    }
    let users = UserRepository::new(state.pool.clone());
    let user = users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".into()))?;
    Ok(Some(user.state))
}

/// Pulls the first uploaded file out of a multipart body.
///
/// Returns the client file name and the raw bytes.
pub(crate) async fn read_upload(multipart: &mut Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.file_name().is_none() {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read upload: {}", e)))?;
        return Ok((file_name, bytes.to_vec()));
    }
    Err(ApiError::Validation("No file uploaded".into()))
}
