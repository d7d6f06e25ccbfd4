//! Employee account management endpoints.

use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use domain::models::employee::{
    CreateEmployeeRequest, EmployeeImportRow, EmployeeResponse, UpdateEmployeeRequest,
};
use domain::models::user::UserRole;
use persistence::entities::{EmployeeRecordEntity, UserEntity};
use persistence::repositories::{EmployeeRepository, UserRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_import_rows;
use crate::middleware::user_auth::AuthUser;
use crate::routes::{panel_state_scope, read_upload};
use crate::services::imports::{self, PhotoKind};
use crate::services::report_export::timestamped_filename;
use crate::services::storage;

pub(crate) fn employee_response(
    record: EmployeeRecordEntity,
    public_base_url: &str,
) -> EmployeeResponse {
    EmployeeResponse {
        id: record.id,
        email: record.email,
        name: record.name,
        role: UserRole::parse(&record.role).unwrap_or(UserRole::Employee),
        state: record.state,
        global_code: record.global_code,
        state_code: record.state_code,
        is_active: record.is_active,
        company_name: record.company_name,
        employee_code: record.employee_code,
        mobile_number: record.mobile_number,
        passport_photo_url: record
            .passport_photo
            .as_deref()
            .map(|p| storage::public_url(public_base_url, p)),
        signature_photo_url: record
            .signature_photo
            .as_deref()
            .map(|p| storage::public_url(public_base_url, p)),
        created_at: record.created_at,
    }
}

/// Creates the employee account and its profile row. Shared by the
/// panel endpoints, the superadmin endpoints and the ZIP import.
pub(crate) async fn create_account(
    state: &AppState,
    request: &CreateEmployeeRequest,
) -> Result<UserEntity, ApiError> {
    request.validate()?;

    let email = request.email.trim().to_lowercase();
    let users = UserRepository::new(state.pool.clone());

    if users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Email already registered: {}",
            email
        )));
    }

    shared::password::check_password_strength(&request.password)?;
    let password_hash = shared::password::hash_password(&request.password)?;

    let user = users
        .create(
            &email,
            &password_hash,
            request.name.trim(),
            UserRole::Employee,
            request.state.trim(),
        )
        .await?;

    let has_profile_data = request.company_name.is_some()
        || request.employee_code.is_some()
        || request.mobile_number.is_some();
    if has_profile_data {
        let employees = EmployeeRepository::new(state.pool.clone());
        employees
            .upsert_profile(
                user.id,
                request.company_name.as_deref(),
                request.employee_code.as_deref(),
                request.mobile_number.as_deref(),
            )
            .await?;
    }

    Ok(user)
}

pub(crate) fn check_scope(record_state: &str, scope: Option<&str>) -> Result<(), ApiError> {
    match scope {
        Some(scope) if record_state != scope => {
            Err(ApiError::NotFound("Employee not found".into()))
        }
        _ => Ok(()),
    }
}

async fn store_photo(
    state: &AppState,
    user_id: Uuid,
    kind: PhotoKind,
    file_name: &str,
    data: &[u8],
) -> Result<(), ApiError> {
    let category = match kind {
        PhotoKind::Passport => "passports",
        PhotoKind::Signature => "signatures",
    };
    let stored = storage::save_file(&state.config.storage.media_dir, category, file_name, data)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to store photo: {}", e)))?;

    let employees = EmployeeRepository::new(state.pool.clone());
    match kind {
        PhotoKind::Passport => employees.set_photos(user_id, Some(&stored), None).await?,
        PhotoKind::Signature => employees.set_photos(user_id, None, Some(&stored)).await?,
    };
    Ok(())
}

/// POST /api/v1/panel/employees
///
/// Multipart: the account fields as text parts, plus optional
/// `passport_photo` and `signature_photo` file parts.
pub async fn create_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let scope = panel_state_scope(&state, &auth).await?;

    let mut fields: std::collections::HashMap<String, String> = std::collections::HashMap::new();
    let mut photos: Vec<(PhotoKind, String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_some() {
            let kind = match name.as_str() {
                "passport_photo" | "passportPhoto" => PhotoKind::Passport,
                "signature_photo" | "signaturePhoto" => PhotoKind::Signature,
                _ => continue,
            };
            let file_name = field.file_name().unwrap_or("photo").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Failed to read photo: {}", e)))?;
            photos.push((kind, file_name, data.to_vec()));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?;
            fields.insert(name, value);
        }
    }

    let get = |snake: &str, camel: &str| -> Option<String> {
        fields
            .get(snake)
            .or_else(|| fields.get(camel))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let request = CreateEmployeeRequest {
        email: get("email", "email").unwrap_or_default(),
        name: get("name", "name").unwrap_or_default(),
        state: get("state", "state").unwrap_or_default(),
        password: fields.get("password").cloned().unwrap_or_default(),
        company_name: get("company_name", "companyName"),
        employee_code: get("employee_code", "employeeCode"),
        mobile_number: get("mobile_number", "mobileNumber"),
    };

    if let Some(scope) = scope.as_deref() {
        if !request.state.eq_ignore_ascii_case(scope) {
            return Err(ApiError::Forbidden(
                "Cannot create employees outside your state".into(),
            ));
        }
    }

    let user = create_account(&state, &request).await?;

    for (kind, file_name, data) in &photos {
        store_photo(&state, user.id, *kind, file_name, data).await?;
    }

    let employees = EmployeeRepository::new(state.pool.clone());
    let record = employees
        .find_record_by_id(user.id)
        .await?
        .ok_or_else(|| ApiError::Internal("Employee record missing after create".into()))?;

    tracing::info!(employee = %record.email, state_code = %record.state_code, "Employee created");
    Ok(Json(employee_response(
        record,
        &state.config.storage.public_base_url,
    )))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeImportResponse {
    pub created: usize,
    pub failed: usize,
    pub results: Vec<EmployeeImportRow>,
}

/// POST /api/v1/panel/employees/import
///
/// ZIP upload holding `employees.csv` plus photo files named
/// `<email>_passport.*` and `<email>_signature.*`. Rows are
/// independent; a bad row is reported and skipped.
pub async fn import_employees(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<EmployeeImportResponse>, ApiError> {
    let scope = panel_state_scope(&state, &auth).await?;
    let (file_name, bytes) = read_upload(&mut multipart).await?;

    let archive = imports::parse_employee_zip(&bytes)
        .map_err(|e| ApiError::Validation(format!("Invalid employee archive: {}", e)))?;

    let mut results = Vec::with_capacity(archive.rows.len());
    let mut created = 0;
    for row in &archive.rows {
        let request = CreateEmployeeRequest {
            email: row.email.clone(),
            name: row.name.clone(),
            state: row.state.clone(),
            password: row.password.clone(),
            company_name: Some(row.company_name.clone()).filter(|v| !v.is_empty()),
            employee_code: Some(row.employee_code.clone()).filter(|v| !v.is_empty()),
            mobile_number: Some(row.mobile_number.clone()).filter(|v| !v.is_empty()),
        };

        if let Some(scope) = scope.as_deref() {
            if !request.state.eq_ignore_ascii_case(scope) {
                results.push(EmployeeImportRow {
                    row: row.row,
                    email: row.email.clone(),
                    status: "error".to_string(),
                    message: Some("Employee belongs to another state".to_string()),
                    warnings: vec![],
                });
                continue;
            }
        }

        match create_account(&state, &request).await {
            Ok(user) => {
                let mut warnings = Vec::new();
                for kind in [PhotoKind::Passport, PhotoKind::Signature] {
                    match archive.photos.get(&(row.email.clone(), kind)) {
                        Some(photo) => {
                            if let Err(e) =
                                store_photo(&state, user.id, kind, &photo.file_name, &photo.data)
                                    .await
                            {
                                warnings.push(format!("Photo not stored: {}", e));
                            }
                        }
                        None => warnings.push(match kind {
                            PhotoKind::Passport => "No passport photo in archive".to_string(),
                            PhotoKind::Signature => "No signature photo in archive".to_string(),
                        }),
                    }
                }
                created += 1;
                results.push(EmployeeImportRow {
                    row: row.row,
                    email: row.email.clone(),
                    status: "created".to_string(),
                    message: None,
                    warnings,
                });
            }
            Err(e) => {
                results.push(EmployeeImportRow {
                    row: row.row,
                    email: row.email.clone(),
                    status: "error".to_string(),
                    message: Some(e.to_string()),
                    warnings: vec![],
                });
            }
        }
    }

    record_import_rows("employees", created);
    tracing::info!(
        file = %file_name,
        created,
        failed = results.len() - created,
        "Employee import finished"
    );

    Ok(Json(EmployeeImportResponse {
        created,
        failed: results.len() - created,
        results,
    }))
}

/// GET /api/v1/panel/employees
pub async fn list_employees(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<EmployeeResponse>>, ApiError> {
    let scope = panel_state_scope(&state, &auth).await?;

    let employees = EmployeeRepository::new(state.pool.clone());
    let records = employees.list(scope.as_deref()).await?;

    let base = &state.config.storage.public_base_url;
    Ok(Json(
        records
            .into_iter()
            .map(|r| employee_response(r, base))
            .collect(),
    ))
}

/// GET /api/v1/panel/employees/:id
pub async fn get_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let scope = panel_state_scope(&state, &auth).await?;

    let employees = EmployeeRepository::new(state.pool.clone());
    let record = employees
        .find_record_by_id(employee_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;
    check_scope(&record.state, scope.as_deref())?;

    Ok(Json(employee_response(
        record,
        &state.config.storage.public_base_url,
    )))
}

/// Shared update path for the panel and superadmin endpoints.
pub(crate) async fn apply_update(
    state: &AppState,
    employee_id: Uuid,
    scope: Option<&str>,
    request: &UpdateEmployeeRequest,
) -> Result<EmployeeResponse, ApiError> {
    request.validate()?;

    let employees = EmployeeRepository::new(state.pool.clone());
    let record = employees
        .find_record_by_id(employee_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;
    check_scope(&record.state, scope)?;

    if request.name.is_some() || request.state.is_some() {
        let users = UserRepository::new(state.pool.clone());
        users
            .update_profile(employee_id, request.name.as_deref(), request.state.as_deref())
            .await?
            .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;
    }

    if request.company_name.is_some()
        || request.employee_code.is_some()
        || request.mobile_number.is_some()
    {
        employees
            .upsert_profile(
                employee_id,
                request.company_name.as_deref(),
                request.employee_code.as_deref(),
                request.mobile_number.as_deref(),
            )
            .await?;
    }

    let updated = employees
        .find_record_by_id(employee_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;
    Ok(employee_response(
        updated,
        &state.config.storage.public_base_url,
    ))
}

/// PUT /api/v1/panel/employees/:id
pub async fn update_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let scope = panel_state_scope(&state, &auth).await?;
    let response = apply_update(&state, employee_id, scope.as_deref(), &request).await?;
    Ok(Json(response))
}

/// DELETE /api/v1/panel/employees/:id
pub async fn delete_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let scope = panel_state_scope(&state, &auth).await?;

    let employees = EmployeeRepository::new(state.pool.clone());
    let record = employees
        .find_record_by_id(employee_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;
    check_scope(&record.state, scope.as_deref())?;

    let users = UserRepository::new(state.pool.clone());
    let deleted = users.delete(employee_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Employee not found".into()));
    }

    tracing::info!(employee = %record.email, deleted_by = %auth.user_id, "Employee deleted");
    Ok(Json(serde_json::json!({ "deleted": employee_id })))
}

async fn set_active(
    state: &AppState,
    auth: &AuthUser,
    employee_id: Uuid,
    active: bool,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let scope = panel_state_scope(state, auth).await?;

    let employees = EmployeeRepository::new(state.pool.clone());
    let record = employees
        .find_record_by_id(employee_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;
    check_scope(&record.state, scope.as_deref())?;

    let users = UserRepository::new(state.pool.clone());
    users
        .set_active(employee_id, active)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;

    let updated = employees
        .find_record_by_id(employee_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;

    tracing::info!(employee = %updated.email, active, "Employee activation changed");
    Ok(Json(employee_response(
        updated,
        &state.config.storage.public_base_url,
    )))
}

/// POST /api/v1/panel/employees/:id/suspend
pub async fn suspend_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    set_active(&state, &auth, employee_id, false).await
}

/// POST /api/v1/panel/employees/:id/activate
pub async fn activate_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    set_active(&state, &auth, employee_id, true).await
}

/// GET /api/v1/panel/employees/export
pub async fn export_employees(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Response, ApiError> {
    let scope = panel_state_scope(&state, &auth).await?;

    let employees = EmployeeRepository::new(state.pool.clone());
    let records = employees.list(scope.as_deref()).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "email",
            "name",
            "state",
            "global_code",
            "state_code",
            "company_name",
            "employee_code",
            "mobile_number",
            "active",
        ])
        .map_err(|e| ApiError::Internal(format!("Failed to render CSV: {}", e)))?;
    for record in &records {
        writer
            .write_record([
                record.email.as_str(),
                record.name.as_str(),
                record.state.as_str(),
                record.global_code.as_str(),
                record.state_code.as_str(),
                record.company_name.as_deref().unwrap_or(""),
                record.employee_code.as_deref().unwrap_or(""),
                record.mobile_number.as_deref().unwrap_or(""),
                if record.is_active { "yes" } else { "no" },
            ])
            .map_err(|e| ApiError::Internal(format!("Failed to render CSV: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("Failed to render CSV: {}", e)))?;

    let file_name = timestamped_filename("employees", "csv");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_check_scope_hides_cross_state_records() {
        assert!(check_scope("Telangana", Some("Telangana")).is_ok());
        assert!(check_scope("Telangana", None).is_ok());
        assert!(matches!(
            check_scope("Odisha", Some("Telangana")),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_employee_response_builds_photo_urls() {
        let record = EmployeeRecordEntity {
            id: Uuid::new_v4(),
            email: "e@example.com".to_string(),
            name: "E".to_string(),
            role: "employee".to_string(),
            state: "Telangana".to_string(),
            global_code: "USR-0009".to_string(),
            state_code: "TE-EMP-004".to_string(),
            is_active: true,
            company_name: None,
            employee_code: None,
            mobile_number: None,
            passport_photo: Some("passports/abc.jpg".to_string()),
            signature_photo: None,
            created_at: Utc::now(),
        };
        let response = employee_response(record, "/media");
        assert_eq!(
            response.passport_photo_url.as_deref(),
            Some("/media/passports/abc.jpg")
        );
        assert!(response.signature_photo_url.is_none());
    }
}
