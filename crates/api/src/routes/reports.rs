//! Field report submission, review and export endpoints.

use std::collections::HashMap;

use axum::extract::{FromRequest, Multipart, Path, Query, State};
use axum::http::header::{self, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain::models::report::{
    ReportDetail, ReportFileView, ReportStatus, ReviewAction, ReviewReportRequest,
};
use domain::models::task::TaskStatus;
use domain::services::geofence::{self, GeofenceDecision};
use persistence::entities::{ReportDetailRow, ReportFileEntity};
use persistence::repositories::{ReportRepository, SiteRepository, TaskRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_geofence_rejection, record_report_submitted};
use crate::middleware::user_auth::AuthUser;
use crate::routes::panel_state_scope;
use crate::services::report_export::{self, timestamped_filename};
use crate::services::storage;

/// Compact entry for report listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListItem {
    pub id: Uuid,
    pub task_code: String,
    pub task_title: String,
    pub site_name: String,
    pub employee_name: String,
    pub state: String,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

fn list_item(row: ReportDetailRow) -> ReportListItem {
    ReportListItem {
        id: row.id,
        task_code: row.task_code.unwrap_or_default(),
        task_title: row.task_title,
        site_name: row.site_name,
        employee_name: row.employee_name,
        state: row.state,
        status: ReportStatus::parse(&row.status).unwrap_or(ReportStatus::Pending),
        rejection_reason: row.rejection_reason,
        submitted_at: row.submitted_at,
    }
}

fn detail_response(
    row: ReportDetailRow,
    files: Vec<ReportFileEntity>,
    public_base_url: &str,
) -> ReportDetail {
    ReportDetail {
        id: row.id,
        task_code: row.task_code.unwrap_or_default(),
        task_title: row.task_title,
        site_global_id: row.site_global_id,
        site_name: row.site_name,
        employee_email: row.employee_email,
        employee_name: row.employee_name,
        status: ReportStatus::parse(&row.status).unwrap_or(ReportStatus::Pending),
        rejection_reason: row.rejection_reason,
        answers: row.answers,
        files: files
            .into_iter()
            .map(|f| ReportFileView {
                label: f.label,
                url: storage::public_url(public_base_url, &f.path),
            })
            .collect(),
        submitted_at: row.submitted_at,
        approved_at: row.approved_at,
    }
}

/// Loads a report detail row and applies the panel state scope. A
/// cross-state report reads as missing.
async fn load_scoped_detail(
    state: &AppState,
    auth: &AuthUser,
    report_id: Uuid,
) -> Result<ReportDetailRow, ApiError> {
    let scope = panel_state_scope(state, auth).await?;
    let reports = ReportRepository::new(state.pool.clone());

    let row = reports
        .find_detail(report_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;

    if let Some(scope) = scope.as_deref() {
        if row.state != scope {
            return Err(ApiError::NotFound("Report not found".into()));
        }
    }
    Ok(row)
}

#[derive(Debug, Deserialize)]
pub struct ReportListQuery {
    pub status: Option<String>,
}

/// GET /api/v1/panel/reports
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ReportListQuery>,
) -> Result<Json<Vec<ReportListItem>>, ApiError> {
    let scope = panel_state_scope(&state, &auth).await?;

    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            ReportStatus::parse(raw)
                .ok_or_else(|| ApiError::Validation(format!("Unknown status: {}", raw)))?,
        ),
    };

    let reports = ReportRepository::new(state.pool.clone());
    let rows = reports.list(scope.as_deref(), status).await?;

    Ok(Json(rows.into_iter().map(list_item).collect()))
}

/// GET /api/v1/panel/reports/:id
pub async fn get_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
) -> Result<Json<ReportDetail>, ApiError> {
    let row = load_scoped_detail(&state, &auth, report_id).await?;

    let reports = ReportRepository::new(state.pool.clone());
    let files = reports.files_for(report_id).await?;

    Ok(Json(detail_response(
        row,
        files,
        &state.config.storage.public_base_url,
    )))
}

/// POST /api/v1/panel/reports/:id/review
///
/// Approving completes the task; rejecting reopens it so the employee
/// can resubmit. A decided report cannot be reviewed again.
pub async fn review_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
    Json(request): Json<ReviewReportRequest>,
) -> Result<Json<ReportDetail>, ApiError> {
    request.validate()?;
    let row = load_scoped_detail(&state, &auth, report_id).await?;

    let current = ReportStatus::parse(&row.status)
        .ok_or_else(|| ApiError::Internal(format!("Unknown report status: {}", row.status)))?;
    if !current.is_reviewable() {
        return Err(ApiError::Conflict("Report has already been reviewed".into()));
    }

    let reports = ReportRepository::new(state.pool.clone());
    let tasks = TaskRepository::new(state.pool.clone());

    let task_status = match request.action {
        ReviewAction::Approve => {
            reports
                .update_review(report_id, ReportStatus::Approved, None, Some(Utc::now()))
                .await?
                .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;
            TaskStatus::Completed
        }
        ReviewAction::Reject => {
            let reason = request
                .reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .ok_or_else(|| ApiError::Validation("Rejection reason is required".into()))?;
            reports
                .update_review(report_id, ReportStatus::Rejected, Some(reason), None)
                .await?
                .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;
            TaskStatus::InProgress
        }
    };

    if let Some(task) = tasks.find_by_id(row.task_id).await? {
        let current_task = TaskStatus::parse(&task.status).unwrap_or(TaskStatus::Pending);
        if current_task != task_status && current_task.can_transition_to(task_status) {
            tasks.update_status(task.id, task_status).await?;
        }
    }

    tracing::info!(report_id = %report_id, action = ?request.action, reviewer = %auth.user_id, "Report reviewed");

    let updated = reports
        .find_detail(report_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;
    let files = reports.files_for(report_id).await?;
    Ok(Json(detail_response(
        updated,
        files,
        &state.config.storage.public_base_url,
    )))
}

fn attachment_response(bytes: Vec<u8>, content_type: &str, file_name: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// GET /api/v1/panel/reports/:id/export/csv
pub async fn export_report_csv(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let row = load_scoped_detail(&state, &auth, report_id).await?;
    let reports = ReportRepository::new(state.pool.clone());
    let files = reports.files_for(report_id).await?;

    let detail = detail_response(row, files, &state.config.storage.public_base_url);
    let bytes = report_export::report_csv(&detail)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let file_name = timestamped_filename(&format!("report_{}", detail.task_code), "csv");
    Ok(attachment_response(bytes, "text/csv", file_name))
}

/// GET /api/v1/panel/reports/:id/export/pdf
pub async fn export_report_pdf(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let row = load_scoped_detail(&state, &auth, report_id).await?;
    let reports = ReportRepository::new(state.pool.clone());
    let files = reports.files_for(report_id).await?;

    let detail = detail_response(row, files, &state.config.storage.public_base_url);
    let bytes = report_export::report_pdf(&detail)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let file_name = timestamped_filename(&format!("report_{}", detail.task_code), "pdf");
    Ok(attachment_response(bytes, "application/pdf", file_name))
}

/// GET /api/v1/employee/reports
pub async fn my_reports(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ReportListItem>>, ApiError> {
    let reports = ReportRepository::new(state.pool.clone());
    let rows = reports.list_for_employee(auth.user_id).await?;
    Ok(Json(rows.into_iter().map(list_item).collect()))
}

/// GET /api/v1/employee/reports/:id
pub async fn my_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
) -> Result<Json<ReportDetail>, ApiError> {
    let reports = ReportRepository::new(state.pool.clone());
    let row = reports
        .find_detail(report_id)
        .await?
        .filter(|row| row.employee_id == auth.user_id)
        .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;

    let files = reports.files_for(report_id).await?;
    Ok(Json(detail_response(
        row,
        files,
        &state.config.storage.public_base_url,
    )))
}

/// Report submission payload. The same shape arrives as JSON or as the
/// text fields of a multipart body.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportRequest {
    #[validate(length(min = 1, message = "Task code is required"))]
    pub task_code: String,

    #[serde(default)]
    pub answers: serde_json::Value,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

struct UploadedFile {
    label: String,
    file_name: String,
    data: Vec<u8>,
}

/// Reads a multipart submission: text fields plus any number of
/// `file_<n>` parts, each optionally labelled by `file_label_<n>`.
async fn read_multipart_submission(
    multipart: &mut Multipart,
) -> Result<(SubmitReportRequest, Vec<UploadedFile>), ApiError> {
    let mut request = SubmitReportRequest::default();
    let mut files: Vec<(String, String, Vec<u8>)> = Vec::new();
    let mut labels: HashMap<String, String> = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_some() {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Failed to read upload: {}", e)))?
                .to_vec();
            files.push((name, file_name, data));
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?;
        match name.as_str() {
            "taskCode" | "task_code" => request.task_code = value.trim().to_string(),
            "answers" => {
                request.answers = serde_json::from_str(&value)
                    .map_err(|e| ApiError::Validation(format!("Invalid answers JSON: {}", e)))?;
            }
            "latitude" => {
                request.latitude = Some(value.trim().parse().map_err(|_| {
                    ApiError::Validation(format!("Invalid latitude: {}", value))
                })?);
            }
            "longitude" => {
                request.longitude = Some(value.trim().parse().map_err(|_| {
                    ApiError::Validation(format!("Invalid longitude: {}", value))
                })?);
            }
            other if other.starts_with("file_label_") => {
                let index = other.trim_start_matches("file_label_").to_string();
                labels.insert(index, value);
            }
            _ => {}
        }
    }

    let files = files
        .into_iter()
        .map(|(name, file_name, data)| {
            let index = name.trim_start_matches("file_");
            let label = labels
                .get(index)
                .cloned()
                .unwrap_or_else(|| file_name.clone());
            UploadedFile {
                label,
                file_name,
                data,
            }
        })
        .collect();

    Ok((request, files))
}

/// POST /api/v1/employee/reports
///
/// Accepts JSON, or multipart when photos accompany the answers.
/// Submission is refused outside the site's geofence when the site has
/// coordinates. A resubmission replaces earlier rejected reports for
/// the task.
pub async fn submit_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    headers: HeaderMap,
    body: axum::extract::Request,
) -> Result<Json<ReportDetail>, ApiError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let (request, uploads) = if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(body, &state)
            .await
            .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?;
        read_multipart_submission(&mut multipart).await?
    } else {
        let bytes = axum::body::to_bytes(body.into_body(), usize::MAX)
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read body: {}", e)))?;
        let request: SubmitReportRequest = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Validation(format!("Invalid JSON body: {}", e)))?;
        (request, Vec::new())
    };
    request.validate()?;

    if let Some(latitude) = request.latitude {
        shared::validation::validate_latitude(latitude)
            .map_err(|e| ApiError::Validation(e.to_string()))?;
    }
    if let Some(longitude) = request.longitude {
        shared::validation::validate_longitude(longitude)
            .map_err(|e| ApiError::Validation(e.to_string()))?;
    }
    if !request.answers.is_object() {
        return Err(ApiError::Validation("Answers must be a JSON object".into()));
    }

    let tasks = TaskRepository::new(state.pool.clone());
    let task = tasks
        .find_by_code(&request.task_code)
        .await?
        .filter(|t| t.assignee_id == Some(auth.user_id))
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;

    let sites = SiteRepository::new(state.pool.clone());
    let site_coords = sites
        .find_by_global_id(&task.site_global_id)
        .await?
        .and_then(|s| Some((s.latitude?, s.longitude?)));
    let submitted_coords = request.latitude.zip(request.longitude);

    match geofence::check(site_coords, submitted_coords) {
        GeofenceDecision::Outside(distance) => {
            record_geofence_rejection();
            return Err(ApiError::Forbidden(format!(
                "Submission is {:.0} m from the site, outside the allowed radius",
                distance
            )));
        }
        decision => {
            tracing::debug!(task_code = %request.task_code, ?decision, "Geofence check passed");
        }
    }

    let reports = ReportRepository::new(state.pool.clone());
    reports.delete_rejected_for(task.id, auth.user_id).await?;

    let report = reports
        .create(task.id, auth.user_id, &request.answers, ReportStatus::InProgress)
        .await?;

    for upload in &uploads {
        let stored = storage::save_file(
            &state.config.storage.media_dir,
            "reports",
            &upload.file_name,
            &upload.data,
        )
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to store file: {}", e)))?;
        reports
            .add_file(report.id, &upload.label, &stored, auth.user_id)
            .await?;
    }

    let task_status = TaskStatus::parse(&task.status).unwrap_or(TaskStatus::Pending);
    if task_status.can_transition_to(TaskStatus::InProgress) {
        tasks.update_status(task.id, TaskStatus::InProgress).await?;
    }

    record_report_submitted(ReportStatus::InProgress.as_str());
    tracing::info!(report_id = %report.id, task_code = %request.task_code, "Report submitted");

    let row = reports
        .find_detail(report.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;
    let files = reports.files_for(report.id).await?;
    Ok(Json(detail_response(
        row,
        files,
        &state.config.storage.public_base_url,
    )))
}

/// POST /api/v1/employee/reports/:id/files
///
/// Attaches one file to an existing report. The `label` text field
/// names the attachment; without it the file name is used.
pub async fn upload_report_file(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ReportFileView>, ApiError> {
    let reports = ReportRepository::new(state.pool.clone());
    let report = reports
        .find_by_id(report_id)
        .await?
        .filter(|r| r.employee_id == auth.user_id)
        .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;

    let mut label: Option<String> = None;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.file_name().is_some() {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Failed to read upload: {}", e)))?;
            upload = Some((file_name, data.to_vec()));
        } else if field.name() == Some("label") {
            label = Some(
                field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?,
            );
        }
    }

    let (file_name, data) =
        upload.ok_or_else(|| ApiError::Validation("No file uploaded".into()))?;
    let label = label.unwrap_or_else(|| file_name.clone());

    let stored = storage::save_file(
        &state.config.storage.media_dir,
        "reports",
        &file_name,
        &data,
    )
    .await
    .map_err(|e| ApiError::Internal(format!("Failed to store file: {}", e)))?;

    let entity = reports
        .add_file(report.id, &label, &stored, auth.user_id)
        .await?;

    Ok(Json(ReportFileView {
        label: entity.label,
        url: storage::public_url(&state.config.storage.public_base_url, &entity.path),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail_row(status: &str) -> ReportDetailRow {
        ReportDetailRow {
            id: Uuid::new_v4(),
            task_id: 1,
            task_code: Some("T100001".to_string()),
            task_title: "DG PM".to_string(),
            site_global_id: "G1".to_string(),
            site_name: "Site".to_string(),
            state: "Telangana".to_string(),
            employee_id: Uuid::new_v4(),
            employee_email: "e@example.com".to_string(),
            employee_name: "E".to_string(),
            answers: serde_json::json!({"remarks": "ok"}),
            status: status.to_string(),
            rejection_reason: None,
            submitted_at: Utc::now(),
            approved_at: None,
        }
    }

    #[test]
    fn test_detail_response_builds_file_urls() {
        let row = detail_row("pending");
        let files = vec![ReportFileEntity {
            id: 1,
            report_id: row.id,
            label: "Engine photo".to_string(),
            path: "reports/abc_photo.jpg".to_string(),
            uploaded_by: row.employee_id,
            uploaded_at: Utc::now(),
        }];
        let detail = detail_response(row, files, "/media");
        assert_eq!(detail.files.len(), 1);
        assert_eq!(detail.files[0].url, "/media/reports/abc_photo.jpg");
    }

    #[test]
    fn test_list_item_parses_status() {
        let item = list_item(detail_row("rejected"));
        assert_eq!(item.status, ReportStatus::Rejected);
        assert_eq!(item.task_code, "T100001");
    }

    #[test]
    fn test_submit_request_accepts_json_shape() {
        let request: SubmitReportRequest = serde_json::from_str(
            r#"{"taskCode": "T100001", "answers": {"remarks": "ok"}, "latitude": 17.4, "longitude": 78.3}"#,
        )
        .unwrap();
        assert_eq!(request.task_code, "T100001");
        assert!(request.answers.is_object());
        assert_eq!(request.latitude, Some(17.4));
    }
}
