//! Task assignment, listing, import and deletion endpoints.

use axum::extract::{Multipart, Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain::models::form_template::TaskGroup;
use domain::models::task::{
    parse_flexible_date, AssignTaskRequest, TaskImportRow, TaskResponse, TaskStatus,
};
use persistence::entities::{TaskEntity, TaskListRow, UserEntity};
use persistence::repositories::{SiteRepository, TaskFilter, TaskRepository, UserRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_import_rows;
use crate::middleware::user_auth::AuthUser;
use crate::routes::{panel_state_scope, read_upload};
use crate::services::imports;

pub(crate) fn task_response(row: TaskListRow) -> TaskResponse {
    TaskResponse {
        task_code: row.task_code.unwrap_or_default(),
        site_global_id: row.site_global_id,
        title: row.title,
        description: row.description,
        status: TaskStatus::parse(&row.status).unwrap_or(TaskStatus::Pending),
        task_type: row.task_type,
        cluster: row.cluster,
        site_name: row.site_name,
        state: row.state,
        planned_date: row.planned_date,
        deadline: row.deadline,
        assignee_email: row.assignee_email,
        assignee_name: row.assignee_name,
        report_status: row.report_status,
        created_at: row.created_at,
    }
}

fn entity_response(entity: TaskEntity, assignee: &UserEntity) -> TaskResponse {
    TaskResponse {
        task_code: entity.task_code.unwrap_or_default(),
        site_global_id: entity.site_global_id,
        title: entity.title,
        description: entity.description,
        status: TaskStatus::parse(&entity.status).unwrap_or(TaskStatus::Pending),
        task_type: entity.task_type,
        cluster: entity.cluster,
        site_name: entity.site_name,
        state: entity.state,
        planned_date: entity.planned_date,
        deadline: entity.deadline,
        assignee_email: Some(assignee.email.clone()),
        assignee_name: Some(assignee.name.clone()),
        report_status: None,
        created_at: entity.created_at,
    }
}

fn parse_optional_date(raw: Option<&str>, field: &str) -> Result<Option<chrono::NaiveDate>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_flexible_date(value)
            .map(Some)
            .ok_or_else(|| ApiError::Validation(format!("Invalid {}: {}", field, value))),
    }
}

/// Shared assignment path for the single endpoint and the CSV import.
///
/// The task inherits the assignee's state, which is what scopes it to
/// an admin's panel.
async fn create_assignment(
    state: &AppState,
    scope: Option<&str>,
    assigned_by: Uuid,
    request: &AssignTaskRequest,
) -> Result<(TaskEntity, UserEntity), ApiError> {
    if TaskGroup::for_task_title(&request.task_name).is_none() {
        return Err(ApiError::Validation(format!(
            "Unknown task name: {}",
            request.task_name
        )));
    }

    let sites = SiteRepository::new(state.pool.clone());
    let site = sites
        .find_by_global_id(request.site_global_id.trim())
        .await?
        .ok_or_else(|| {
            ApiError::Validation(format!("Unknown site: {}", request.site_global_id))
        })?;

    let users = UserRepository::new(state.pool.clone());
    let employee = users
        .find_by_email(&request.employee_email.trim().to_lowercase())
        .await?
        .filter(|u| u.role == "employee")
        .ok_or_else(|| {
            ApiError::Validation(format!("Unknown employee: {}", request.employee_email))
        })?;

    if !employee.is_active {
        return Err(ApiError::Validation(format!(
            "Employee is suspended: {}",
            request.employee_email
        )));
    }
    if let Some(scope) = scope {
        if employee.state != scope {
            return Err(ApiError::Forbidden(
                "Employee belongs to another state".into(),
            ));
        }
    }

    let planned_date = parse_optional_date(request.planned_date.as_deref(), "planned date")?;
    let deadline = parse_optional_date(request.deadline.as_deref(), "deadline")?;

    let tasks = TaskRepository::new(state.pool.clone());
    let entity = tasks
        .create(
            &site.global_id,
            request.task_name.trim(),
            request.description.as_deref(),
            request.task_type.trim(),
            &site.cluster,
            &site.site_name,
            &employee.state,
            planned_date,
            deadline,
            Some(employee.id),
            Some(assigned_by),
        )
        .await?;

    Ok((entity, employee))
}

/// POST /api/v1/panel/tasks
pub async fn assign_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<AssignTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    request.validate()?;
    let scope = panel_state_scope(&state, &auth).await?;

    let (entity, employee) =
        create_assignment(&state, scope.as_deref(), auth.user_id, &request).await?;

    tracing::info!(task_code = ?entity.task_code, assignee = %employee.email, "Task assigned");
    Ok(Json(entity_response(entity, &employee)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskImportResponse {
    pub created: usize,
    pub failed: usize,
    pub results: Vec<TaskImportRow>,
}

/// POST /api/v1/panel/tasks/import
///
/// Bulk assignment from CSV. Rows are independent; a bad row is
/// reported and skipped, the rest still land.
pub async fn import_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<TaskImportResponse>, ApiError> {
    let scope = panel_state_scope(&state, &auth).await?;
    let (file_name, bytes) = read_upload(&mut multipart).await?;

    let rows = imports::parse_task_rows(&bytes)
        .map_err(|e| ApiError::Validation(format!("Invalid task file: {}", e)))?;

    let mut results = Vec::with_capacity(rows.len());
    let mut created = 0;
    for row in &rows {
        let request = AssignTaskRequest {
            site_global_id: row.site_global_id.clone(),
            employee_email: row.employee_email.clone(),
            task_name: row.task_name.clone(),
            task_type: row.task_type.clone(),
            description: if row.description.is_empty() {
                None
            } else {
                Some(row.description.clone())
            },
            planned_date: Some(row.planned_date.clone()),
            deadline: Some(row.deadline.clone()),
        };

        match create_assignment(&state, scope.as_deref(), auth.user_id, &request).await {
            Ok((entity, _)) => {
                created += 1;
                results.push(TaskImportRow {
                    row: row.row,
                    status: "created".to_string(),
                    task_code: entity.task_code,
                    message: None,
                });
            }
            Err(e) => {
                results.push(TaskImportRow {
                    row: row.row,
                    status: "error".to_string(),
                    task_code: None,
                    message: Some(e.to_string()),
                });
            }
        }
    }

    record_import_rows("tasks", created);
    tracing::info!(
        file = %file_name,
        created,
        failed = results.len() - created,
        "Task import finished"
    );

    Ok(Json(TaskImportResponse {
        created,
        failed: results.len() - created,
        results,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<String>,
    pub cluster: Option<String>,
}

/// GET /api/v1/panel/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let scope = panel_state_scope(&state, &auth).await?;

    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            TaskStatus::parse(raw)
                .ok_or_else(|| ApiError::Validation(format!("Unknown status: {}", raw)))?,
        ),
    };

    let tasks = TaskRepository::new(state.pool.clone());
    let rows = tasks
        .list(TaskFilter {
            state: scope.as_deref(),
            status,
            cluster: query.cluster.as_deref(),
            assignee_id: None,
        })
        .await?;

    Ok(Json(rows.into_iter().map(task_response).collect()))
}

/// DELETE /api/v1/panel/tasks/:task_code
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(task_code): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let scope = panel_state_scope(&state, &auth).await?;

    let tasks = TaskRepository::new(state.pool.clone());
    let task = tasks
        .find_by_code(&task_code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;

    // A scoped admin cannot see tasks outside their state, so a
    // cross-state code reads as missing rather than forbidden.
    if let Some(scope) = scope.as_deref() {
        if task.state != scope {
            return Err(ApiError::NotFound("Task not found".into()));
        }
    }

    let deleted = tasks.delete_by_code(&task_code).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Task not found".into()));
    }

    tracing::info!(task_code = %task_code, deleted_by = %auth.user_id, "Task deleted");
    Ok(Json(serde_json::json!({ "deleted": task_code })))
}

/// GET /api/v1/employee/tasks
pub async fn my_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            TaskStatus::parse(raw)
                .ok_or_else(|| ApiError::Validation(format!("Unknown status: {}", raw)))?,
        ),
    };

    let tasks = TaskRepository::new(state.pool.clone());
    let rows = tasks
        .list(TaskFilter {
            state: None,
            status,
            cluster: None,
            assignee_id: Some(auth.user_id),
        })
        .await?;

    Ok(Json(rows.into_iter().map(task_response).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_optional_date_accepts_both_forms() {
        assert_eq!(
            parse_optional_date(Some("05-03-24"), "deadline").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(
            parse_optional_date(Some("2024-03-05"), "deadline").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
    }

    #[test]
    fn test_parse_optional_date_treats_blank_as_absent() {
        assert_eq!(parse_optional_date(None, "deadline").unwrap(), None);
        assert_eq!(parse_optional_date(Some("  "), "deadline").unwrap(), None);
    }

    #[test]
    fn test_parse_optional_date_rejects_garbage() {
        assert!(parse_optional_date(Some("03/05/2024"), "deadline").is_err());
    }

    #[test]
    fn test_task_response_defaults_missing_code() {
        let row = TaskListRow {
            id: 1,
            task_code: None,
            site_global_id: "G1".to_string(),
            title: "DG PM".to_string(),
            description: None,
            status: "pending".to_string(),
            task_type: "preventive".to_string(),
            cluster: "C".to_string(),
            site_name: "S".to_string(),
            state: "Telangana".to_string(),
            planned_date: None,
            deadline: None,
            assignee_email: None,
            assignee_name: None,
            report_status: None,
            created_at: chrono::Utc::now(),
        };
        let response = task_response(row);
        assert_eq!(response.task_code, "");
        assert_eq!(response.status, TaskStatus::Pending);
    }
}
