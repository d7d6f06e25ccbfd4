//! Superadmin endpoints: cross-state visibility, admin accounts and
//! offline sync conflict resolution.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain::models::dashboard::{StateSummary, StateTaskBreakdown, SuperadminDashboard};
use domain::models::employee::{CreateEmployeeRequest, EmployeeResponse, UpdateEmployeeRequest};
use domain::models::sync_conflict::{ResolveConflictRequest, SyncConflict};
use domain::models::task::TaskResponse;
use domain::models::user::{CreateAdminRequest, UpdateUserRequest, UserResponse, UserRole};
use domain::models::User;
use persistence::repositories::{
    DashboardRepository, EmployeeRepository, ReportRepository, SyncConflictRepository, TaskFilter,
    TaskRepository, UserRepository,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::AuthUser;
use crate::routes::employees::{self, employee_response};
use crate::routes::tasks::task_response;

/// GET /api/v1/superadmin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<SuperadminDashboard>, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    let dashboards = DashboardRepository::new(state.pool.clone());
    let reports = ReportRepository::new(state.pool.clone());

    let total_admins = users.count_by_role(UserRole::Admin, None).await?;
    let total_employees = users.count_by_role(UserRole::Employee, None).await?;
    let totals = dashboards.task_status_totals(None).await?;
    let total_reports = reports.count(None).await?;

    Ok(Json(SuperadminDashboard {
        total_admins,
        total_employees,
        total_tasks: totals.total,
        total_reports,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatewiseResponse {
    pub states: Vec<StateSummary>,
    pub tasks: Vec<StateTaskBreakdown>,
}

/// GET /api/v1/superadmin/statewise
///
/// Merges the per-state groupings into one row per state that has any
/// users, tasks or reports.
pub async fn statewise_summary(
    State(state): State<AppState>,
) -> Result<Json<StatewiseResponse>, ApiError> {
    let dashboards = DashboardRepository::new(state.pool.clone());

    let mut summaries: BTreeMap<String, StateSummary> = BTreeMap::new();
    let mut breakdowns: BTreeMap<String, StateTaskBreakdown> = BTreeMap::new();

    fn summary_entry<'a>(
        map: &'a mut BTreeMap<String, StateSummary>,
        state: &str,
    ) -> &'a mut StateSummary {
        map.entry(state.to_string()).or_insert_with(|| StateSummary {
            state: state.to_string(),
            admins: 0,
            employees: 0,
            tasks: 0,
            reports: 0,
        })
    }

    for (state_name, role, count) in dashboards.users_by_state_role().await? {
        let entry = summary_entry(&mut summaries, &state_name);
        match role.as_str() {
            "admin" => entry.admins += count,
            "employee" => entry.employees += count,
            _ => {}
        }
    }

    for (state_name, status, count) in dashboards.tasks_by_state_status().await? {
        summary_entry(&mut summaries, &state_name).tasks += count;
        let entry = breakdowns
            .entry(state_name.clone())
            .or_insert_with(|| StateTaskBreakdown {
                state: state_name.clone(),
                pending: 0,
                in_progress: 0,
                completed: 0,
            });
        match status.as_str() {
            "pending" => entry.pending += count,
            "in_progress" => entry.in_progress += count,
            "completed" => entry.completed += count,
            _ => {}
        }
    }

    for (state_name, count) in dashboards.reports_by_state().await? {
        summary_entry(&mut summaries, &state_name).reports += count;
    }

    Ok(Json(StatewiseResponse {
        states: summaries.into_values().collect(),
        tasks: breakdowns.into_values().collect(),
    }))
}

/// GET /api/v1/superadmin/admins
pub async fn list_admins(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    let admins = users.list_by_role(UserRole::Admin, None).await?;

    Ok(Json(
        admins
            .into_iter()
            .map(|e| User::from(e).into())
            .collect(),
    ))
}

/// POST /api/v1/superadmin/admins
pub async fn create_admin(
    State(state): State<AppState>,
    Json(request): Json<CreateAdminRequest>,
) -> Result<Json<UserResponse>, ApiError> {
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
            UserRole::Admin,
            request.state.trim(),
        )
        .await?;

    tracing::info!(admin = %user.email, state_code = %user.state_code, "Admin created");
    Ok(Json(User::from(user).into()))
}

async fn find_admin(
    users: &UserRepository,
    admin_id: Uuid,
) -> Result<persistence::entities::UserEntity, ApiError> {
    users
        .find_by_id(admin_id)
        .await?
        .filter(|u| u.role == "admin")
        .ok_or_else(|| ApiError::NotFound("Admin not found".into()))
}

/// PUT /api/v1/superadmin/admins/:id
pub async fn update_admin(
    State(state): State<AppState>,
    Path(admin_id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    request.validate()?;

    let users = UserRepository::new(state.pool.clone());
    find_admin(&users, admin_id).await?;

    let updated = users
        .update_profile(admin_id, request.name.as_deref(), request.state.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".into()))?;

    Ok(Json(User::from(updated).into()))
}

/// DELETE /api/v1/superadmin/admins/:id
///
/// Deactivates rather than deletes: the admin's assignment history
/// stays attributable.
pub async fn deactivate_admin(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(admin_id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    find_admin(&users, admin_id).await?;

    let updated = users
        .set_active(admin_id, false)
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".into()))?;

    tracing::info!(admin = %updated.email, deactivated_by = %auth.user_id, "Admin deactivated");
    Ok(Json(User::from(updated).into()))
}

/// GET /api/v1/superadmin/employees
pub async fn list_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmployeeResponse>>, ApiError> {
    let repo = EmployeeRepository::new(state.pool.clone());
    let records = repo.list(None).await?;

    let base = &state.config.storage.public_base_url;
    Ok(Json(
        records
            .into_iter()
            .map(|r| employee_response(r, base))
            .collect(),
    ))
}

/// POST /api/v1/superadmin/employees
pub async fn create_employee(
    State(state): State<AppState>,
    Json(request): Json<CreateEmployeeRequest>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let user = employees::create_account(&state, &request).await?;

    let repo = EmployeeRepository::new(state.pool.clone());
    let record = repo
        .find_record_by_id(user.id)
        .await?
        .ok_or_else(|| ApiError::Internal("Employee record missing after create".into()))?;

    Ok(Json(employee_response(
        record,
        &state.config.storage.public_base_url,
    )))
}

/// PUT /api/v1/superadmin/employees/:id
pub async fn update_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let response = employees::apply_update(&state, employee_id, None, &request).await?;
    Ok(Json(response))
}

/// DELETE /api/v1/superadmin/employees/:id
pub async fn delete_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repo = EmployeeRepository::new(state.pool.clone());
    let record = repo
        .find_record_by_id(employee_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;

    let users = UserRepository::new(state.pool.clone());
    let deleted = users.delete(employee_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Employee not found".into()));
    }

    tracing::info!(employee = %record.email, deleted_by = %auth.user_id, "Employee deleted");
    Ok(Json(serde_json::json!({ "deleted": employee_id })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictListQuery {
    #[serde(default)]
    pub include_resolved: bool,
}

/// GET /api/v1/superadmin/conflicts
pub async fn list_conflicts(
    State(state): State<AppState>,
    Query(query): Query<ConflictListQuery>,
) -> Result<Json<Vec<SyncConflict>>, ApiError> {
    let conflicts = SyncConflictRepository::new(state.pool.clone());
    let rows = conflicts.list(query.include_resolved).await?;
    Ok(Json(rows.into_iter().map(SyncConflict::from).collect()))
}

/// POST /api/v1/superadmin/conflicts/:id/resolve
pub async fn resolve_conflict(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(conflict_id): Path<i64>,
    Json(request): Json<ResolveConflictRequest>,
) -> Result<Json<SyncConflict>, ApiError> {
    let conflicts = SyncConflictRepository::new(state.pool.clone());

    match conflicts.resolve(conflict_id, &request.resolved_data).await? {
        Some(resolved) => {
            tracing::info!(conflict_id, resolved_by = %auth.user_id, "Sync conflict resolved");
            Ok(Json(SyncConflict::from(resolved)))
        }
        None => match conflicts.find_by_id(conflict_id).await? {
            Some(_) => Err(ApiError::Conflict(
                "Conflict has already been resolved".into(),
            )),
            None => Err(ApiError::NotFound("Conflict not found".into())),
        },
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub state: Option<String>,
}

/// GET /api/v1/superadmin/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = TaskRepository::new(state.pool.clone());
    let rows = tasks
        .list(TaskFilter {
            state: query.state.as_deref().filter(|s| !s.is_empty()),
            status: None,
            cluster: None,
            assignee_id: None,
        })
        .await?;

    Ok(Json(rows.into_iter().map(task_response).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_list_query_defaults_to_unresolved() {
        let query: ConflictListQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.include_resolved);

        let query: ConflictListQuery =
            serde_json::from_str(r#"{"includeResolved": true}"#).unwrap();
        assert!(query.include_resolved);
    }
}
