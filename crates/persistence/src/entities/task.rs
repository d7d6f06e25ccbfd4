//! Task entities.

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::task::{Task, TaskStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `tasks` table.
///
/// `task_code` is nullable in the schema because it is derived from the
/// row id and written in a second statement of the insert transaction.
#[derive(Debug, Clone, FromRow)]
pub struct TaskEntity {
    pub id: i64,
    pub task_code: Option<String>,
    pub site_global_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub task_type: String,
    pub cluster: String,
    pub site_name: String,
    pub state: String,
    pub planned_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,
    pub assigned_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskEntity> for Task {
    fn from(e: TaskEntity) -> Self {
        Task {
            id: e.id,
            task_code: e.task_code.unwrap_or_default(),
            site_global_id: e.site_global_id,
            title: e.title,
            description: e.description,
            status: TaskStatus::parse(&e.status).unwrap_or(TaskStatus::Pending),
            task_type: e.task_type,
            cluster: e.cluster,
            site_name: e.site_name,
            state: e.state,
            planned_date: e.planned_date,
            deadline: e.deadline,
            assignee_id: e.assignee_id,
            assigned_by: e.assigned_by,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Task row joined with its assignee and latest report status, used for
/// listing endpoints.
#[derive(Debug, Clone, FromRow)]
pub struct TaskListRow {
    pub id: i64,
    pub task_code: Option<String>,
    pub site_global_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub task_type: String,
    pub cluster: String,
    pub site_name: String,
    pub state: String,
    pub planned_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub assignee_email: Option<String>,
    pub assignee_name: Option<String>,
    pub report_status: Option<String>,
    pub created_at: DateTime<Utc>,
}
