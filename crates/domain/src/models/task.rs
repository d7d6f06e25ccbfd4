//! Task domain model and status lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Parses from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }

    /// Whether the status can move to `next`.
    ///
    /// Forward transitions follow pending to in_progress to completed;
    /// a report rejection moves a completed task back to in_progress.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::InProgress)
                | (TaskStatus::InProgress, TaskStatus::Completed)
                | (TaskStatus::Completed, TaskStatus::InProgress)
        )
    }
}

/// Represents an assigned maintenance task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    /// Human-readable code derived from the row id, e.g. `T100001`.
    pub task_code: String,
    pub site_global_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
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

/// Task payload returned by the API, with the assignee denormalized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub task_code: String,
    pub site_global_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub task_type: String,
    pub cluster: String,
    pub site_name: String,
    pub state: String,
    pub planned_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for assigning a single task.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignTaskRequest {
    #[validate(length(min = 1, message = "Site global id is required"))]
    pub site_global_id: String,

    #[validate(email(message = "Invalid employee email"))]
    pub employee_email: String,

    #[validate(length(min = 1, max = 200, message = "Task name must be 1-200 characters"))]
    pub task_name: String,

    #[validate(length(min = 1, message = "Task type is required"))]
    pub task_type: String,

    pub description: Option<String>,

    /// Accepted as `DD-MM-YY` or `YYYY-MM-DD`.
    pub planned_date: Option<String>,

    /// Accepted as `DD-MM-YY` or `YYYY-MM-DD`.
    pub deadline: Option<String>,
}

/// One row outcome of a bulk task assignment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskImportRow {
    pub row: usize,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Parses a date in either `DD-MM-YY` or `YYYY-MM-DD` form.
pub fn parse_flexible_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%d-%m-%y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}
