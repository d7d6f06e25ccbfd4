//! Dashboard aggregate models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::task::TaskStatus;
use crate::models::user::UserRole;

/// Task titles shown as dashboard cards, in display order.
pub const TASK_TITLES: &[&str] = &["DG PM", "DG CM", "AC PM", "AC CM", "Site Visit"];

/// Per-title task count card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCard {
    pub title: String,
    pub total: i64,
    pub completed: i64,
}

/// Per-cluster task totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStat {
    pub cluster: String,
    pub total: i64,
    pub completed: i64,
}

/// Recent assignment entry on the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTask {
    pub task_code: String,
    pub title: String,
    pub site_name: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Recent employee entry on the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEmployee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub state_code: String,
    pub created_at: DateTime<Utc>,
}

/// Admin-panel dashboard payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub total_employees: i64,
    pub total_tasks: i64,
    pub pending_tasks: i64,
    pub in_progress_tasks: i64,
    pub completed_tasks: i64,
    pub task_cards: Vec<TaskCard>,
    pub cluster_stats: Vec<ClusterStat>,
    pub recent_tasks: Vec<RecentTask>,
    pub recent_employees: Vec<RecentEmployee>,
}

/// Superadmin dashboard counters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperadminDashboard {
    pub total_admins: i64,
    pub total_employees: i64,
    pub total_tasks: i64,
    pub total_reports: i64,
}

/// Per-state entity counts for the superadmin state-wise view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSummary {
    pub state: String,
    pub admins: i64,
    pub employees: i64,
    pub tasks: i64,
    pub reports: i64,
}

/// Per-state task status breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTaskBreakdown {
    pub state: String,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
}

/// Employee-facing dashboard counters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDashboard {
    pub total_tasks: i64,
    pub pending_tasks: i64,
    pub in_progress_tasks: i64,
    pub completed_tasks: i64,
    pub rejected_reports: i64,
}

/// Role-tagged counter used internally when aggregating per state.
#[derive(Debug, Clone)]
pub struct RoleCount {
    pub role: UserRole,
    pub count: i64,
}
