//! Report entities.

use chrono::{DateTime, Utc};
use domain::models::report::{Report, ReportFile, ReportStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `reports` table.
#[derive(Debug, Clone, FromRow)]
pub struct ReportEntity {
    pub id: Uuid,
    pub task_id: i64,
    pub employee_id: Uuid,
    pub answers: serde_json::Value,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl From<ReportEntity> for Report {
    fn from(e: ReportEntity) -> Self {
        Report {
            id: e.id,
            task_id: e.task_id,
            employee_id: e.employee_id,
            answers: e.answers,
            status: ReportStatus::parse(&e.status).unwrap_or(ReportStatus::InProgress),
            rejection_reason: e.rejection_reason,
            submitted_at: e.submitted_at,
            approved_at: e.approved_at,
        }
    }
}

/// Row of the `report_files` table.
#[derive(Debug, Clone, FromRow)]
pub struct ReportFileEntity {
    pub id: i64,
    pub report_id: Uuid,
    pub label: String,
    pub path: String,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

impl From<ReportFileEntity> for ReportFile {
    fn from(e: ReportFileEntity) -> Self {
        ReportFile {
            id: e.id,
            report_id: e.report_id,
            label: e.label,
            path: e.path,
            uploaded_by: e.uploaded_by,
            uploaded_at: e.uploaded_at,
        }
    }
}

/// Report joined with its task and employee, used for detail and
/// listing views.
#[derive(Debug, Clone, FromRow)]
pub struct ReportDetailRow {
    pub id: Uuid,
    pub task_id: i64,
    pub task_code: Option<String>,
    pub task_title: String,
    pub site_global_id: String,
    pub site_name: String,
    pub state: String,
    pub employee_id: Uuid,
    pub employee_email: String,
    pub employee_name: String,
    pub answers: serde_json::Value,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_from_entity() {
        let entity = ReportEntity {
            id: Uuid::new_v4(),
            task_id: 3,
            employee_id: Uuid::new_v4(),
            answers: serde_json::json!({"engine_oil_level": "ok"}),
            status: "pending".to_string(),
            rejection_reason: None,
            submitted_at: Utc::now(),
            approved_at: None,
        };
        let report = Report::from(entity);
        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(report.answers["engine_oil_level"], "ok");
    }
}
