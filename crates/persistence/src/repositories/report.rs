//! Report repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::report::ReportStatus;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ReportDetailRow, ReportEntity, ReportFileEntity};
use crate::metrics::QueryTimer;

const DETAIL_COLUMNS: &str = r#"
    r.id, r.task_id, t.task_code, t.title AS task_title, t.site_global_id,
    t.site_name, t.state, r.employee_id, u.email AS employee_email,
    u.name AS employee_name, r.answers, r.status, r.rejection_reason,
    r.submitted_at, r.approved_at
"#;

const DETAIL_JOINS: &str = r#"
    JOIN tasks t ON t.id = r.task_id
    JOIN users u ON u.id = r.employee_id
"#;

/// Repository for field report database operations.
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    /// Creates a new ReportRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a report.
    pub async fn create(
        &self,
        task_id: i64,
        employee_id: Uuid,
        answers: &serde_json::Value,
        status: ReportStatus,
    ) -> Result<ReportEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_report");
        let result = sqlx::query_as::<_, ReportEntity>(
            r#"
            INSERT INTO reports (task_id, employee_id, answers, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(task_id)
        .bind(employee_id)
        .bind(answers)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete rejected reports for a task and employee, so a
    /// resubmission replaces them. Attached files cascade.
    /// Returns the number of rows deleted.
    pub async fn delete_rejected_for(
        &self,
        task_id: i64,
        employee_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_rejected_reports");
        let result = sqlx::query(
            r#"
            DELETE FROM reports
            WHERE task_id = $1 AND employee_id = $2 AND status = 'rejected'
            "#,
        )
        .bind(task_id)
        .bind(employee_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Find a report by UUID.
    pub async fn find_by_id(&self, report_id: Uuid) -> Result<Option<ReportEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_report_by_id");
        let result = sqlx::query_as::<_, ReportEntity>(
            r#"
            SELECT * FROM reports WHERE id = $1
            "#,
        )
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Latest report for a task and employee.
    pub async fn find_latest_for_task(
        &self,
        task_id: i64,
        employee_id: Uuid,
    ) -> Result<Option<ReportEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_latest_report_for_task");
        let result = sqlx::query_as::<_, ReportEntity>(
            r#"
            SELECT * FROM reports
            WHERE task_id = $1 AND employee_id = $2
            ORDER BY submitted_at DESC
            LIMIT 1
            "#,
        )
        .bind(task_id)
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Full report view joined with its task and employee.
    pub async fn find_detail(
        &self,
        report_id: Uuid,
    ) -> Result<Option<ReportDetailRow>, sqlx::Error> {
        let timer = QueryTimer::new("find_report_detail");
        let result = sqlx::query_as::<_, ReportDetailRow>(&format!(
            r#"
            SELECT {DETAIL_COLUMNS}
            FROM reports r
            {DETAIL_JOINS}
            WHERE r.id = $1
            "#
        ))
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List report views, optionally filtered by task state and status.
    pub async fn list(
        &self,
        state: Option<&str>,
        status: Option<ReportStatus>,
    ) -> Result<Vec<ReportDetailRow>, sqlx::Error> {
        let timer = QueryTimer::new("list_reports");
        let result = sqlx::query_as::<_, ReportDetailRow>(&format!(
            r#"
            SELECT {DETAIL_COLUMNS}
            FROM reports r
            {DETAIL_JOINS}
            WHERE ($1::text IS NULL OR t.state = $1)
              AND ($2::text IS NULL OR r.status = $2)
            ORDER BY r.submitted_at DESC
            "#
        ))
        .bind(state)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List report views submitted by one employee.
    pub async fn list_for_employee(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<ReportDetailRow>, sqlx::Error> {
        let timer = QueryTimer::new("list_reports_for_employee");
        let result = sqlx::query_as::<_, ReportDetailRow>(&format!(
            r#"
            SELECT {DETAIL_COLUMNS}
            FROM reports r
            {DETAIL_JOINS}
            WHERE r.employee_id = $1
            ORDER BY r.submitted_at DESC
            "#
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply a review decision to a report.
    pub async fn update_review(
        &self,
        report_id: Uuid,
        status: ReportStatus,
        rejection_reason: Option<&str>,
        approved_at: Option<DateTime<Utc>>,
    ) -> Result<Option<ReportEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_report_review");
        let result = sqlx::query_as::<_, ReportEntity>(
            r#"
            UPDATE reports SET
                status = $2,
                rejection_reason = $3,
                approved_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(report_id)
        .bind(status.as_str())
        .bind(rejection_reason)
        .bind(approved_at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Attach a file to a report.
    pub async fn add_file(
        &self,
        report_id: Uuid,
        label: &str,
        path: &str,
        uploaded_by: Uuid,
    ) -> Result<ReportFileEntity, sqlx::Error> {
        let timer = QueryTimer::new("add_report_file");
        let result = sqlx::query_as::<_, ReportFileEntity>(
            r#"
            INSERT INTO report_files (report_id, label, path, uploaded_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(report_id)
        .bind(label)
        .bind(path)
        .bind(uploaded_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Files attached to a report, in upload order.
    pub async fn files_for(
        &self,
        report_id: Uuid,
    ) -> Result<Vec<ReportFileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_report_files");
        let result = sqlx::query_as::<_, ReportFileEntity>(
            r#"
            SELECT * FROM report_files WHERE report_id = $1 ORDER BY id
            "#,
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count reports, optionally scoped to a task state.
    pub async fn count(&self, state: Option<&str>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_reports");
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM reports r
            JOIN tasks t ON t.id = r.task_id
            WHERE ($1::text IS NULL OR t.state = $1)
            "#,
        )
        .bind(state)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_repository_creation() {
        // This test verifies the ReportRepository can be created
        // Actual database tests are integration tests
    }
}
