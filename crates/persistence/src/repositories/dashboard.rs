//! Dashboard aggregate queries.
//!
//! Keeps the grouped counting queries out of the CRUD repositories.
//! Results come back as plain tuples; the handlers assemble them into
//! the dashboard payloads.

use sqlx::PgPool;
use uuid::Uuid;

use crate::metrics::QueryTimer;

/// Task totals broken down by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTotals {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
}

/// Repository for dashboard aggregate database operations.
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    /// Creates a new DashboardRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Task counts by status, optionally scoped to a state.
    pub async fn task_status_totals(
        &self,
        state: Option<&str>,
    ) -> Result<StatusTotals, sqlx::Error> {
        let timer = QueryTimer::new("task_status_totals");
        let row: (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'pending'),
                   COUNT(*) FILTER (WHERE status = 'in_progress'),
                   COUNT(*) FILTER (WHERE status = 'completed')
            FROM tasks
            WHERE ($1::text IS NULL OR state = $1)
            "#,
        )
        .bind(state)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(StatusTotals {
            total: row.0,
            pending: row.1,
            in_progress: row.2,
            completed: row.3,
        })
    }

    /// Task counts grouped by title: (title, total, completed).
    pub async fn task_title_counts(
        &self,
        state: Option<&str>,
    ) -> Result<Vec<(String, i64, i64)>, sqlx::Error> {
        let timer = QueryTimer::new("task_title_counts");
        let result = sqlx::query_as(
            r#"
            SELECT title,
                   COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'completed')
            FROM tasks
            WHERE ($1::text IS NULL OR state = $1)
            GROUP BY title
            "#,
        )
        .bind(state)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Task counts grouped by cluster: (cluster, total, completed).
    pub async fn cluster_counts(
        &self,
        state: Option<&str>,
    ) -> Result<Vec<(String, i64, i64)>, sqlx::Error> {
        let timer = QueryTimer::new("cluster_counts");
        let result = sqlx::query_as(
            r#"
            SELECT cluster,
                   COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'completed')
            FROM tasks
            WHERE ($1::text IS NULL OR state = $1)
            GROUP BY cluster
            ORDER BY cluster
            "#,
        )
        .bind(state)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// User counts grouped by state and role: (state, role, count).
    pub async fn users_by_state_role(&self) -> Result<Vec<(String, String, i64)>, sqlx::Error> {
        let timer = QueryTimer::new("users_by_state_role");
        let result = sqlx::query_as(
            r#"
            SELECT state, role, COUNT(*)
            FROM users
            GROUP BY state, role
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Task counts grouped by state and status: (state, status, count).
    pub async fn tasks_by_state_status(&self) -> Result<Vec<(String, String, i64)>, sqlx::Error> {
        let timer = QueryTimer::new("tasks_by_state_status");
        let result = sqlx::query_as(
            r#"
            SELECT state, status, COUNT(*)
            FROM tasks
            GROUP BY state, status
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Report counts grouped by task state: (state, count).
    pub async fn reports_by_state(&self) -> Result<Vec<(String, i64)>, sqlx::Error> {
        let timer = QueryTimer::new("reports_by_state");
        let result = sqlx::query_as(
            r#"
            SELECT t.state, COUNT(*)
            FROM reports r
            JOIN tasks t ON t.id = r.task_id
            GROUP BY t.state
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Task counts by status for one assignee.
    pub async fn employee_task_totals(
        &self,
        employee_id: Uuid,
    ) -> Result<StatusTotals, sqlx::Error> {
        let timer = QueryTimer::new("employee_task_totals");
        let row: (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'pending'),
                   COUNT(*) FILTER (WHERE status = 'in_progress'),
                   COUNT(*) FILTER (WHERE status = 'completed')
            FROM tasks
            WHERE assignee_id = $1
            "#,
        )
        .bind(employee_id)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(StatusTotals {
            total: row.0,
            pending: row.1,
            in_progress: row.2,
            completed: row.3,
        })
    }

    /// Count of rejected reports submitted by one employee.
    pub async fn employee_rejected_reports(
        &self,
        employee_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("employee_rejected_reports");
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM reports
            WHERE employee_id = $1 AND status = 'rejected'
            "#,
        )
        .bind(employee_id)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_totals_default_is_zeroed() {
        assert_eq!(StatusTotals::default().total, 0);
        assert_eq!(StatusTotals::default().completed, 0);
    }
}
