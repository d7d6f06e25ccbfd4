//! Task repository for database operations.

use chrono::NaiveDate;
use domain::models::task::TaskStatus;
use domain::services::codes;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{TaskEntity, TaskListRow};
use crate::metrics::QueryTimer;

const LIST_COLUMNS: &str = r#"
    t.id, t.task_code, t.site_global_id, t.title, t.description, t.status,
    t.task_type, t.cluster, t.site_name, t.state, t.planned_date, t.deadline,
    u.email AS assignee_email, u.name AS assignee_name,
    r.status AS report_status, t.created_at
"#;

const LIST_JOINS: &str = r#"
    LEFT JOIN users u ON u.id = t.assignee_id
    LEFT JOIN LATERAL (
        SELECT status FROM reports
        WHERE reports.task_id = t.id
        ORDER BY submitted_at DESC
        LIMIT 1
    ) r ON TRUE
"#;

/// Filters for task listings. All fields are optional and combine
/// with AND.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter<'a> {
    pub state: Option<&'a str>,
    pub status: Option<TaskStatus>,
    pub cluster: Option<&'a str>,
    pub assignee_id: Option<Uuid>,
}

/// Repository for task database operations.
#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Creates a new TaskRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a task and assign its code.
    ///
    /// The code is derived from the row id, so the insert and the code
    /// update run in one transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        site_global_id: &str,
        title: &str,
        description: Option<&str>,
        task_type: &str,
        cluster: &str,
        site_name: &str,
        state: &str,
        planned_date: Option<NaiveDate>,
        deadline: Option<NaiveDate>,
        assignee_id: Option<Uuid>,
        assigned_by: Option<Uuid>,
    ) -> Result<TaskEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_task");
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, TaskEntity>(
            r#"
            INSERT INTO tasks (site_global_id, title, description, task_type, cluster,
                               site_name, state, planned_date, deadline,
                               assignee_id, assigned_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(site_global_id)
        .bind(title)
        .bind(description)
        .bind(task_type)
        .bind(cluster)
        .bind(site_name)
        .bind(state)
        .bind(planned_date)
        .bind(deadline)
        .bind(assignee_id)
        .bind(assigned_by)
        .fetch_one(&mut *tx)
        .await?;

        let result = sqlx::query_as::<_, TaskEntity>(
            r#"
            UPDATE tasks SET task_code = $2 WHERE id = $1 RETURNING *
            "#,
        )
        .bind(inserted.id)
        .bind(codes::task_code(inserted.id))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(result)
    }

    /// Find a task by its code.
    pub async fn find_by_code(&self, task_code: &str) -> Result<Option<TaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_task_by_code");
        let result = sqlx::query_as::<_, TaskEntity>(
            r#"
            SELECT * FROM tasks WHERE task_code = $1
            "#,
        )
        .bind(task_code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a task by its row id.
    pub async fn find_by_id(&self, task_id: i64) -> Result<Option<TaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_task_by_id");
        let result = sqlx::query_as::<_, TaskEntity>(
            r#"
            SELECT * FROM tasks WHERE id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List tasks with assignee and latest report status.
    pub async fn list(&self, filter: TaskFilter<'_>) -> Result<Vec<TaskListRow>, sqlx::Error> {
        let timer = QueryTimer::new("list_tasks");
        let result = sqlx::query_as::<_, TaskListRow>(&format!(
            r#"
            SELECT {LIST_COLUMNS}
            FROM tasks t
            {LIST_JOINS}
            WHERE ($1::text IS NULL OR t.state = $1)
              AND ($2::text IS NULL OR t.status = $2)
              AND ($3::text IS NULL OR t.cluster = $3)
              AND ($4::uuid IS NULL OR t.assignee_id = $4)
            ORDER BY t.created_at DESC
            "#
        ))
        .bind(filter.state)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.cluster)
        .bind(filter.assignee_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Most recently created tasks, optionally scoped to a state.
    pub async fn recent(
        &self,
        state: Option<&str>,
        limit: i64,
    ) -> Result<Vec<TaskListRow>, sqlx::Error> {
        let timer = QueryTimer::new("recent_tasks");
        let result = sqlx::query_as::<_, TaskListRow>(&format!(
            r#"
            SELECT {LIST_COLUMNS}
            FROM tasks t
            {LIST_JOINS}
            WHERE ($1::text IS NULL OR t.state = $1)
            ORDER BY t.created_at DESC
            LIMIT $2
            "#
        ))
        .bind(state)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Set a task's status.
    ///
    /// Lifecycle checks happen in the handlers; this is a plain update.
    pub async fn update_status(
        &self,
        task_id: i64,
        status: TaskStatus,
    ) -> Result<Option<TaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_task_status");
        let result = sqlx::query_as::<_, TaskEntity>(
            r#"
            UPDATE tasks SET status = $2, updated_at = NOW() WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(task_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a task by its code. Reports cascade.
    /// Returns the number of rows deleted (0 or 1).
    pub async fn delete_by_code(&self, task_code: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_task_by_code");
        let result = sqlx::query(
            r#"
            DELETE FROM tasks WHERE task_code = $1
            "#,
        )
        .bind(task_code)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_unscoped() {
        let filter = TaskFilter::default();
        assert!(filter.state.is_none());
        assert!(filter.status.is_none());
        assert!(filter.cluster.is_none());
        assert!(filter.assignee_id.is_none());
    }
}
