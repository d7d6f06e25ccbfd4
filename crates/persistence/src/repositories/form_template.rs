//! Form template repository for database operations.

use domain::models::form_template::TaskGroup;
use sqlx::PgPool;

use crate::entities::FormTemplateEntity;
use crate::metrics::QueryTimer;

/// Repository for form template database operations.
#[derive(Clone)]
pub struct FormTemplateRepository {
    pool: PgPool,
}

impl FormTemplateRepository {
    /// Creates a new FormTemplateRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace the template for a task group.
    pub async fn upsert(
        &self,
        task_group: TaskGroup,
        schema: &serde_json::Value,
    ) -> Result<FormTemplateEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_form_template");
        let result = sqlx::query_as::<_, FormTemplateEntity>(
            r#"
            INSERT INTO form_templates (task_group, schema)
            VALUES ($1, $2)
            ON CONFLICT (task_group) DO UPDATE SET
                schema = EXCLUDED.schema,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(task_group.as_str())
        .bind(schema)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find the template for a task group.
    pub async fn find_by_group(
        &self,
        task_group: TaskGroup,
    ) -> Result<Option<FormTemplateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_form_template_by_group");
        let result = sqlx::query_as::<_, FormTemplateEntity>(
            r#"
            SELECT * FROM form_templates WHERE task_group = $1
            "#,
        )
        .bind(task_group.as_str())
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all stored templates.
    pub async fn list(&self) -> Result<Vec<FormTemplateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_form_templates");
        let result = sqlx::query_as::<_, FormTemplateEntity>(
            r#"
            SELECT * FROM form_templates ORDER BY task_group
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_repository_creation() {
        // This test verifies the FormTemplateRepository can be created
        // Actual database tests are integration tests
    }
}
