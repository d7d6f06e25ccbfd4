//! Sync conflict repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SyncConflictEntity;
use crate::metrics::QueryTimer;

/// Repository for offline sync conflict database operations.
#[derive(Clone)]
pub struct SyncConflictRepository {
    pool: PgPool,
}

impl SyncConflictRepository {
    /// Creates a new SyncConflictRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a divergence between a client and the server.
    pub async fn create(
        &self,
        user_id: Uuid,
        model_name: &str,
        local_data: &serde_json::Value,
        server_data: &serde_json::Value,
    ) -> Result<SyncConflictEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_sync_conflict");
        let result = sqlx::query_as::<_, SyncConflictEntity>(
            r#"
            INSERT INTO sync_conflicts (user_id, model_name, local_data, server_data)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(model_name)
        .bind(local_data)
        .bind(server_data)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a conflict by id.
    pub async fn find_by_id(
        &self,
        conflict_id: i64,
    ) -> Result<Option<SyncConflictEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_sync_conflict_by_id");
        let result = sqlx::query_as::<_, SyncConflictEntity>(
            r#"
            SELECT * FROM sync_conflicts WHERE id = $1
            "#,
        )
        .bind(conflict_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List conflicts, newest first.
    pub async fn list(
        &self,
        include_resolved: bool,
    ) -> Result<Vec<SyncConflictEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_sync_conflicts");
        let result = if include_resolved {
            sqlx::query_as::<_, SyncConflictEntity>(
                r#"
                SELECT * FROM sync_conflicts ORDER BY created_at DESC
                "#,
            )
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, SyncConflictEntity>(
                r#"
                SELECT * FROM sync_conflicts
                WHERE is_resolved = FALSE
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(&self.pool)
            .await
        };
        timer.record();
        result
    }

    /// Mark a conflict resolved with the chosen payload.
    ///
    /// Returns None when the conflict does not exist or was already
    /// resolved.
    pub async fn resolve(
        &self,
        conflict_id: i64,
        resolved_data: &serde_json::Value,
    ) -> Result<Option<SyncConflictEntity>, sqlx::Error> {
        let timer = QueryTimer::new("resolve_sync_conflict");
        let result = sqlx::query_as::<_, SyncConflictEntity>(
            r#"
            UPDATE sync_conflicts SET
                resolved_data = $2,
                is_resolved = TRUE
            WHERE id = $1 AND is_resolved = FALSE
            RETURNING *
            "#,
        )
        .bind(conflict_id)
        .bind(resolved_data)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count unresolved conflicts.
    pub async fn count_unresolved(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_unresolved_sync_conflicts");
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM sync_conflicts WHERE is_resolved = FALSE
            "#,
        )
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
        // This test verifies the SyncConflictRepository can be created
        // Actual database tests are integration tests
    }
}
