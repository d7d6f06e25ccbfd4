//! Sync conflict entity.

use chrono::{DateTime, Utc};
use domain::models::sync_conflict::SyncConflict;
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `sync_conflicts` table.
#[derive(Debug, Clone, FromRow)]
pub struct SyncConflictEntity {
    pub id: i64,
    pub user_id: Uuid,
    pub model_name: String,
    pub local_data: serde_json::Value,
    pub server_data: serde_json::Value,
    pub resolved_data: Option<serde_json::Value>,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SyncConflictEntity> for SyncConflict {
    fn from(e: SyncConflictEntity) -> Self {
        SyncConflict {
            id: e.id,
            user_id: e.user_id,
            model_name: e.model_name,
            local_data: e.local_data,
            server_data: e.server_data,
            resolved_data: e.resolved_data,
            is_resolved: e.is_resolved,
            created_at: e.created_at,
        }
    }
}
