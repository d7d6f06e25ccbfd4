//! Offline sync conflict models.
//!
//! Mobile clients work offline and can race server-side edits. When a
//! divergence is detected both snapshots are parked here for a
//! superadmin to resolve.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded divergence between a client and the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConflict {
    pub id: i64,
    pub user_id: Uuid,
    /// Name of the conflicting model, e.g. `report` or `task`.
    pub model_name: String,
    pub local_data: serde_json::Value,
    pub server_data: serde_json::Value,
    pub resolved_data: Option<serde_json::Value>,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
}

/// Request payload for resolving a conflict.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveConflictRequest {
    /// The payload chosen (or merged) by the resolver.
    pub resolved_data: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_serialization() {
        let conflict = SyncConflict {
            id: 1,
            user_id: Uuid::new_v4(),
            model_name: "report".to_string(),
            local_data: serde_json::json!({"status": "pending"}),
            server_data: serde_json::json!({"status": "approved"}),
            resolved_data: None,
            is_resolved: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&conflict).unwrap();
        assert!(json.contains("\"modelName\":\"report\""));
        assert!(json.contains("\"isResolved\":false"));
    }

    #[test]
    fn test_resolve_request_deserialization() {
        let request: ResolveConflictRequest =
            serde_json::from_str(r#"{"resolvedData": {"status": "approved"}}"#).unwrap();
        assert_eq!(request.resolved_data["status"], "approved");
    }
}
