//! Report domain model and review lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Review status of a submitted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Saved but not yet picked up for review.
    InProgress,
    /// Waiting on a reviewer.
    Pending,
    Approved,
    Rejected,
}

impl ReportStatus {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::InProgress => "in_progress",
            ReportStatus::Pending => "pending",
            ReportStatus::Approved => "approved",
            ReportStatus::Rejected => "rejected",
        }
    }

    /// Parses from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in_progress" => Some(ReportStatus::InProgress),
            "pending" => Some(ReportStatus::Pending),
            "approved" => Some(ReportStatus::Approved),
            "rejected" => Some(ReportStatus::Rejected),
            _ => None,
        }
    }

    /// Whether this report can still be reviewed.
    pub fn is_reviewable(&self) -> bool {
        matches!(self, ReportStatus::InProgress | ReportStatus::Pending)
    }
}

/// Represents a submitted field report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub task_id: i64,
    pub employee_id: Uuid,
    /// Form answers keyed by field key.
    pub answers: serde_json::Value,
    pub status: ReportStatus,
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

/// A file attached to a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFile {
    pub id: i64,
    pub report_id: Uuid,
    pub label: String,
    pub path: String,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

/// Report summary embedded in task listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub id: Uuid,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Full report view with form answers and file URLs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetail {
    pub id: Uuid,
    pub task_code: String,
    pub task_title: String,
    pub site_global_id: String,
    pub site_name: String,
    pub employee_email: String,
    pub employee_name: String,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub answers: serde_json::Value,
    pub files: Vec<ReportFileView>,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
}

/// File entry in a report view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFileView {
    pub label: String,
    pub url: String,
}

/// Reviewer decision on a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
}

/// Request payload for reviewing a report.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReportRequest {
    pub action: ReviewAction,

    /// Required when the action is reject.
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ReportStatus::InProgress,
            ReportStatus::Pending,
            ReportStatus::Approved,
            ReportStatus::Rejected,
        ] {
            assert_eq!(ReportStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReportStatus::parse("draft"), None);
    }

    #[test]
    fn test_reviewable_states() {
        assert!(ReportStatus::InProgress.is_reviewable());
        assert!(ReportStatus::Pending.is_reviewable());
        assert!(!ReportStatus::Approved.is_reviewable());
        assert!(!ReportStatus::Rejected.is_reviewable());
    }

    #[test]
    fn test_review_request_deserialization() {
        let request: ReviewReportRequest =
            serde_json::from_str(r#"{"action": "reject", "reason": "photos missing"}"#).unwrap();
        assert_eq!(request.action, ReviewAction::Reject);
        assert_eq!(request.reason.as_deref(), Some("photos missing"));

        let approve: ReviewReportRequest = serde_json::from_str(r#"{"action": "approve"}"#).unwrap();
        assert_eq!(approve.action, ReviewAction::Approve);
        assert!(approve.reason.is_none());
    }
}
