//! Field employee profile models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::{validate_state, UserRole};

/// Profile data attached to an employee user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
    pub user_id: Uuid,
    pub company_name: Option<String>,
    pub employee_code: Option<String>,
    pub mobile_number: Option<String>,
    /// Stored media path of the passport photo, if uploaded.
    pub passport_photo: Option<String>,
    /// Stored media path of the signature image, if uploaded.
    pub signature_photo: Option<String>,
    pub manager_id: Option<Uuid>,
}

/// Employee view combining the account and its profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub state: String,
    pub global_code: String,
    pub state_code: String,
    pub is_active: bool,
    pub company_name: Option<String>,
    pub employee_code: Option<String>,
    pub mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport_photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating an employee account.
///
/// Photos arrive as separate multipart parts and are not part of this
/// payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(custom(function = "validate_state"))]
    pub state: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    pub company_name: Option<String>,

    pub employee_code: Option<String>,

    #[validate(custom(function = "validate_mobile"))]
    pub mobile_number: Option<String>,
}

fn validate_mobile(number: &str) -> Result<(), validator::ValidationError> {
    shared::validation::validate_mobile_number(number)
}

/// Request payload for updating an employee (partial update).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_state"))]
    pub state: Option<String>,

    pub company_name: Option<String>,

    pub employee_code: Option<String>,

    #[validate(custom(function = "validate_mobile"))]
    pub mobile_number: Option<String>,
}

/// One row outcome of a bulk employee import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeImportRow {
    pub row: usize,
    pub email: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_employee_request_validates_mobile() {
        let request = CreateEmployeeRequest {
            email: "field@example.com".to_string(),
            name: "Field Tech".to_string(),
            state: "Telangana".to_string(),
            password: "Secret#123".to_string(),
            company_name: Some("Acme Services".to_string()),
            employee_code: None,
            mobile_number: Some("9876543210".to_string()),
        };
        assert!(request.validate().is_ok());

        let bad = CreateEmployeeRequest {
            mobile_number: Some("12345".to_string()),
            ..request
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_update_employee_request_all_optional() {
        let request: UpdateEmployeeRequest = serde_json::from_str("{}").unwrap();
        assert!(request.validate().is_ok());
        assert!(request.name.is_none());
    }

    #[test]
    fn test_import_row_serialization_skips_empty() {
        let row = EmployeeImportRow {
            row: 2,
            email: "a@b.c".to_string(),
            status: "created".to_string(),
            message: None,
            warnings: vec![],
        };
        let json = serde_json::to_string(&row).unwrap();
        assert!(!json.contains("message"));
        assert!(!json.contains("warnings"));
    }
}
