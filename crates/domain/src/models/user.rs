//! User domain model and role definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// States the service currently operates in. User creation is rejected
/// for anything outside this list.
pub const OPERATING_STATES: &[&str] = &["Andhra Pradesh", "Telangana", "Hyderabad", "Odisha"];

/// Returns true when the given state is one the service operates in.
pub fn is_operating_state(state: &str) -> bool {
    OPERATING_STATES.iter().any(|s| s.eq_ignore_ascii_case(state))
}

/// Validator hook for state fields on request payloads.
pub fn validate_state(state: &str) -> Result<(), validator::ValidationError> {
    if is_operating_state(state) {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("state");
        err.message = Some("State is not supported".into());
        Err(err)
    }
}

/// Role of a user within the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Superadmin,
    Admin,
    Employee,
}

impl UserRole {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Superadmin => "superadmin",
            UserRole::Admin => "admin",
            UserRole::Employee => "employee",
        }
    }

    /// Parses from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "superadmin" => Some(UserRole::Superadmin),
            "admin" => Some(UserRole::Admin),
            "employee" => Some(UserRole::Employee),
            _ => None,
        }
    }

    /// Three-letter code used in state-scoped user codes.
    pub fn code(&self) -> &'static str {
        match self {
            UserRole::Superadmin => "SUP",
            UserRole::Admin => "ADM",
            UserRole::Employee => "EMP",
        }
    }
}

/// Represents a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Monotone sequence number backing the global user code.
    pub seq: i64,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub state: String,
    /// Globally unique human-readable code, e.g. `USR-0001`.
    pub global_code: String,
    /// State-scoped code, e.g. `TE-EMP-003`.
    pub state_code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User payload returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub state: String,
    pub global_code: String,
    pub state_code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
            state: u.state,
            global_code: u.global_code,
            state_code: u.state_code,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}

/// Request payload for creating an admin account.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(custom(function = "validate_state"))]
    pub state: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request payload for updating a user (partial update).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_state"))]
    pub state: Option<String>,
}

/// Request payload for changing one's own password.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Old password is required"))]
    pub old_password: String,

    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Superadmin, UserRole::Admin, UserRole::Employee] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("manager"), None);
    }

    #[test]
    fn test_role_codes() {
        assert_eq!(UserRole::Superadmin.code(), "SUP");
        assert_eq!(UserRole::Admin.code(), "ADM");
        assert_eq!(UserRole::Employee.code(), "EMP");
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(
            serde_json::to_string(&UserRole::Employee).unwrap(),
            "\"employee\""
        );
        let role: UserRole = serde_json::from_str("\"superadmin\"").unwrap();
        assert_eq!(role, UserRole::Superadmin);
    }

    #[test]
    fn test_is_operating_state() {
        assert!(is_operating_state("Telangana"));
        assert!(is_operating_state("telangana"));
        assert!(is_operating_state("Hyderabad"));
        assert!(!is_operating_state("Kerala"));
        assert!(!is_operating_state(""));
    }

    #[test]
    fn test_create_admin_request_validation() {
        let request = CreateAdminRequest {
            email: "admin@example.com".to_string(),
            name: "Admin".to_string(),
            state: "Odisha".to_string(),
            password: "Secret#123".to_string(),
        };
        assert!(request.validate().is_ok());

        let bad_state = CreateAdminRequest {
            state: "Atlantis".to_string(),
            ..request.clone()
        };
        assert!(bad_state.validate().is_err());

        let bad_email = CreateAdminRequest {
            email: "not-an-email".to_string(),
            ..request
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_user_response_from_user() {
        let user = User {
            id: Uuid::new_v4(),
            seq: 7,
            email: "e@example.com".to_string(),
            name: "E".to_string(),
            role: UserRole::Employee,
            state: "Telangana".to_string(),
            global_code: "USR-0007".to_string(),
            state_code: "TE-EMP-001".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let response = UserResponse::from(user.clone());
        assert_eq!(response.id, user.id);
        assert_eq!(response.global_code, "USR-0007");
        assert_eq!(response.state_code, "TE-EMP-001");
    }
}
