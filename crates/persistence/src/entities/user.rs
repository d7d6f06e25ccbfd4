//! User entity.

use chrono::{DateTime, Utc};
use domain::models::user::{User, UserRole};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `users` table.
///
/// Carries the credential columns the domain model deliberately omits;
/// repositories expose those only where authentication needs them.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub seq: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub state: String,
    pub global_code: String,
    pub state_code: String,
    pub is_active: bool,
    pub reset_otp_hash: Option<String>,
    pub reset_otp_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(e: UserEntity) -> Self {
        User {
            id: e.id,
            seq: e.seq,
            email: e.email,
            name: e.name,
            role: UserRole::parse(&e.role).unwrap_or(UserRole::Employee),
            state: e.state,
            global_code: e.global_code,
            state_code: e.state_code,
            is_active: e.is_active,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            seq: 12,
            email: "admin@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            name: "Admin".to_string(),
            role: "admin".to_string(),
            state: "Telangana".to_string(),
            global_code: "USR-0012".to_string(),
            state_code: "TE-ADM-002".to_string(),
            is_active: true,
            reset_otp_hash: None,
            reset_otp_sent_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_from_entity() {
        let e = entity();
        let id = e.id;
        let user = User::from(e);
        assert_eq!(user.id, id);
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.global_code, "USR-0012");
    }

    #[test]
    fn test_unknown_role_falls_back_to_employee() {
        let mut e = entity();
        e.role = "intern".to_string();
        assert_eq!(User::from(e).role, UserRole::Employee);
    }
}
