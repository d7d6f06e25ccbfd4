//! User repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::user::UserRole;
use domain::services::codes;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;

/// Retries for state-code allocation when concurrent creates collide.
const MAX_CODE_RETRIES: i64 = 5;

/// Repository for user account database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user with generated global and state-scoped codes.
    ///
    /// The state code counter is derived from the current per-state,
    /// per-role row count. Two concurrent creates can race to the same
    /// counter; the unique constraint catches that and the insert is
    /// retried with the next value.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        role: UserRole,
        state: &str,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let mut attempt: i64 = 0;
        let result = loop {
            let mut tx = self.pool.begin().await?;

            let (seq,): (i64,) = sqlx::query_as("SELECT nextval('users_seq')")
                .fetch_one(&mut *tx)
                .await?;
            let (count,): (i64,) = sqlx::query_as(
                r#"
                SELECT COUNT(*) FROM users WHERE state = $1 AND role = $2
                "#,
            )
            .bind(state)
            .bind(role.as_str())
            .fetch_one(&mut *tx)
            .await?;

            let global_code = codes::global_user_code(seq);
            let state_code = codes::state_user_code(state, role, count + 1 + attempt);

            let inserted = sqlx::query_as::<_, UserEntity>(
                r#"
                INSERT INTO users (seq, email, password_hash, name, role, state,
                                   global_code, state_code)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
                "#,
            )
            .bind(seq)
            .bind(email)
            .bind(password_hash)
            .bind(name)
            .bind(role.as_str())
            .bind(state)
            .bind(&global_code)
            .bind(&state_code)
            .fetch_one(&mut *tx)
            .await;

            match inserted {
                Ok(user) => {
                    tx.commit().await?;
                    break Ok(user);
                }
                Err(err) if attempt < MAX_CODE_RETRIES && is_state_code_conflict(&err) => {
                    drop(tx);
                    attempt += 1;
                }
                Err(err) => break Err(err),
            }
        };
        timer.record();
        result
    }

    /// Find a user by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT * FROM users WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by UUID.
    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT * FROM users WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List users with a given role, optionally scoped to a state.
    pub async fn list_by_role(
        &self,
        role: UserRole,
        state: Option<&str>,
    ) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_users_by_role");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT * FROM users
            WHERE role = $1 AND ($2::text IS NULL OR state = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(role.as_str())
        .bind(state)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count users with a given role, optionally scoped to a state.
    pub async fn count_by_role(
        &self,
        role: UserRole,
        state: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_users_by_role");
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM users
            WHERE role = $1 AND ($2::text IS NULL OR state = $2)
            "#,
        )
        .bind(role.as_str())
        .bind(state)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(count.0)
    }

    /// Update a user's profile fields (partial update).
    /// Only provided fields are updated; None values are preserved.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<&str>,
        state: Option<&str>,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_profile");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                state = COALESCE($3, state),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(state)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Replace a user's password hash.
    pub async fn set_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("set_user_password");
        let result = sqlx::query(
            r#"
            UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Store or clear the password-reset OTP for a user.
    pub async fn set_reset_otp(
        &self,
        user_id: Uuid,
        otp_hash: Option<&str>,
        sent_at: Option<DateTime<Utc>>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("set_user_reset_otp");
        let result = sqlx::query(
            r#"
            UPDATE users SET reset_otp_hash = $2, reset_otp_sent_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(otp_hash)
        .bind(sent_at)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Activate or deactivate a user.
    pub async fn set_active(
        &self,
        user_id: Uuid,
        active: bool,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_user_active");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a user. Profile rows cascade.
    /// Returns the number of rows deleted (0 or 1).
    pub async fn delete(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_user");
        let result = sqlx::query(
            r#"
            DELETE FROM users WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}

fn is_state_code_conflict(err: &sqlx::Error) -> bool {
    match err.as_database_error() {
        Some(db) => {
            db.code().as_deref() == Some("23505")
                && db.constraint() == Some("users_state_code_key")
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_repository_creation() {
        // This test verifies the UserRepository can be created
        // Actual database tests are integration tests
    }
}
