//! Employee profile repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{EmployeeProfileEntity, EmployeeRecordEntity};
use crate::metrics::QueryTimer;

const RECORD_COLUMNS: &str = r#"
    u.id, u.email, u.name, u.role, u.state, u.global_code, u.state_code,
    u.is_active, p.company_name, p.employee_code, p.mobile_number,
    p.passport_photo, p.signature_photo, u.created_at
"#;

/// Repository for employee profile database operations.
#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    /// Creates a new EmployeeRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update the profile row for an employee (partial update).
    /// Only provided fields are updated; None values are preserved.
    pub async fn upsert_profile(
        &self,
        user_id: Uuid,
        company_name: Option<&str>,
        employee_code: Option<&str>,
        mobile_number: Option<&str>,
    ) -> Result<EmployeeProfileEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_employee_profile");
        let result = sqlx::query_as::<_, EmployeeProfileEntity>(
            r#"
            INSERT INTO employee_profiles (user_id, company_name, employee_code, mobile_number)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                company_name = COALESCE($2, employee_profiles.company_name),
                employee_code = COALESCE($3, employee_profiles.employee_code),
                mobile_number = COALESCE($4, employee_profiles.mobile_number)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(company_name)
        .bind(employee_code)
        .bind(mobile_number)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Store media paths for an employee's photos (partial update).
    pub async fn set_photos(
        &self,
        user_id: Uuid,
        passport_photo: Option<&str>,
        signature_photo: Option<&str>,
    ) -> Result<EmployeeProfileEntity, sqlx::Error> {
        let timer = QueryTimer::new("set_employee_photos");
        let result = sqlx::query_as::<_, EmployeeProfileEntity>(
            r#"
            INSERT INTO employee_profiles (user_id, passport_photo, signature_photo)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                passport_photo = COALESCE($2, employee_profiles.passport_photo),
                signature_photo = COALESCE($3, employee_profiles.signature_photo)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(passport_photo)
        .bind(signature_photo)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find the profile row for an employee.
    pub async fn find_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<EmployeeProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_employee_profile");
        let result = sqlx::query_as::<_, EmployeeProfileEntity>(
            r#"
            SELECT * FROM employee_profiles WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List employees with their profiles, optionally scoped to a state.
    pub async fn list(
        &self,
        state: Option<&str>,
    ) -> Result<Vec<EmployeeRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_employees");
        let result = sqlx::query_as::<_, EmployeeRecordEntity>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM users u
            LEFT JOIN employee_profiles p ON p.user_id = u.id
            WHERE u.role = 'employee' AND ($1::text IS NULL OR u.state = $1)
            ORDER BY u.created_at DESC
            "#
        ))
        .bind(state)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find one employee record by UUID.
    pub async fn find_record_by_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<EmployeeRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_employee_record_by_id");
        let result = sqlx::query_as::<_, EmployeeRecordEntity>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM users u
            LEFT JOIN employee_profiles p ON p.user_id = u.id
            WHERE u.role = 'employee' AND u.id = $1
            "#
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find one employee record by email.
    pub async fn find_record_by_email(
        &self,
        email: &str,
    ) -> Result<Option<EmployeeRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_employee_record_by_email");
        let result = sqlx::query_as::<_, EmployeeRecordEntity>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM users u
            LEFT JOIN employee_profiles p ON p.user_id = u.id
            WHERE u.role = 'employee' AND u.email = $1
            "#
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Most recently created employees, optionally scoped to a state.
    pub async fn recent(
        &self,
        state: Option<&str>,
        limit: i64,
    ) -> Result<Vec<EmployeeRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("recent_employees");
        let result = sqlx::query_as::<_, EmployeeRecordEntity>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM users u
            LEFT JOIN employee_profiles p ON p.user_id = u.id
            WHERE u.role = 'employee' AND ($1::text IS NULL OR u.state = $1)
            ORDER BY u.created_at DESC
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
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_repository_creation() {
        // This test verifies the EmployeeRepository can be created
        // Actual database tests are integration tests
    }
}
