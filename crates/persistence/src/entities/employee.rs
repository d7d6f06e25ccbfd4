//! Employee profile entities.

use chrono::{DateTime, Utc};
use domain::models::employee::EmployeeProfile;
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `employee_profiles` table.
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeProfileEntity {
    pub user_id: Uuid,
    pub company_name: Option<String>,
    pub employee_code: Option<String>,
    pub mobile_number: Option<String>,
    pub passport_photo: Option<String>,
    pub signature_photo: Option<String>,
    pub manager_id: Option<Uuid>,
}

impl From<EmployeeProfileEntity> for EmployeeProfile {
    fn from(e: EmployeeProfileEntity) -> Self {
        EmployeeProfile {
            user_id: e.user_id,
            company_name: e.company_name,
            employee_code: e.employee_code,
            mobile_number: e.mobile_number,
            passport_photo: e.passport_photo,
            signature_photo: e.signature_photo,
            manager_id: e.manager_id,
        }
    }
}

/// Joined projection of a user row with its employee profile, used for
/// employee listings and detail views.
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeRecordEntity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub state: String,
    pub global_code: String,
    pub state_code: String,
    pub is_active: bool,
    pub company_name: Option<String>,
    pub employee_code: Option<String>,
    pub mobile_number: Option<String>,
    pub passport_photo: Option<String>,
    pub signature_photo: Option<String>,
    pub created_at: DateTime<Utc>,
}
