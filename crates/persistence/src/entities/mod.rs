//! Database entity definitions.
//!
//! Entities map one-to-one onto table rows (or join projections) and
//! convert into domain models via `From` implementations. Enum-typed
//! columns are stored as TEXT and guarded by CHECK constraints, so the
//! conversions treat unknown values as data corruption and fall back to
//! a safe default.

pub mod employee;
pub mod form_template;
pub mod report;
pub mod site;
pub mod sync_conflict;
pub mod task;
pub mod user;

pub use employee::{EmployeeProfileEntity, EmployeeRecordEntity};
pub use form_template::FormTemplateEntity;
pub use report::{ReportDetailRow, ReportEntity, ReportFileEntity};
pub use site::SiteEntity;
pub use sync_conflict::SyncConflictEntity;
pub use task::{TaskEntity, TaskListRow};
pub use user::UserEntity;
