//! Repository implementations for database operations.

pub mod dashboard;
pub mod employee;
pub mod form_template;
pub mod report;
pub mod site;
pub mod sync_conflict;
pub mod task;
pub mod user;

pub use dashboard::DashboardRepository;
pub use employee::EmployeeRepository;
pub use form_template::FormTemplateRepository;
pub use report::ReportRepository;
pub use site::SiteRepository;
pub use sync_conflict::SyncConflictRepository;
pub use task::{TaskFilter, TaskRepository};
pub use user::UserRepository;
