//! Domain models for FieldServe.

pub mod dashboard;
pub mod employee;
pub mod form_template;
pub mod report;
pub mod site;
pub mod sync_conflict;
pub mod task;
pub mod user;

pub use report::Report;
pub use site::Site;
pub use task::Task;
pub use user::User;
