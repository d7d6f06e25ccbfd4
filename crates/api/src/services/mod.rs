//! Application services used by the route handlers.

pub mod auth;
pub mod email;
pub mod imports;
pub mod report_export;
pub mod storage;
