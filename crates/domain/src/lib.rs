//! Domain layer for the FieldServe backend.
//!
//! This crate contains:
//! - Domain models (users, tasks, sites, reports, form templates)
//! - Business logic services (identifier generation, geofence checks)

pub mod models;
pub mod services;
