//! Business logic services.

pub mod codes;
pub mod geofence;
