//! Shared utilities and common types for the FieldServe backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic utilities (hashing)
//! - Password hashing with Argon2id and the password strength policy
//! - JWT issuance and validation
//! - One-time password generation for password resets
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod otp;
pub mod password;
pub mod validation;
