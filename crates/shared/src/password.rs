//! Password hashing utilities using Argon2id.
//!
//! This module provides secure password hashing using the Argon2id algorithm,
//! which is recommended by OWASP for password storage, plus the password
//! strength policy enforced at registration and password change.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    #[error("{0}")]
    WeakPassword(String),
}

/// Argon2id parameters following OWASP recommendations (2024).
/// - Memory: 19456 KiB (19 MiB)
/// - Iterations: 2
/// - Parallelism: 1
const MEMORY_COST: u32 = 19456; // 19 MiB in KiB
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32; // 256-bit hash output

/// Minimum password length accepted by the strength policy.
pub const MIN_PASSWORD_LENGTH: usize = 8;

lazy_static! {
    static ref UPPERCASE_RE: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref DIGIT_RE: Regex = Regex::new(r"\d").unwrap();
    static ref SPECIAL_RE: Regex = Regex::new(r#"[!@#$%^&*(),.?":{}|<>_\-+=\[\]\\/;'`~]"#).unwrap();
}

/// Checks a password against the strength policy.
///
/// Requirements: at least 8 characters, one uppercase letter, one digit
/// and one special character.
pub fn check_password_strength(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::WeakPassword(
            "Password must be at least 8 characters long".to_string(),
        ));
    }
    if !UPPERCASE_RE.is_match(password) {
        return Err(PasswordError::WeakPassword(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }
    if !DIGIT_RE.is_match(password) {
        return Err(PasswordError::WeakPassword(
            "Password must contain at least one number".to_string(),
        ));
    }
    if !SPECIAL_RE.is_match(password) {
        return Err(PasswordError::WeakPassword(
            "Password must contain at least one special character".to_string(),
        ));
    }
    Ok(())
}

/// Creates an Argon2id hasher with OWASP-recommended parameters.
fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(format!("Failed to create Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password using Argon2id with OWASP-recommended parameters.
///
/// Returns a PHC-formatted string that includes the algorithm, parameters,
/// salt, and hash. This format is self-describing and allows for future
/// algorithm upgrades.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = create_argon2()?;

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored hash.
///
/// # Returns
/// * `Ok(true)` - Password matches
/// * `Ok(false)` - Password does not match
/// * `Err(PasswordError)` - If verification fails (e.g., invalid hash format)
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    // The stored hash carries its own parameters, so defaults are fine here
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_returns_phc_format() {
        let hash = hash_password("Test_password1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("$v=19$")); // Version 0x13 = 19
        assert!(hash.contains("m=19456")); // Memory cost
        assert!(hash.contains("t=2")); // Time cost
        assert!(hash.contains("p=1")); // Parallelism
    }

    #[test]
    fn test_hash_password_produces_unique_hashes() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        // Different salts should produce different hashes
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct() {
        let password = "My_secure_password123!";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password("correct_password").unwrap();
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let result = verify_password("password", "invalid_hash_format");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_hash_password_unicode() {
        let password = "密码123!Пароль";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("different", &hash).unwrap());
    }

    #[test]
    fn test_strength_accepts_valid_password() {
        assert!(check_password_strength("Summer#2024").is_ok());
        assert!(check_password_strength("Abcdef1!").is_ok());
    }

    #[test]
    fn test_strength_rejects_short_password() {
        let err = check_password_strength("Ab1!").unwrap_err();
        assert!(err.to_string().contains("8 characters"));
    }

    #[test]
    fn test_strength_rejects_missing_uppercase() {
        let err = check_password_strength("summer#2024").unwrap_err();
        assert!(err.to_string().contains("uppercase"));
    }

    #[test]
    fn test_strength_rejects_missing_digit() {
        let err = check_password_strength("Summer#abc").unwrap_err();
        assert!(err.to_string().contains("number"));
    }

    #[test]
    fn test_strength_rejects_missing_special() {
        let err = check_password_strength("Summer2024").unwrap_err();
        assert!(err.to_string().contains("special"));
    }

    #[test]
    fn test_strength_counts_chars_not_bytes() {
        // 8 multibyte chars with upper, digit and special
        assert!(check_password_strength("Ꭺ1!ééééé").is_ok());
    }
}
