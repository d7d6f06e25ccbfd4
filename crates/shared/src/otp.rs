//! One-time passwords for the password reset flow.
//!
//! Codes are six decimal digits and expire ten minutes after issue. Only
//! the SHA-256 hash of a code is ever persisted.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::crypto::sha256_hex;

/// OTP validity window in minutes.
pub const OTP_VALIDITY_MINUTES: i64 = 10;

/// Number of digits in a reset OTP.
pub const OTP_LENGTH: usize = 6;

/// Generates a random six-digit OTP, zero-padded.
pub fn generate_otp() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", code)
}

/// Hashes an OTP for storage.
pub fn hash_otp(otp: &str) -> String {
    sha256_hex(otp)
}

/// Checks a presented OTP against the stored hash and issue time.
///
/// Returns false when the code does not match or when it was issued more
/// than [`OTP_VALIDITY_MINUTES`] ago.
pub fn verify_otp(presented: &str, stored_hash: &str, issued_at: DateTime<Utc>) -> bool {
    if Utc::now() - issued_at > Duration::minutes(OTP_VALIDITY_MINUTES) {
        return false;
    }
    hash_otp(presented) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), OTP_LENGTH);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_verify_otp_accepts_fresh_code() {
        let otp = generate_otp();
        let hash = hash_otp(&otp);
        assert!(verify_otp(&otp, &hash, Utc::now()));
    }

    #[test]
    fn test_verify_otp_rejects_wrong_code() {
        let hash = hash_otp("123456");
        assert!(!verify_otp("654321", &hash, Utc::now()));
    }

    #[test]
    fn test_verify_otp_rejects_expired_code() {
        let otp = "123456";
        let hash = hash_otp(otp);
        let issued = Utc::now() - Duration::minutes(OTP_VALIDITY_MINUTES + 1);
        assert!(!verify_otp(otp, &hash, issued));
    }

    #[test]
    fn test_verify_otp_accepts_just_inside_window() {
        let otp = "000042";
        let hash = hash_otp(otp);
        let issued = Utc::now() - Duration::minutes(OTP_VALIDITY_MINUTES - 1);
        assert!(verify_otp(otp, &hash, issued));
    }

    #[test]
    fn test_hash_otp_matches_sha256() {
        // Hash must be stable so stored values remain comparable
        assert_eq!(hash_otp("123456").len(), 64);
        assert_eq!(hash_otp("123456"), hash_otp("123456"));
    }
}
