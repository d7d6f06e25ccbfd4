//! Common validation utilities.

use validator::ValidationError;

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates an Indian mobile number: ten digits, optional +91 prefix.
pub fn validate_mobile_number(number: &str) -> Result<(), ValidationError> {
    let digits = number.strip_prefix("+91").unwrap_or(number);
    if digits.len() == 10 && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("mobile_number");
        err.message = Some("Mobile number must be 10 digits".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_latitude() {
        assert!(validate_latitude(0.0).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.1).is_err());
        assert!(validate_latitude(-90.1).is_err());
    }

    #[test]
    fn test_validate_latitude_error_message() {
        let err = validate_latitude(100.0).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Latitude must be between -90 and 90"
        );
    }

    #[test]
    fn test_validate_longitude() {
        assert!(validate_longitude(0.0).is_ok());
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.1).is_err());
        assert!(validate_longitude(-180.1).is_err());
    }

    #[test]
    fn test_validate_longitude_error_message() {
        let err = validate_longitude(200.0).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Longitude must be between -180 and 180"
        );
    }

    #[test]
    fn test_validate_mobile_number() {
        assert!(validate_mobile_number("9876543210").is_ok());
        assert!(validate_mobile_number("+919876543210").is_ok());
        assert!(validate_mobile_number("98765").is_err());
        assert!(validate_mobile_number("98765432100").is_err());
        assert!(validate_mobile_number("98765abcde").is_err());
    }
}
