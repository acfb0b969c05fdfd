//! Validation helpers for DTOs.

use validator::ValidationError;

use super::{parse_date, parse_time};

/// Validates a `YYYY-MM-DD` calendar date.
pub fn validate_iso_date(value: &str) -> Result<(), ValidationError> {
    parse_date(value).map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("date_format");
        err.message = Some(format!("`{value}` is not a YYYY-MM-DD date").into());
        err
    })
}

/// Validates a `HH:MM` or `HH:MM:SS` time of day.
pub fn validate_clock_time(value: &str) -> Result<(), ValidationError> {
    parse_time(value).map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("time_format");
        err.message = Some(format!("`{value}` is not a HH:MM time").into());
        err
    })
}

/// Rejects strings made only of whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_iso_date() {
        assert!(validate_iso_date("2025-07-10").is_ok());
        assert!(validate_iso_date("2024-02-29").is_ok());
        assert!(validate_iso_date("2025-02-29").is_err()); // not a leap year
        assert!(validate_iso_date("2025-7-10").is_err());
        assert!(validate_iso_date("").is_err());
    }

    #[test]
    fn test_validate_clock_time() {
        assert!(validate_clock_time("19:00").is_ok());
        assert!(validate_clock_time("07:30:15").is_ok());
        assert!(validate_clock_time("24:00").is_err());
        assert!(validate_clock_time("19h00").is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Ada").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }
}
