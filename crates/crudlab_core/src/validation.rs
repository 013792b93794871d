//! Field-level input validation shared by every entity service.
//!
//! # Responsibility
//! - Reject bad caller input before any store access happens.
//! - Produce one human-readable message per failed field.
//!
//! # Invariants
//! - Validators are pure: no I/O, no clock reads (callers pass the
//!   current year when a bound depends on it).

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

pub type ValidationResult<T = ()> = Result<T, ValidationError>;

/// Rejected caller input for one field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Human-readable field label, e.g. `Title`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Rejects empty and whitespace-only values.
pub fn not_empty(value: &str, field: &'static str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Checks the character count of `value` against optional bounds.
pub fn length(
    value: &str,
    field: &'static str,
    min: Option<usize>,
    max: Option<usize>,
) -> ValidationResult {
    let count = value.chars().count();
    if let Some(min) = min {
        if count < min {
            return Err(ValidationError::new(
                field,
                format!("{field} must be at least {min} characters"),
            ));
        }
    }
    if let Some(max) = max {
        if count > max {
            return Err(ValidationError::new(
                field,
                format!("{field} must be at most {max} characters"),
            ));
        }
    }
    Ok(())
}

/// Non-empty text of at most `max` characters.
pub fn required_text(value: &str, field: &'static str, max: usize) -> ValidationResult {
    not_empty(value, field)?;
    length(value, field, None, Some(max))
}

/// Matches the raw value; surrounding whitespace is rejected so the stored
/// text is exactly what the unique index compares.
pub fn email(value: &str) -> ValidationResult {
    not_empty(value, "Email")?;
    if !EMAIL_RE.is_match(value) {
        return Err(ValidationError::new("Email", "Invalid email format"));
    }
    Ok(())
}

/// Accepts 10 or 13 digits, ignoring hyphens and spaces.
pub fn isbn(value: &str) -> ValidationResult {
    not_empty(value, "ISBN")?;
    let digits: String = value.chars().filter(|c| *c != '-' && *c != ' ').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new(
            "ISBN",
            "ISBN must contain only digits and hyphens",
        ));
    }
    if digits.len() != 10 && digits.len() != 13 {
        return Err(ValidationError::new("ISBN", "ISBN must be 10 or 13 digits"));
    }
    Ok(())
}

/// Publication years run from 1000 to next year.
pub fn published_year(year: Option<i32>, current_year: i32) -> ValidationResult {
    let Some(year) = year else {
        return Ok(());
    };
    if year < 1000 {
        return Err(ValidationError::new(
            "Publication year",
            "Publication year must be 1000 or later",
        ));
    }
    if year > current_year + 1 {
        return Err(ValidationError::new(
            "Publication year",
            format!("Publication year cannot be after {}", current_year + 1),
        ));
    }
    Ok(())
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str, field: &'static str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::new(field, format!("{field} must be in YYYY-MM-DD format"))
    })
}

pub fn non_negative(value: i64, field: &'static str) -> ValidationResult {
    if value < 0 {
        return Err(ValidationError::new(
            field,
            format!("{field} cannot be negative"),
        ));
    }
    Ok(())
}

pub fn price(value: f64) -> ValidationResult {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(
            "Price",
            "Price must be a non-negative number",
        ));
    }
    Ok(())
}

/// Case-sensitive membership check against an allowed list.
pub fn choice<'a>(value: &'a str, field: &'static str, allowed: &[&str]) -> ValidationResult<&'a str> {
    if allowed.contains(&value) {
        return Ok(value);
    }
    Err(ValidationError::new(
        field,
        format!(
            "{field} must be one of: {}. Got: '{value}'",
            allowed.join(", ")
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_empty_rejects_whitespace() {
        let err = not_empty("   ", "Title").unwrap_err();
        assert_eq!(err.field, "Title");
        assert_eq!(err.to_string(), "Title cannot be empty");
        assert!(not_empty(" x ", "Title").is_ok());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(length("ééé", "Title", None, Some(3)).is_ok());
        assert!(length("éééé", "Title", None, Some(3)).is_err());
        assert!(length("", "Title", Some(1), None).is_err());
    }

    #[test]
    fn email_requires_domain_with_tld() {
        assert!(email("alice@example.com").is_ok());
        assert!(email("alice@example").is_err());
        assert!(email("not-an-email").is_err());
        assert_eq!(email("").unwrap_err().to_string(), "Email cannot be empty");
    }

    #[test]
    fn email_with_surrounding_whitespace_is_rejected() {
        assert_eq!(
            email(" bob@example.com ").unwrap_err().to_string(),
            "Invalid email format"
        );
        assert!(email("bob@example.com\n").is_err());
    }

    #[test]
    fn isbn_accepts_ten_or_thirteen_digits_with_separators() {
        assert!(isbn("978-0-13-235088-4").is_ok());
        assert!(isbn("0 13 235088 2").is_ok());
        assert_eq!(
            isbn("12345").unwrap_err().to_string(),
            "ISBN must be 10 or 13 digits"
        );
        assert_eq!(
            isbn("97801323508X4").unwrap_err().to_string(),
            "ISBN must contain only digits and hyphens"
        );
    }

    #[test]
    fn published_year_bounds() {
        assert!(published_year(None, 2026).is_ok());
        assert!(published_year(Some(1999), 2026).is_ok());
        assert!(published_year(Some(2027), 2026).is_ok());
        assert!(published_year(Some(999), 2026).is_err());
        assert!(published_year(Some(2028), 2026).is_err());
    }

    #[test]
    fn parse_date_requires_iso_format() {
        let parsed = parse_date("2026-03-01", "Due date").unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(
            parse_date("03/01/2026", "Due date").unwrap_err().to_string(),
            "Due date must be in YYYY-MM-DD format"
        );
    }

    #[test]
    fn price_rejects_negative_and_non_finite() {
        assert!(price(0.0).is_ok());
        assert!(price(19.99).is_ok());
        assert!(price(-0.01).is_err());
        assert!(price(f64::NAN).is_err());
    }

    #[test]
    fn choice_lists_allowed_values() {
        let err = choice("urgent", "Priority", &["low", "medium", "high"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Priority must be one of: low, medium, high. Got: 'urgent'"
        );
    }
}
