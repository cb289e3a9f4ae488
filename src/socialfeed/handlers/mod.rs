//! Route handlers and the input checks they share.

pub mod admin;
pub mod comments;
pub mod health;
pub mod login;
pub mod pages;
pub mod posts;
pub mod root;
pub mod users;

use regex::Regex;

use super::error::ApiError;

pub(crate) const INVALID_REQUEST_DATA: &str = "Invalid request data";

/// Lightweight email sanity check applied before persisting data.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

fn field_error(field: &str, tag: &str) -> ApiError {
    ApiError::validation(format!(
        "Field validation for '{field}' failed on the '{tag}' tag"
    ))
}

pub(crate) fn required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(field_error(field, "required"));
    }
    Ok(())
}

pub(crate) fn min_chars(field: &str, value: &str, min: usize) -> Result<(), ApiError> {
    if value.chars().count() < min {
        return Err(field_error(field, "min"));
    }
    Ok(())
}

pub(crate) fn max_chars(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.chars().count() > max {
        return Err(field_error(field, "max"));
    }
    Ok(())
}

pub(crate) fn email(field: &str, value: &str) -> Result<(), ApiError> {
    if !valid_email(value) {
        return Err(field_error(field, "email"));
    }
    Ok(())
}

/// Parse a numeric path or query id; anything else is a 400. Zero and
/// negative ids parse and are left to the lookup, which answers 404.
pub(crate) fn parse_id(raw: &str, message: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::validation(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format() {
        assert!(valid_email("a@b.com"));
        assert!(!valid_email("a@b"));
        assert!(!valid_email("not an email"));
        assert!(!valid_email(""));
    }

    #[test]
    fn length_checks_count_chars() {
        assert!(min_chars("Username", "abc", 3).is_ok());
        assert!(min_chars("Username", "ab", 3).is_err());
        assert!(max_chars("Username", "ééé", 3).is_ok());
        assert!(max_chars("Username", "éééé", 3).is_err());
    }

    #[test]
    fn field_error_message_shape() {
        let err = min_chars("Username", "al", 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field validation for 'Username' failed on the 'min' tag"
        );
        let err = required("Password", "   ").unwrap_err();
        assert!(err.to_string().contains("'required'"));
    }

    #[test]
    fn ids() {
        assert_eq!(parse_id("12", "bad").unwrap(), 12);
        assert!(parse_id("abc", "bad").is_err());
        assert!(parse_id("1.5", "bad").is_err());
        assert_eq!(parse_id("0", "bad").unwrap(), 0);
        assert_eq!(parse_id("-1", "bad").unwrap(), -1);
    }
}
