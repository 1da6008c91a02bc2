//! Field-level validation for registration and password changes.
//!
//! Failures are collected, not short-circuited: every offending field (and
//! every unmet password rule) produces its own entry so the client can fix
//! them all in one round trip.

use serde::Serialize;

/// Symbols accepted as the "special character" password class.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:'\",.<>/?\\|`~";

/// One validation failure, keyed by request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Handle: 3-30 chars of ASCII alphanumerics and underscore.
pub fn handle_errors(handle: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if handle.len() < 3 || handle.len() > 30 {
        errors.push(FieldError::new(
            "handle",
            "handle must be between 3 and 30 characters",
        ));
    }
    if !handle
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        errors.push(FieldError::new(
            "handle",
            "handle may only contain letters, digits and underscore",
        ));
    }
    errors
}

/// Email: `local@domain` shape — exactly one `@`, non-empty local part,
/// domain with at least one dot and no leading/trailing dot.
pub fn email_errors(email: &str) -> Vec<FieldError> {
    let invalid = FieldError::new("email", "email address is not valid");
    let Some((local, domain)) = email.split_once('@') else {
        return vec![invalid];
    };
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.is_empty();
    if local.is_empty()
        || domain.contains('@')
        || !domain_ok
        || email.chars().any(char::is_whitespace)
    {
        return vec![invalid];
    }
    Vec::new()
}

/// Password policy: >= 8 chars with at least one uppercase, one lowercase,
/// one digit, and one symbol from [`PASSWORD_SYMBOLS`].
pub fn password_errors(password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if password.len() < 8 {
        errors.push(FieldError::new(
            "password",
            "password must be at least 8 characters",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(FieldError::new(
            "password",
            "password must contain an uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push(FieldError::new(
            "password",
            "password must contain a lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(
            "password",
            "password must contain a digit",
        ));
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        errors.push(FieldError::new(
            "password",
            "password must contain a special character",
        ));
    }
    errors
}

/// Collected validation for a registration request.
pub fn registration_errors(handle: &str, email: &str, password: &str) -> Vec<FieldError> {
    let mut errors = handle_errors(handle);
    errors.extend(email_errors(email));
    errors.extend(password_errors(password));
    errors
}
