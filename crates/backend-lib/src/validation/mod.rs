// ============================
// clawcontrol-backend-lib/src/validation/mod.rs
// ============================
//! Input validation for auth and entity fields.

use crate::error::AppError;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Common validation constants
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_NAME_LENGTH: usize = 100;
const MAX_LABEL_LENGTH: usize = 100;
const MAX_CONTENT_LENGTH: usize = 64 * 1024;

// Regex patterns for validation
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());
static LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^<>/\\{}()\[\];]*$").unwrap());

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    #[error("Content too large ({0} bytes)")]
    ContentTooLarge(usize),
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::InvalidInput(e.to_string())
    }
}

/// Result type for validation operations
pub type ValidationResult = Result<(), ValidationError>;

/// Canonical form of an email: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> ValidationResult {
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH || !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

/// Display names: non-empty, bounded, no markup-ish characters.
pub fn validate_name(name: &str) -> ValidationResult {
    if name.is_empty() || name.len() > MAX_NAME_LENGTH || !LABEL_REGEX.is_match(name) {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Entity names (instances, skills, channels, ...): same rules as
/// display names.
pub fn validate_label(label: &str) -> ValidationResult {
    if label.trim().is_empty() || label.len() > MAX_LABEL_LENGTH || !LABEL_REGEX.is_match(label) {
        return Err(ValidationError::InvalidLabel(label.to_string()));
    }
    Ok(())
}

/// Free-text bodies (message content, prompts).
pub fn validate_content(content: &str) -> ValidationResult {
    if content.len() > MAX_CONTENT_LENGTH {
        return Err(ValidationError::ContentTooLarge(content.len()));
    }
    Ok(())
}
