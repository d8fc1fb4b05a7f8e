use chrono::{DateTime, Utc};

use crate::error::ValidationError;

pub const MAX_TITLE_CHARS: usize = 200;

/// Validator for caller-supplied input.
pub struct Validator;

impl Validator {
    /// Validate and normalize an event title.
    /// Surrounding whitespace is trimmed; the result must be non-empty and at most 200 chars.
    pub fn validate_title(title: &str) -> Result<String, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let len = title.chars().count();
        if len > MAX_TITLE_CHARS {
            return Err(ValidationError::TitleTooLong(len));
        }
        Ok(title.to_string())
    }

    /// Validate that an event ends strictly after it starts.
    pub fn validate_time_range(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        if end <= start {
            return Err(ValidationError::EndNotAfterStart {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(())
    }

    /// Parse an RFC 3339 / ISO 8601 timestamp with offset into UTC.
    pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|_| ValidationError::InvalidTimestamp(raw.to_string()))
    }

    /// Validate a display name.
    pub fn validate_name(name: &str) -> Result<String, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(name.to_string())
    }

    /// Validate an email address and return its canonical (lower-cased) form.
    /// Must contain exactly one '@' with non-empty local and domain parts.
    pub fn validate_email(email: &str) -> Result<String, ValidationError> {
        let email = email.trim();
        let mut parts = email.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        };
        if local.is_empty() || domain.is_empty() || email.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }
        Ok(email.to_lowercase())
    }

    pub fn validate_credential(credential: &str) -> Result<(), ValidationError> {
        if credential.is_empty() {
            return Err(ValidationError::EmptyCredential);
        }
        Ok(())
    }
}
