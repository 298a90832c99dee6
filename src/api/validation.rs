use super::ApiError;

/// Presence check only: the field must be non-empty after trimming.
pub fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    Ok(value)
}
