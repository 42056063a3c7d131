use crate::error::AppError;

/// Trim an optional string, treating blank input as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Validate a required text field (1..=max Unicode characters after trimming).
pub fn require_text<'a>(field: &str, value: &'a str, max: usize) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::InvalidRequest(format!(
            "{field} must be 1-{max} characters"
        )));
    }
    Ok(value)
}
