//! Client-side checks run before any request leaves the form.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{0} must be a number")]
    NotANumber(&'static str),

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("{0} cannot be negative")]
    Negative(&'static str),

    #[error("{0} must be an http(s) URL")]
    InvalidUrl(&'static str),
}

/// Trimmed value of a required text field.
pub fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(trimmed.to_string())
}

fn number(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::NotANumber(field))?;
    if !value.is_finite() {
        return Err(ValidationError::NotANumber(field));
    }
    Ok(value)
}

/// A strictly positive amount, e.g. `"150.50"` -> `150.5`.
pub fn positive_amount(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    let value = number(field, raw)?;
    if value <= 0.0 {
        return Err(ValidationError::NotPositive(field));
    }
    Ok(value)
}

/// A non-negative amount; blank means zero.
pub fn non_negative_amount(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(0.0);
    }
    let value = number(field, raw)?;
    if value < 0.0 {
        return Err(ValidationError::Negative(field));
    }
    Ok(value)
}

pub fn http_url(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let value = required(field, raw)?;
    match reqwest::Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(value),
        _ => Err(ValidationError::InvalidUrl(field)),
    }
}
