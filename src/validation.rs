//! Field-level validation for product payloads.
//!
//! Pure functions over the dynamic JSON objects the API receives. Numeric
//! fields accept either a native number or a string that parses as one; a
//! string that does not parse is a validation failure, not an error path.
//! Fields outside the known set pass through unvalidated.

use serde_json::{Map, Value};
use thiserror::Error;

/// A rejected product payload, naming the offending field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field `{0}` is required")]
    Missing(&'static str),
    #[error("field `{0}` must be a non-empty string")]
    BlankText(&'static str),
    #[error("field `{0}` must be a non-negative number")]
    InvalidNumber(&'static str),
}

/// Validates a full product payload for creation: `name` and `category`
/// must be non-blank strings, `price` a non-negative number, `stock` a
/// non-negative integer.
pub fn validate_create(payload: &Map<String, Value>) -> Result<(), ValidationError> {
    require_text(payload, "name")?;
    require_text(payload, "category")?;
    require_decimal(payload, "price")?;
    require_integer(payload, "stock")?;
    Ok(())
}

/// Validates a partial update: the same per-field rules as
/// [`validate_create`], applied only to the fields present. An empty payload
/// is valid — absent fields stay untouched in storage.
pub fn validate_update(payload: &Map<String, Value>) -> Result<(), ValidationError> {
    if payload.contains_key("name") {
        require_text(payload, "name")?;
    }
    if payload.contains_key("category") {
        require_text(payload, "category")?;
    }
    if payload.contains_key("price") {
        require_decimal(payload, "price")?;
    }
    if payload.contains_key("stock") {
        require_integer(payload, "stock")?;
    }
    Ok(())
}

fn require_text(payload: &Map<String, Value>, field: &'static str) -> Result<(), ValidationError> {
    match payload.get(field) {
        None | Some(Value::Null) => Err(ValidationError::Missing(field)),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(()),
        Some(_) => Err(ValidationError::BlankText(field)),
    }
}

fn require_decimal(
    payload: &Map<String, Value>,
    field: &'static str,
) -> Result<(), ValidationError> {
    match payload.get(field) {
        None | Some(Value::Null) => Err(ValidationError::Missing(field)),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v >= 0.0 => Ok(()),
            _ => Err(ValidationError::InvalidNumber(field)),
        },
        Some(Value::String(s)) => match s.parse::<f64>() {
            Ok(v) if v >= 0.0 => Ok(()),
            _ => Err(ValidationError::InvalidNumber(field)),
        },
        Some(_) => Err(ValidationError::InvalidNumber(field)),
    }
}

fn require_integer(
    payload: &Map<String, Value>,
    field: &'static str,
) -> Result<(), ValidationError> {
    match payload.get(field) {
        None | Some(Value::Null) => Err(ValidationError::Missing(field)),
        // Only the sign matters for a native number; a numeric string must
        // parse as a whole number.
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v >= 0.0 => Ok(()),
            _ => Err(ValidationError::InvalidNumber(field)),
        },
        Some(Value::String(s)) => match s.parse::<i64>() {
            Ok(v) if v >= 0 => Ok(()),
            _ => Err(ValidationError::InvalidNumber(field)),
        },
        Some(_) => Err(ValidationError::InvalidNumber(field)),
    }
}
