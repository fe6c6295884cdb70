/// Required-field access into OpenWeather payloads by dotted key path
///
/// Paths look like `weather.0.description`; numeric segments index arrays.
/// Nothing here falls back to a default: an absent key is `MissingField`
/// and a key of the wrong type is `InvalidField`.
use serde_json::Value;

use crate::error::ApiError;

pub fn field<'a>(value: &'a Value, path: &str) -> Result<&'a Value, ApiError> {
    let pointer = format!("/{}", path.replace('.', "/"));
    value
        .pointer(&pointer)
        .ok_or_else(|| ApiError::MissingField(path.to_string()))
}

fn invalid(path: &str, expected: &'static str) -> ApiError {
    ApiError::InvalidField {
        path: path.to_string(),
        expected,
    }
}

pub fn number(value: &Value, path: &str) -> Result<f64, ApiError> {
    field(value, path)?
        .as_f64()
        .ok_or_else(|| invalid(path, "a number"))
}

pub fn integer(value: &Value, path: &str) -> Result<i64, ApiError> {
    field(value, path)?
        .as_i64()
        .ok_or_else(|| invalid(path, "an integer"))
}

pub fn text(value: &Value, path: &str) -> Result<String, ApiError> {
    field(value, path)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(path, "a string"))
}

pub fn array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, ApiError> {
    field(value, path)?
        .as_array()
        .ok_or_else(|| invalid(path, "an array"))
}

/// Like [`number`], but an absent or null key is `None`
pub fn optional_number(value: &Value, path: &str) -> Result<Option<f64>, ApiError> {
    match field(value, path) {
        Err(ApiError::MissingField(_)) => Ok(None),
        Err(e) => Err(e),
        Ok(Value::Null) => Ok(None),
        Ok(v) => v.as_f64().map(Some).ok_or_else(|| invalid(path, "a number")),
    }
}
