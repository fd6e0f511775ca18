//! Legacy creator identifiers.
//!
//! Older clients send the creator ID as a JSON string or number; multipart
//! forms send text. Both normalize to a trimmed string.

use crate::error::CoreError;

/// Normalize a creator ID taken from a JSON body.
///
/// Returns `Ok(None)` when the field is absent or `null`.
pub fn legacy_id_from_json(value: Option<&serde_json::Value>) -> Result<Option<String>, CoreError> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => legacy_id_from_text(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(invalid()),
    }
}

/// Normalize a creator ID taken from a form field. A present but blank
/// value is rejected.
pub fn legacy_id_from_text(value: Option<&str>) -> Result<Option<String>, CoreError> {
    match value.map(str::trim) {
        None => Ok(None),
        Some("") => Err(invalid()),
        Some(id) => Ok(Some(id.to_string())),
    }
}

fn invalid() -> CoreError {
    CoreError::Validation("creator_id must be a non-empty string or number".to_string())
}
