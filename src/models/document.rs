use crate::utils::AppError;
use mongodb::bson::{self, Bson, Document};
use serde_json::Value;

/// Converts a request body into a storable document.
///
/// Only JSON objects map onto a document; anything else is rejected
/// without looking at the fields.
pub fn from_json(value: Value) -> Result<Document, AppError> {
    match value {
        Value::Object(_) => bson::to_document(&value)
            .map_err(|e| AppError::InvalidDocument(e.to_string())),
        other => Err(AppError::InvalidDocument(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Relaxed extended JSON, the same rendering the Node driver gives clients.
pub fn to_json(doc: Document) -> Value {
    Bson::Document(doc).into_relaxed_extjson()
}

/// Value of `key` in `doc`; a missing field reads as `null`.
pub fn key_value(doc: &Document, key: &str) -> Bson {
    doc.get(key).cloned().unwrap_or(Bson::Null)
}

/// Equality filter semantics: a `null` in the filter also matches an absent field.
pub fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| match (doc.get(key), expected) {
        (None, Bson::Null) => true,
        (None, _) => false,
        (Some(actual), expected) => actual == expected,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
