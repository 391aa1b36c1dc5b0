//! The `extra_json` metadata bag.
//!
//! `extra_json` is stored as JSON text holding an object keyed by feature
//! (`"columns"`, ...). Writes replace one key at a time and leave every other
//! key alone. Stored text that does not parse as an object is treated as an
//! empty bag so reads never fail.

use serde_json::{Map, Value};

/// Key under which column metadata is merged.
pub const COLUMNS_KEY: &str = "columns";

/// Typed view over the `extra_json` object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraMetadata(Map<String, Value>);

impl ExtraMetadata {
    /// Parse the stored text. `None`, blank, malformed, or non-object input
    /// yields an empty bag.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Self(map),
            Ok(other) => {
                tracing::warn!(kind = json_kind(&other), "extra_json is not an object, ignoring");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Malformed extra_json, ignoring");
                Self::default()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Replace a single key, leaving the others untouched.
    pub fn set_key(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Serialize back to the stored text form.
    pub fn to_json_string(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

/// Extract `payload["columns"]`, giving every entry that has a `"name"` a
/// matching `"column_name"`.
///
/// A missing or non-array `"columns"` is an empty list.
pub fn normalize_columns(payload: &Value) -> Vec<Value> {
    let Some(columns) = payload.get(COLUMNS_KEY).and_then(Value::as_array) else {
        return Vec::new();
    };

    columns
        .iter()
        .cloned()
        .map(|mut col| {
            if let Some(obj) = col.as_object_mut() {
                if let Some(name) = obj.get("name").cloned() {
                    obj.insert("column_name".to_string(), name);
                }
            }
            col
        })
        .collect()
}

/// Merge the normalized columns of `payload` into the stored `extra_json`
/// text and return the new text.
pub fn merge_columns(stored: Option<&str>, payload: &Value) -> String {
    let mut extra = ExtraMetadata::parse(stored);
    extra.set_key(COLUMNS_KEY, Value::Array(normalize_columns(payload)));
    extra.to_json_string()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
