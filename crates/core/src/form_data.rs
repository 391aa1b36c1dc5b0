//! Tolerant handling of the stored `params` ("form data") blob.
//!
//! `params` is written by clients and may be malformed in storage. Reads must
//! never fail because of it: a bad blob is logged and replaced with an empty
//! object. Writes through the API are validated with [`validate_params`].

use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::types::DbId;

/// Validate caller-supplied `params` text. It must be a JSON object.
pub fn validate_params(params: &str) -> Result<(), CoreError> {
    match serde_json::from_str::<Value>(params) {
        Ok(Value::Object(_)) => Ok(()),
        Ok(_) => Err(CoreError::Validation(
            "params must be a JSON object".to_string(),
        )),
        Err(e) => Err(CoreError::Validation(format!("params is not valid JSON: {e}"))),
    }
}

/// Parse stored `params`, substituting an empty object on any failure.
pub fn parse_params(params: Option<&str>, source_id: DbId) -> Map<String, Value> {
    let Some(raw) = params.filter(|s| !s.trim().is_empty()) else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            tracing::warn!(source_id, "Source params is not a JSON object, using empty form data");
            Map::new()
        }
        Err(e) => {
            tracing::warn!(source_id, error = %e, "Malformed JSON in source params, using empty form data");
            Map::new()
        }
    }
}

/// Move the legacy `since` / `until` pair into a single `time_range`.
///
/// `{"since": "7 days ago", "until": "now"}` becomes
/// `{"time_range": "7 days ago : now"}`. Null members count as empty.
pub fn update_time_range(form_data: &mut Map<String, Value>) {
    if !form_data.contains_key("since") && !form_data.contains_key("until") {
        return;
    }
    let since = take_string(form_data, "since");
    let until = take_string(form_data, "until");
    form_data.insert(
        "time_range".to_string(),
        Value::String(format!("{since} : {until}")),
    );
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> String {
    match map.remove(key) {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Inputs to [`build_form_data`], borrowed from a persisted source.
#[derive(Debug, Clone, Copy)]
pub struct FormDataInput<'a> {
    pub source_id: DbId,
    pub params: Option<&'a str>,
    pub datasource_id: Option<DbId>,
    pub datasource_type: Option<&'a str>,
    pub cache_timeout: Option<i32>,
}

/// Effective form data for rendering: stored params plus the fields derived
/// from the record itself.
pub fn build_form_data(input: FormDataInput<'_>) -> Map<String, Value> {
    let mut form_data = parse_params(input.params, input.source_id);

    form_data.insert("source_id".to_string(), Value::from(input.source_id));
    if let (Some(id), Some(kind)) = (input.datasource_id, input.datasource_type) {
        form_data.insert(
            "datasource".to_string(),
            Value::String(format!("{id}__{kind}")),
        );
    }
    if let Some(timeout) = input.cache_timeout.filter(|t| *t != 0) {
        form_data.insert("cache_timeout".to_string(), Value::from(timeout));
    }

    update_time_range(&mut form_data);
    form_data
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn input(params: Option<&str>) -> FormDataInput<'_> {
        FormDataInput {
            source_id: 5,
            params,
            datasource_id: Some(12),
            datasource_type: Some("table"),
            cache_timeout: None,
        }
    }

    #[test]
    fn validate_accepts_object() {
        assert!(validate_params(r#"{"viz_type": "table"}"#).is_ok());
    }

    #[test]
    fn validate_rejects_garbage_and_non_objects() {
        assert_matches!(validate_params("{oops"), Err(CoreError::Validation(_)));
        assert_matches!(validate_params("[1]"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn malformed_params_yield_derived_fields_only() {
        let fd = build_form_data(input(Some("{broken")));
        assert_eq!(Value::Object(fd), json!({"source_id": 5, "datasource": "12__table"}));
    }

    #[test]
    fn stored_params_are_kept() {
        let fd = build_form_data(input(Some(r#"{"metric": "count"}"#)));
        assert_eq!(fd["metric"], "count");
        assert_eq!(fd["source_id"], 5);
    }

    #[test]
    fn cache_timeout_only_when_non_zero() {
        let mut i = input(None);
        i.cache_timeout = Some(0);
        assert!(!build_form_data(i).contains_key("cache_timeout"));
        i.cache_timeout = Some(300);
        assert_eq!(build_form_data(i)["cache_timeout"], 300);
    }

    #[test]
    fn datasource_omitted_without_reference() {
        let mut i = input(None);
        i.datasource_id = None;
        assert!(!build_form_data(i).contains_key("datasource"));
    }

    #[test]
    fn since_until_become_time_range() {
        let mut fd = json!({"since": "7 days ago", "until": null, "x": 1})
            .as_object()
            .cloned()
            .unwrap();
        update_time_range(&mut fd);
        assert_eq!(Value::Object(fd), json!({"time_range": "7 days ago : ", "x": 1}));
    }

    #[test]
    fn time_range_untouched_without_legacy_keys() {
        let mut fd = json!({"time_range": "Last week"}).as_object().cloned().unwrap();
        update_time_range(&mut fd);
        assert_eq!(fd["time_range"], "Last week");
    }
}
