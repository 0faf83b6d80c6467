//! Structural drift detection between a current and a desired record.

use crate::record::{Record, canonical, is_scalar};
use serde_json::Value;

/// Fields skipped by comparison unless the caller overrides them.
///
/// The backend-assigned identifier never counts as drift.
pub const DEFAULT_IGNORE_FIELDS: &[&str] = &["id"];

/// Whether `current` must be updated to match `desired`.
///
/// Only fields present in `desired` are considered; anything the declarer
/// did not write down is left to the backend. Fields named in
/// `ignore_fields` are skipped at every nesting level. Nested records
/// recurse with the same ignore-aware logic. Lists of scalars compare
/// order-independently so the declarer's field order cannot cause spurious
/// updates; lists holding nested records compare by strict positional
/// equality.
pub fn needs_update(current: &Record, desired: &Record, ignore_fields: &[&str]) -> bool {
    desired.iter().any(|(key, desired_value)| {
        if ignore_fields.contains(&key.as_str()) {
            return false;
        }
        match current.get(key) {
            None => true,
            Some(current_value) => value_differs(current_value, desired_value, ignore_fields),
        }
    })
}

fn value_differs(current: &Value, desired: &Value, ignore_fields: &[&str]) -> bool {
    match (current, desired) {
        (Value::Object(current), Value::Object(desired)) => {
            needs_update(current, desired, ignore_fields)
        }
        (Value::Array(current), Value::Array(desired)) => list_differs(current, desired),
        _ => current != desired,
    }
}

fn list_differs(current: &[Value], desired: &[Value]) -> bool {
    if current.len() != desired.len() {
        return true;
    }

    // Scalar lists are sets as far as the declarer is concerned.
    if current.iter().all(is_scalar) && desired.iter().all(is_scalar) {
        let mut current: Vec<String> = current.iter().map(canonical).collect();
        let mut desired: Vec<String> = desired.iter().map(canonical).collect();
        current.sort();
        desired.sort();
        return current != desired;
    }

    // Lists with nested records compare positionally. A backend that
    // reorders such entries will read as drifted.
    current != desired
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("not a record: {other}"),
        }
    }

    #[test]
    fn test_identical_records() {
        let current = record(json!({"name": "x", "priority": 5}));
        let desired = record(json!({"name": "x", "priority": 5}));
        assert!(!needs_update(&current, &desired, DEFAULT_IGNORE_FIELDS));
    }

    #[test]
    fn test_changed_scalar_field() {
        let current = record(json!({"name": "x", "priority": 5}));
        let desired = record(json!({"name": "x", "priority": 9}));
        assert!(needs_update(&current, &desired, DEFAULT_IGNORE_FIELDS));
    }

    #[test]
    fn test_field_missing_from_current() {
        let current = record(json!({"name": "x"}));
        let desired = record(json!({"name": "x", "enable": true}));
        assert!(needs_update(&current, &desired, DEFAULT_IGNORE_FIELDS));
    }

    #[test]
    fn test_extra_current_fields_are_not_drift() {
        // Fields absent from desired are never considered.
        let current = record(json!({"name": "x", "server_only": "whatever"}));
        let desired = record(json!({"name": "x"}));
        assert!(!needs_update(&current, &desired, DEFAULT_IGNORE_FIELDS));
    }

    #[test]
    fn test_id_field_ignored_by_default() {
        let current = record(json!({"id": 1, "name": "x"}));
        let desired = record(json!({"id": null, "name": "x"}));
        assert!(!needs_update(&current, &desired, DEFAULT_IGNORE_FIELDS));
    }

    #[test]
    fn test_custom_ignore_fields() {
        let current = record(json!({"name": "x", "updated_at": "yesterday"}));
        let desired = record(json!({"name": "x", "updated_at": "today"}));
        assert!(needs_update(&current, &desired, DEFAULT_IGNORE_FIELDS));
        assert!(!needs_update(&current, &desired, &["id", "updated_at"]));
    }

    #[test]
    fn test_scalar_list_order_independent() {
        let current = record(json!({"tags": ["a", "b"]}));
        let desired = record(json!({"tags": ["b", "a"]}));
        assert!(!needs_update(&current, &desired, DEFAULT_IGNORE_FIELDS));
    }

    #[test]
    fn test_scalar_list_content_change() {
        let current = record(json!({"tags": [1, 2]}));
        let desired = record(json!({"tags": [1, 3]}));
        assert!(needs_update(&current, &desired, DEFAULT_IGNORE_FIELDS));
    }

    #[test]
    fn test_list_length_change() {
        let current = record(json!({"tags": [1, 2]}));
        let desired = record(json!({"tags": [1]}));
        assert!(needs_update(&current, &desired, DEFAULT_IGNORE_FIELDS));
    }

    #[test]
    fn test_nested_record_recursion() {
        let current = record(json!({"name": "x", "settings": {"host": "a", "port": 1}}));
        let same = record(json!({"name": "x", "settings": {"port": 1}}));
        let changed = record(json!({"name": "x", "settings": {"port": 2}}));
        assert!(!needs_update(&current, &same, DEFAULT_IGNORE_FIELDS));
        assert!(needs_update(&current, &changed, DEFAULT_IGNORE_FIELDS));
    }

    #[test]
    fn test_nested_record_respects_ignore_fields() {
        let current = record(json!({"name": "x", "settings": {"id": 4, "port": 1}}));
        let desired = record(json!({"name": "x", "settings": {"id": 9, "port": 1}}));
        assert!(!needs_update(&current, &desired, DEFAULT_IGNORE_FIELDS));
    }

    #[test]
    fn test_record_list_positional() {
        let current = record(json!({"specs": [{"name": "a"}, {"name": "b"}]}));
        let reordered = record(json!({"specs": [{"name": "b"}, {"name": "a"}]}));
        // Known precision gap: nested-record lists are order-sensitive.
        assert!(needs_update(&current, &reordered, DEFAULT_IGNORE_FIELDS));
    }

    #[test]
    fn test_type_change_is_drift() {
        let current = record(json!({"value": "5"}));
        let desired = record(json!({"value": 5}));
        assert!(needs_update(&current, &desired, DEFAULT_IGNORE_FIELDS));
    }
}
