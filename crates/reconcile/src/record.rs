//! Comparable records - the flat key-value shape everything diffs against.
//!
//! A [`Record`] is the backend-agnostic projection of one resource instance.
//! Using `serde_json::Map` gives a uniform tagged value type (string, number,
//! bool, null, nested record, list) without committing the engine to any
//! resource schema.

use serde_json::{Map, Value};

/// Flat key-value projection of a resource instance.
pub type Record = Map<String, Value>;

/// Extract the backend-assigned identifier from a record, if present.
///
/// Backends hand out integer ids; a record freshly mapped from a
/// declarative definition has none.
pub fn record_id(record: &Record) -> Option<i64> {
    record.get("id").and_then(Value::as_i64)
}

/// Canonical string form of a value.
///
/// Used to sort scalar lists for order-independent comparison. JSON
/// serialization is stable for scalars, which is all this is applied to.
pub(crate) fn canonical(value: &Value) -> String {
    value.to_string()
}

/// Whether a value is a scalar (not a nested record or list).
pub(crate) fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}
