//! Cross-resource lookup context threaded through a sync run.
//!
//! Later stages need identifiers produced by earlier ones (a delay profile
//! references tags by id, a quality profile scores custom formats by id).
//! The orchestrator rebuilds the relevant tables after each providing stage
//! completes; within a single reconciliation pass the context is read-only.

use crate::record::Record;
use serde_json::Value;
use std::collections::HashMap;

/// Lookup tables gathered from already-synced resource types.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Name → backend identifier, per table (e.g. `"tags"`, `"custom_formats"`).
    lookups: HashMap<String, HashMap<String, i64>>,
    /// Identity key → existing native record, for resource types whose
    /// mapping needs the server's current record (fixed-cardinality types).
    records: HashMap<String, HashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a name→id lookup table.
    pub fn set_lookup(&mut self, table: impl Into<String>, entries: HashMap<String, i64>) {
        self.lookups.insert(table.into(), entries);
    }

    /// Resolve a single name against a lookup table.
    pub fn resolve(&self, table: &str, name: &str) -> Option<i64> {
        self.lookups.get(table).and_then(|map| map.get(name)).copied()
    }

    /// Resolve a batch of names, silently dropping those the table does not
    /// know. Unresolvable references are the declarer's concern, not a
    /// mapping failure.
    pub fn resolve_all<'a, I>(&self, table: &str, names: I) -> Vec<i64>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter_map(|name| self.resolve(table, name))
            .collect()
    }

    /// Replace a table of existing native records keyed by identity.
    pub fn set_records(&mut self, table: impl Into<String>, entries: HashMap<String, Value>) {
        self.records.insert(table.into(), entries);
    }

    /// Fetch an existing native record by identity key.
    pub fn record(&self, table: &str, key: &str) -> Option<&Value> {
        self.records.get(table).and_then(|map| map.get(key))
    }

    /// Comparable projection of a stored record, when present and an object.
    pub fn comparable_record(&self, table: &str, key: &str) -> Option<&Record> {
        match self.record(table, key) {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve() {
        let mut ctx = Context::new();
        ctx.set_lookup("tags", HashMap::from([("anime".to_string(), 3)]));
        assert_eq!(ctx.resolve("tags", "anime"), Some(3));
        assert_eq!(ctx.resolve("tags", "missing"), None);
        assert_eq!(ctx.resolve("other", "anime"), None);
    }

    #[test]
    fn test_resolve_all_drops_unknown_names() {
        let mut ctx = Context::new();
        ctx.set_lookup(
            "tags",
            HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]),
        );
        assert_eq!(ctx.resolve_all("tags", ["a", "nope", "b"]), vec![1, 2]);
    }

    #[test]
    fn test_set_lookup_replaces() {
        let mut ctx = Context::new();
        ctx.set_lookup("tags", HashMap::from([("old".to_string(), 1)]));
        ctx.set_lookup("tags", HashMap::from([("new".to_string(), 2)]));
        assert_eq!(ctx.resolve("tags", "old"), None);
        assert_eq!(ctx.resolve("tags", "new"), Some(2));
    }

    #[test]
    fn test_record_table() {
        let mut ctx = Context::new();
        ctx.set_records(
            "quality_definitions",
            HashMap::from([("HDTV-720p".to_string(), json!({"id": 4, "title": "HDTV-720p"}))]),
        );
        assert!(ctx.record("quality_definitions", "HDTV-720p").is_some());
        assert!(ctx.record("quality_definitions", "HDTV-1080p").is_none());
        let rec = ctx.comparable_record("quality_definitions", "HDTV-720p").unwrap();
        assert_eq!(rec.get("id"), Some(&json!(4)));
    }
}
