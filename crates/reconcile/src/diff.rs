//! Diff computation - partition current vs desired into create/update/delete.

use crate::record::Record;
use std::collections::HashMap;

/// The changes needed to converge current state onto desired state.
///
/// Produced by one [`compute_diff`] pass and consumed within the same
/// reconciliation; update entries pair the existing record (which carries
/// the backend identifier) with the desired item.
#[derive(Debug, Clone)]
pub struct ChangeSet<T> {
    /// Desired items with no matching current record.
    pub to_create: Vec<T>,
    /// Matched pairs whose content differs: `(current, desired)`.
    pub to_update: Vec<(Record, T)>,
    /// Current records absent from desired. Only populated when deletion
    /// of unmanaged records was requested.
    pub to_delete: Vec<Record>,
}

impl<T> ChangeSet<T> {
    /// Whether the diff found nothing to do.
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Human-readable summary, e.g. `"2 to create, 1 to delete"`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.to_create.is_empty() {
            parts.push(format!("{} to create", self.to_create.len()));
        }
        if !self.to_update.is_empty() {
            parts.push(format!("{} to update", self.to_update.len()));
        }
        if !self.to_delete.is_empty() {
            parts.push(format!("{} to delete", self.to_delete.len()));
        }

        if parts.is_empty() {
            return "no changes".to_string();
        }

        parts.join(", ")
    }
}

impl<T> Default for ChangeSet<T> {
    fn default() -> Self {
        Self {
            to_create: Vec::new(),
            to_update: Vec::new(),
            to_delete: Vec::new(),
        }
    }
}

/// Partition `current` and `desired` into a [`ChangeSet`].
///
/// Both sides are keyed by their identity function; duplicate keys within
/// one side resolve last-write-wins (duplicates are a caller error, not
/// validated here). Desired keys missing from current become creates;
/// matched keys become updates when `needs_update` says the content
/// differs. Current keys missing from desired become deletes only when
/// `delete_unmanaged` is set; otherwise unmanaged records are preserved
/// untouched. Output order follows input order on each side. No backend
/// contact happens here.
pub fn compute_diff<T>(
    current: Vec<Record>,
    desired: Vec<T>,
    current_key: impl Fn(&Record) -> String,
    desired_key: impl Fn(&T) -> String,
    mut needs_update: impl FnMut(&Record, &T) -> bool,
    delete_unmanaged: bool,
) -> ChangeSet<T> {
    // Identity-keyed maps, last write wins on duplicates.
    let mut current_map: HashMap<String, Record> = HashMap::new();
    let mut current_order: Vec<String> = Vec::new();
    for record in current {
        let key = current_key(&record);
        if current_map.insert(key.clone(), record).is_none() {
            current_order.push(key);
        }
    }

    let mut desired_map: HashMap<String, T> = HashMap::new();
    let mut desired_order: Vec<String> = Vec::new();
    for item in desired {
        let key = desired_key(&item);
        if desired_map.insert(key.clone(), item).is_none() {
            desired_order.push(key);
        }
    }

    let mut changes = ChangeSet::default();

    for key in &desired_order {
        let Some(item) = desired_map.remove(key) else {
            continue;
        };
        match current_map.remove(key) {
            // Doesn't exist on the backend yet
            None => changes.to_create.push(item),
            // Exists, check for drift
            Some(record) => {
                if needs_update(&record, &item) {
                    changes.to_update.push((record, item));
                }
            }
        }
    }

    if delete_unmanaged {
        for key in &current_order {
            if let Some(record) = current_map.remove(key) {
                changes.to_delete.push(record);
            }
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{DEFAULT_IGNORE_FIELDS, needs_update};
    use serde_json::{Value, json};

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("not a record: {other}"),
        }
    }

    fn name_of(record: &Record) -> String {
        record
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn diff(
        current: Vec<Record>,
        desired: Vec<Record>,
        delete_unmanaged: bool,
    ) -> ChangeSet<Record> {
        compute_diff(
            current,
            desired,
            name_of,
            name_of,
            |cur, des| needs_update(cur, des, DEFAULT_IGNORE_FIELDS),
            delete_unmanaged,
        )
    }

    #[test]
    fn test_create_when_absent() {
        let changes = diff(vec![], vec![record(json!({"name": "X"}))], false);
        assert_eq!(changes.to_create.len(), 1);
        assert!(changes.to_update.is_empty());
        assert!(changes.to_delete.is_empty());
        assert_eq!(changes.summary(), "1 to create");
    }

    #[test]
    fn test_update_when_drifted() {
        let changes = diff(
            vec![record(json!({"id": 1, "name": "X", "priority": 5}))],
            vec![record(json!({"name": "X", "priority": 9}))],
            false,
        );
        assert!(changes.to_create.is_empty());
        assert_eq!(changes.to_update.len(), 1);
        let (current, desired) = &changes.to_update[0];
        assert_eq!(current.get("priority"), Some(&json!(5)));
        assert_eq!(desired.get("priority"), Some(&json!(9)));
    }

    #[test]
    fn test_no_change_when_matching() {
        let changes = diff(
            vec![record(json!({"id": 1, "name": "X", "priority": 5}))],
            vec![record(json!({"name": "X", "priority": 5}))],
            true,
        );
        assert!(changes.is_empty());
        assert_eq!(changes.summary(), "no changes");
    }

    #[test]
    fn test_delete_suppressed_by_default_flag() {
        let current = vec![record(json!({"id": 1, "name": "Y"}))];
        let changes = diff(current.clone(), vec![], false);
        assert!(changes.is_empty());

        let changes = diff(current, vec![], true);
        assert_eq!(changes.to_delete.len(), 1);
        assert_eq!(changes.to_delete[0].get("name"), Some(&json!("Y")));
    }

    #[test]
    fn test_partition_is_complete() {
        // Every desired record lands in exactly one of create/update;
        // every current record in exactly one of update/delete/preserved.
        let current = vec![
            record(json!({"id": 1, "name": "same", "v": 1})),
            record(json!({"id": 2, "name": "drifted", "v": 1})),
            record(json!({"id": 3, "name": "unmanaged", "v": 1})),
        ];
        let desired = vec![
            record(json!({"name": "same", "v": 1})),
            record(json!({"name": "drifted", "v": 2})),
            record(json!({"name": "new", "v": 1})),
        ];
        let changes = diff(current, desired, true);
        assert_eq!(changes.to_create.len(), 1);
        assert_eq!(changes.to_update.len(), 1);
        assert_eq!(changes.to_delete.len(), 1);
        assert_eq!(name_of(&changes.to_create[0]), "new");
        assert_eq!(name_of(&changes.to_update[0].0), "drifted");
        assert_eq!(name_of(&changes.to_delete[0]), "unmanaged");
    }

    #[test]
    fn test_duplicate_desired_keys_last_write_wins() {
        let changes = diff(
            vec![],
            vec![
                record(json!({"name": "X", "v": 1})),
                record(json!({"name": "X", "v": 2})),
            ],
            false,
        );
        assert_eq!(changes.to_create.len(), 1);
        assert_eq!(changes.to_create[0].get("v"), Some(&json!(2)));
    }

    #[test]
    fn test_output_preserves_input_order() {
        let desired = vec![
            record(json!({"name": "b"})),
            record(json!({"name": "a"})),
            record(json!({"name": "c"})),
        ];
        let changes = diff(vec![], desired, false);
        let names: Vec<String> = changes.to_create.iter().map(name_of).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_summary_combined() {
        let changes = diff(
            vec![
                record(json!({"id": 1, "name": "drifted", "v": 1})),
                record(json!({"id": 2, "name": "gone"})),
            ],
            vec![
                record(json!({"name": "drifted", "v": 2})),
                record(json!({"name": "new"})),
            ],
            true,
        );
        assert_eq!(changes.summary(), "1 to create, 1 to update, 1 to delete");
    }
}
