//! Tag mapper. Tags are the simplest resource: a label and an id.

use super::{lookup_pair, project, string_field};
use reconcile::{Context, OpError, Record, ResourceMapper};
use serde_json::{Value, json};

pub struct TagMapper;

impl ResourceMapper for TagMapper {
    type Definition = String;

    fn to_native(&self, definition: &String, _context: &Context) -> Result<Value, OpError> {
        Ok(json!({"label": definition}))
    }

    fn from_native(&self, native: &Value) -> Record {
        project(native, &["id", "label"])
    }

    fn identity_key(&self, record: &Record) -> String {
        string_field(record, "label")
    }

    fn lookup_entry(&self, native: &Value) -> Option<(String, i64)> {
        lookup_pair(native, "label")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_matches_server_record() {
        let mapper = TagMapper;
        let native = mapper.to_native(&"anime".to_string(), &Context::new()).unwrap();
        let desired = mapper.from_native(&native);
        let current = mapper.from_native(&json!({"id": 3, "label": "anime"}));

        assert_eq!(mapper.identity_key(&desired), "anime");
        assert_eq!(mapper.identity_key(&current), "anime");
        assert!(!reconcile::needs_update(
            &current,
            &desired,
            reconcile::DEFAULT_IGNORE_FIELDS
        ));
    }

    #[test]
    fn test_lookup_entry() {
        let entry = TagMapper.lookup_entry(&json!({"id": 5, "label": "x"}));
        assert_eq!(entry, Some(("x".to_string(), 5)));
        assert_eq!(TagMapper.lookup_entry(&json!({"label": "x"})), None);
    }
}
