//! Indexer mapper.

use super::{field_values, lookup_pair, project, project_field_values, string_field};
use crate::schema::IndexerDef;
use crate::tables;
use reconcile::{Context, OpError, Record, ResourceMapper};
use serde_json::{Value, json};

pub struct IndexerMapper;

impl ResourceMapper for IndexerMapper {
    type Definition = IndexerDef;

    fn to_native(&self, definition: &IndexerDef, context: &Context) -> Result<Value, OpError> {
        let tag_ids =
            context.resolve_all(tables::TAGS, definition.tags.iter().map(String::as_str));

        let mut native = json!({
            "name": definition.name,
            "implementation": definition.implementation,
            "enableRss": definition.enable_rss,
            "enableAutomaticSearch": definition.enable_automatic_search,
            "enableInteractiveSearch": definition.enable_interactive_search,
            "priority": definition.priority,
            "tags": tag_ids,
            "fields": field_values(&definition.fields),
        });
        if let (Some(id), Value::Object(map)) = (definition.download_client_id, &mut native) {
            map.insert("downloadClientId".to_string(), json!(id));
        }
        Ok(native)
    }

    fn from_native(&self, native: &Value) -> Record {
        let mut record = project(
            native,
            &[
                "id",
                "name",
                "implementation",
                "enableRss",
                "enableAutomaticSearch",
                "enableInteractiveSearch",
                "priority",
                "downloadClientId",
                "tags",
            ],
        );
        record.insert(
            "fields".to_string(),
            project_field_values(native.get("fields")),
        );
        record
    }

    fn identity_key(&self, record: &Record) -> String {
        string_field(record, "name")
    }

    fn lookup_entry(&self, native: &Value) -> Option<(String, i64)> {
        lookup_pair(native, "name")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;
    use std::collections::HashMap;

    fn definition() -> IndexerDef {
        IndexerDef {
            name: "nzb-main".to_string(),
            implementation: "Newznab".to_string(),
            enable_rss: true,
            enable_automatic_search: true,
            enable_interactive_search: false,
            priority: 25,
            download_client_id: None,
            tags: vec!["anime".to_string()],
            fields: vec![FieldDef {
                name: "baseUrl".to_string(),
                value: json!("https://indexer.example"),
            }],
        }
    }

    #[test]
    fn test_tags_resolved_through_context() {
        let mut ctx = Context::new();
        ctx.set_lookup(tables::TAGS, HashMap::from([("anime".to_string(), 7)]));
        let native = IndexerMapper.to_native(&definition(), &ctx).unwrap();
        assert_eq!(native.get("tags"), Some(&json!([7])));
        assert!(native.get("downloadClientId").is_none());
    }

    #[test]
    fn test_download_client_id_included_when_set() {
        let mut def = definition();
        def.download_client_id = Some(2);
        let native = IndexerMapper.to_native(&def, &Context::new()).unwrap();
        assert_eq!(native.get("downloadClientId"), Some(&json!(2)));
    }

    #[test]
    fn test_identity_is_name() {
        let record = IndexerMapper.from_native(&json!({"id": 1, "name": "nzb-main"}));
        assert_eq!(IndexerMapper.identity_key(&record), "nzb-main");
    }
}
