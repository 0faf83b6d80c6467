//! Resource mappers - one per Sonarr resource type.
//!
//! Each mapper implements [`reconcile::ResourceMapper`] for its definition
//! type: build the camelCase wire record, project server records down to
//! the comparable fields we manage, and derive the identity key.

pub mod custom_formats;
pub mod delay_profiles;
pub mod download_clients;
pub mod indexers;
pub mod media_management;
pub mod naming;
pub mod quality_definitions;
pub mod quality_profiles;
pub mod tags;

pub use custom_formats::CustomFormatMapper;
pub use delay_profiles::DelayProfileMapper;
pub use download_clients::DownloadClientMapper;
pub use indexers::IndexerMapper;
pub use media_management::MediaManagementMapper;
pub use naming::NamingMapper;
pub use quality_definitions::QualityDefinitionMapper;
pub use quality_profiles::QualityProfileMapper;
pub use tags::TagMapper;

use crate::schema::FieldDef;
use reconcile::Record;
use serde_json::{Value, json};

/// Copy the listed keys out of a native record, skipping absent ones.
pub(crate) fn project(native: &Value, keys: &[&str]) -> Record {
    let mut record = Record::new();
    if let Value::Object(map) = native {
        for key in keys {
            if let Some(value) = map.get(*key) {
                record.insert((*key).to_string(), value.clone());
            }
        }
    }
    record
}

/// String field accessor for identity keys.
pub(crate) fn string_field(record: &Record, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// `(name, id)` lookup pair from a native record.
pub(crate) fn lookup_pair(native: &Value, name_key: &str) -> Option<(String, i64)> {
    Some((
        native.get(name_key)?.as_str()?.to_string(),
        native.get("id")?.as_i64()?,
    ))
}

/// Wire form of declared settings fields.
pub(crate) fn field_values(fields: &[FieldDef]) -> Value {
    Value::Array(
        fields
            .iter()
            .map(|field| json!({"name": field.name, "value": field.value}))
            .collect(),
    )
}

/// Reduce a wire field list to comparable `{name, value}` pairs. The
/// server decorates fields with labels, types and ordering we never
/// declare.
pub(crate) fn project_field_values(fields: Option<&Value>) -> Value {
    match fields {
        Some(Value::Array(items)) => Value::Array(
            items
                .iter()
                .map(|item| {
                    json!({
                        "name": item.get("name").cloned().unwrap_or(Value::Null),
                        "value": item.get("value").cloned().unwrap_or(Value::Null),
                    })
                })
                .collect(),
        ),
        _ => Value::Array(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_skips_absent_keys() {
        let native = json!({"id": 1, "name": "x"});
        let record = project(&native, &["id", "name", "missing"]);
        assert_eq!(record.len(), 2);
        assert!(!record.contains_key("missing"));
    }

    #[test]
    fn test_project_field_values_strips_decoration() {
        let fields = json!([
            {"name": "baseUrl", "value": "http://x", "label": "URL", "order": 0, "type": "textbox"}
        ]);
        let projected = project_field_values(Some(&fields));
        assert_eq!(
            projected,
            json!([{"name": "baseUrl", "value": "http://x"}])
        );
    }

    #[test]
    fn test_project_field_values_absent() {
        assert_eq!(project_field_values(None), json!([]));
    }
}
