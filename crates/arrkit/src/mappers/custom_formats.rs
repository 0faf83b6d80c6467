//! Custom format mapper.
//!
//! A custom format is a named bundle of specifications (conditions). The
//! specification list compares positionally, so declaration order should
//! follow the server's.

use super::{field_values, lookup_pair, project, project_field_values, string_field};
use crate::schema::CustomFormatDef;
use reconcile::{Context, OpError, Record, ResourceMapper};
use serde_json::{Value, json};

pub struct CustomFormatMapper;

impl ResourceMapper for CustomFormatMapper {
    type Definition = CustomFormatDef;

    fn to_native(
        &self,
        definition: &CustomFormatDef,
        _context: &Context,
    ) -> Result<Value, OpError> {
        let specifications: Vec<Value> = definition
            .specifications
            .iter()
            .map(|spec| {
                json!({
                    "name": spec.name,
                    "implementation": spec.implementation,
                    "negate": spec.negate,
                    "required": spec.required,
                    "fields": field_values(&spec.fields),
                })
            })
            .collect();

        Ok(json!({
            "name": definition.name,
            "includeCustomFormatWhenRenaming": definition.include_when_renaming,
            "specifications": specifications,
        }))
    }

    fn from_native(&self, native: &Value) -> Record {
        let mut record = project(native, &["id", "name", "includeCustomFormatWhenRenaming"]);

        let specifications = match native.get("specifications") {
            Some(Value::Array(specs)) => specs
                .iter()
                .map(|spec| {
                    json!({
                        "name": spec.get("name").cloned().unwrap_or(Value::Null),
                        "implementation": spec.get("implementation").cloned().unwrap_or(Value::Null),
                        "negate": spec.get("negate").cloned().unwrap_or(json!(false)),
                        "required": spec.get("required").cloned().unwrap_or(json!(false)),
                        "fields": project_field_values(spec.get("fields")),
                    })
                })
                .collect(),
            _ => Vec::new(),
        };
        record.insert("specifications".to_string(), Value::Array(specifications));
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
    use crate::schema::{FieldDef, SpecificationDef};

    fn definition() -> CustomFormatDef {
        CustomFormatDef {
            name: "x265".to_string(),
            include_when_renaming: false,
            specifications: vec![SpecificationDef {
                name: "x265".to_string(),
                implementation: "ReleaseTitleSpecification".to_string(),
                negate: false,
                required: true,
                fields: vec![FieldDef {
                    name: "value".to_string(),
                    value: json!("[xh]\\.?265"),
                }],
            }],
        }
    }

    #[test]
    fn test_round_trip_matches_decorated_server_record() {
        let mapper = CustomFormatMapper;
        let native = mapper.to_native(&definition(), &Context::new()).unwrap();
        let desired = mapper.from_native(&native);

        // What the server would hand back: same content plus decoration.
        let server = json!({
            "id": 12,
            "name": "x265",
            "includeCustomFormatWhenRenaming": false,
            "specifications": [{
                "name": "x265",
                "implementation": "ReleaseTitleSpecification",
                "implementationName": "Release Title",
                "negate": false,
                "required": true,
                "fields": [
                    {"name": "value", "value": "[xh]\\.?265", "label": "Regular Expression", "order": 0}
                ]
            }]
        });
        let current = mapper.from_native(&server);

        assert_eq!(mapper.identity_key(&current), "x265");
        assert!(!reconcile::needs_update(
            &current,
            &desired,
            reconcile::DEFAULT_IGNORE_FIELDS
        ));
    }

    #[test]
    fn test_specification_change_is_drift() {
        let mapper = CustomFormatMapper;
        let mut changed = definition();
        changed.specifications[0].required = false;

        let current = mapper.from_native(&mapper.to_native(&definition(), &Context::new()).unwrap());
        let desired = mapper.from_native(&mapper.to_native(&changed, &Context::new()).unwrap());
        assert!(reconcile::needs_update(
            &current,
            &desired,
            reconcile::DEFAULT_IGNORE_FIELDS
        ));
    }
}
