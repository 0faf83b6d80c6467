//! Quality definition mapper.
//!
//! The server owns the set of qualities; declarations only adjust size
//! thresholds on existing definitions. Mapping therefore starts from the
//! server's current record (seeded into the context by the orchestrator)
//! and rewrites the sizes, preserving id, quality and weight.

use super::{project, string_field};
use crate::tables;
use reconcile::{Context, OpError, Record, ResourceMapper};
use serde_json::{Value, json};

pub struct QualityDefinitionMapper;

impl ResourceMapper for QualityDefinitionMapper {
    type Definition = crate::schema::QualityDefinitionDef;

    fn to_native(
        &self,
        definition: &Self::Definition,
        context: &Context,
    ) -> Result<Value, OpError> {
        let existing = context
            .record(tables::QUALITY_DEFINITIONS, &definition.title)
            .ok_or_else(|| {
                OpError::Precondition(format!(
                    "quality definition '{}' not present on server",
                    definition.title
                ))
            })?;

        let mut native = existing.clone();
        if let Value::Object(map) = &mut native {
            map.insert("minSize".to_string(), json!(definition.min_size));
            map.insert("maxSize".to_string(), json!(definition.max_size));
            map.insert("preferredSize".to_string(), json!(definition.preferred_size));
        }
        Ok(native)
    }

    fn from_native(&self, native: &Value) -> Record {
        let mut record = project(
            native,
            &["id", "title", "minSize", "maxSize", "preferredSize", "weight"],
        );
        // Sizes arrive as integers when whole; compare as floats on both
        // sides so 40 and 40.0 do not read as drift.
        for key in ["minSize", "maxSize", "preferredSize"] {
            if let Some(size) = record.get(key).and_then(Value::as_f64) {
                record.insert(key.to_string(), json!(size));
            }
        }
        record
    }

    fn identity_key(&self, record: &Record) -> String {
        string_field(record, "title")
    }
}
