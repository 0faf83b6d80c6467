//! Quality profile mapper.
//!
//! Profiles reference custom formats by id; declarations reference them by
//! name. Names are resolved through the context lookup rebuilt after the
//! custom format stage, and names the server does not know are dropped.

use super::{lookup_pair, project, string_field};
use crate::schema::QualityProfileDef;
use crate::tables;
use reconcile::{Context, OpError, Record, ResourceMapper};
use serde_json::{Value, json};

pub struct QualityProfileMapper;

impl ResourceMapper for QualityProfileMapper {
    type Definition = QualityProfileDef;

    fn to_native(
        &self,
        definition: &QualityProfileDef,
        context: &Context,
    ) -> Result<Value, OpError> {
        let format_items: Vec<Value> = definition
            .format_scores
            .iter()
            .filter_map(|(name, score)| {
                context
                    .resolve(tables::CUSTOM_FORMATS, name)
                    .map(|id| json!({"format": id, "score": score}))
            })
            .collect();

        Ok(json!({
            "name": definition.name,
            "upgradeAllowed": definition.upgrade_allowed,
            "cutoff": definition.cutoff,
            "items": definition.items,
            "minFormatScore": definition.min_format_score,
            "cutoffFormatScore": definition.cutoff_format_score,
            "minUpgradeFormatScore": definition.min_upgrade_format_score,
            "formatItems": format_items,
        }))
    }

    fn from_native(&self, native: &Value) -> Record {
        let mut record = project(
            native,
            &[
                "id",
                "name",
                "upgradeAllowed",
                "cutoff",
                "items",
                "minFormatScore",
                "cutoffFormatScore",
                "minUpgradeFormatScore",
            ],
        );

        let format_items = match native.get("formatItems") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    json!({
                        "format": item.get("format").cloned().unwrap_or(Value::Null),
                        "score": item.get("score").cloned().unwrap_or(json!(0)),
                    })
                })
                .collect(),
            _ => Vec::new(),
        };
        record.insert("formatItems".to_string(), Value::Array(format_items));
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
    use std::collections::{BTreeMap, HashMap};

    fn context() -> Context {
        let mut ctx = Context::new();
        ctx.set_lookup(
            tables::CUSTOM_FORMATS,
            HashMap::from([("x265".to_string(), 12)]),
        );
        ctx
    }

    fn definition() -> QualityProfileDef {
        QualityProfileDef {
            name: "HD".to_string(),
            upgrade_allowed: true,
            cutoff: 7,
            items: vec![json!({"quality": {"id": 7}, "allowed": true})],
            min_format_score: 0,
            cutoff_format_score: 0,
            min_upgrade_format_score: 1,
            format_scores: BTreeMap::from([
                ("x265".to_string(), 100),
                ("unknown-format".to_string(), 50),
            ]),
        }
    }

    #[test]
    fn test_unknown_format_names_are_dropped() {
        let native = QualityProfileMapper.to_native(&definition(), &context()).unwrap();
        assert_eq!(
            native.get("formatItems"),
            Some(&json!([{"format": 12, "score": 100}]))
        );
    }

    #[test]
    fn test_score_change_is_drift() {
        let mapper = QualityProfileMapper;
        let current = mapper.from_native(&json!({
            "id": 1,
            "name": "HD",
            "upgradeAllowed": true,
            "cutoff": 7,
            "items": [{"quality": {"id": 7}, "allowed": true}],
            "minFormatScore": 0,
            "cutoffFormatScore": 0,
            "minUpgradeFormatScore": 1,
            "formatItems": [{"format": 12, "score": 80, "name": "x265"}]
        }));
        let desired = mapper.from_native(&mapper.to_native(&definition(), &context()).unwrap());
        assert!(reconcile::needs_update(
            &current,
            &desired,
            reconcile::DEFAULT_IGNORE_FIELDS
        ));
    }
}
