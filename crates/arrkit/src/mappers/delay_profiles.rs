//! Delay profile mapper.
//!
//! Delay profiles have no name; two profiles are the same resource when
//! they apply to the same set of tags. The identity key is the sorted tag
//! id set, so declaration order never splits a profile in two.

use super::project;
use crate::schema::DelayProfileDef;
use crate::tables;
use reconcile::{Context, OpError, Record, ResourceMapper};
use serde_json::{Value, json};

pub struct DelayProfileMapper;

impl ResourceMapper for DelayProfileMapper {
    type Definition = DelayProfileDef;

    fn to_native(
        &self,
        definition: &DelayProfileDef,
        context: &Context,
    ) -> Result<Value, OpError> {
        let tag_ids =
            context.resolve_all(tables::TAGS, definition.tags.iter().map(String::as_str));

        let protocol = match definition.preferred_protocol.to_lowercase().as_str() {
            "usenet" => "usenet",
            "torrent" => "torrent",
            _ => "usenetPrefer",
        };

        Ok(json!({
            "preferredProtocol": protocol,
            "usenetDelay": definition.usenet_delay,
            "torrentDelay": definition.torrent_delay,
            "bypassIfHighestQuality": definition.bypass_if_highest_quality,
            "tags": tag_ids,
            "order": definition.order,
        }))
    }

    fn from_native(&self, native: &Value) -> Record {
        let mut record = project(
            native,
            &[
                "id",
                "preferredProtocol",
                "usenetDelay",
                "torrentDelay",
                "bypassIfHighestQuality",
                "tags",
                "order",
            ],
        );
        // The identity key needs the tag set even when the server omits it.
        record
            .entry("tags".to_string())
            .or_insert_with(|| json!([]));
        record
    }

    fn identity_key(&self, record: &Record) -> String {
        let mut tag_ids: Vec<i64> = record
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default();
        tag_ids.sort_unstable();
        tag_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn context() -> Context {
        let mut ctx = Context::new();
        ctx.set_lookup(
            tables::TAGS,
            HashMap::from([("anime".to_string(), 1), ("daily".to_string(), 3)]),
        );
        ctx
    }

    fn definition(tags: Vec<&str>) -> DelayProfileDef {
        DelayProfileDef {
            preferred_protocol: "both".to_string(),
            usenet_delay: 0,
            torrent_delay: 30,
            bypass_if_highest_quality: true,
            tags: tags.into_iter().map(String::from).collect(),
            order: 1,
        }
    }

    #[test]
    fn test_identity_canonicalizes_tag_order() {
        let mapper = DelayProfileMapper;
        let a = mapper.from_native(&json!({"id": 2, "tags": [3, 1]}));
        let b = mapper.from_native(&json!({"tags": [1, 3]}));
        assert_eq!(mapper.identity_key(&a), "1,3");
        assert_eq!(mapper.identity_key(&a), mapper.identity_key(&b));
    }

    #[test]
    fn test_tagless_profile_has_empty_key() {
        let mapper = DelayProfileMapper;
        let record = mapper.from_native(&json!({"id": 1, "order": 2147483647}));
        assert_eq!(mapper.identity_key(&record), "");
    }

    #[test]
    fn test_protocol_normalization() {
        let mapper = DelayProfileMapper;
        let native = mapper.to_native(&definition(vec![]), &Context::new()).unwrap();
        assert_eq!(native.get("preferredProtocol"), Some(&json!("usenetPrefer")));

        let mut torrent_only = definition(vec![]);
        torrent_only.preferred_protocol = "Torrent".to_string();
        let native = mapper.to_native(&torrent_only, &Context::new()).unwrap();
        assert_eq!(native.get("preferredProtocol"), Some(&json!("torrent")));
    }

    #[test]
    fn test_unknown_tags_dropped_known_resolved() {
        let native = DelayProfileMapper
            .to_native(&definition(vec!["daily", "nonexistent", "anime"]), &context())
            .unwrap();
        assert_eq!(native.get("tags"), Some(&json!([3, 1])));
    }

    #[test]
    fn test_reordered_tags_are_not_drift() {
        let mapper = DelayProfileMapper;
        let current = mapper.from_native(&json!({
            "id": 2, "preferredProtocol": "usenetPrefer", "usenetDelay": 0,
            "torrentDelay": 30, "bypassIfHighestQuality": true, "tags": [3, 1], "order": 1
        }));
        let desired = mapper.from_native(
            &mapper.to_native(&definition(vec!["anime", "daily"]), &context()).unwrap(),
        );
        // Desired resolves to [1, 3]; scalar lists compare as sets.
        assert!(!reconcile::needs_update(
            &current,
            &desired,
            reconcile::DEFAULT_IGNORE_FIELDS
        ));
    }
}
