//! Download client mapper.

use super::{field_values, lookup_pair, project, project_field_values, string_field};
use crate::schema::DownloadClientDef;
use crate::tables;
use reconcile::{Context, OpError, Record, ResourceMapper};
use serde_json::{Value, json};

pub struct DownloadClientMapper;

impl ResourceMapper for DownloadClientMapper {
    type Definition = DownloadClientDef;

    fn to_native(
        &self,
        definition: &DownloadClientDef,
        context: &Context,
    ) -> Result<Value, OpError> {
        let tag_ids =
            context.resolve_all(tables::TAGS, definition.tags.iter().map(String::as_str));

        Ok(json!({
            "name": definition.name,
            "implementation": definition.implementation,
            "enable": definition.enable,
            "priority": definition.priority,
            "removeCompletedDownloads": definition.remove_completed_downloads,
            "removeFailedDownloads": definition.remove_failed_downloads,
            "tags": tag_ids,
            "fields": field_values(&definition.fields),
        }))
    }

    fn from_native(&self, native: &Value) -> Record {
        let mut record = project(
            native,
            &[
                "id",
                "name",
                "implementation",
                "enable",
                "priority",
                "removeCompletedDownloads",
                "removeFailedDownloads",
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
