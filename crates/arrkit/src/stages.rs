//! Sync stage assembly for one Sonarr instance.
//!
//! Builds the ordered list of [`SyncStage`]s from the instance config:
//! independent resources first (tags, custom formats), referencing
//! resources after them, singleton settings last. Sections absent from the
//! config produce no stage - undeclared resource types are never touched.

use crate::client::ArrClient;
use crate::error::Result;
use crate::mappers::{
    CustomFormatMapper, DelayProfileMapper, DownloadClientMapper, IndexerMapper,
    MediaManagementMapper, NamingMapper, QualityDefinitionMapper, QualityProfileMapper, TagMapper,
};
use crate::schema::InstanceConfig;
use crate::tables;
use reconcile::{Context, OpError, Reconciler, ResourceOps, ResourceStage, SyncStage};
use serde_json::Value;
use std::collections::HashMap;

/// Operations for a regular collection endpoint (`tag`, `indexer`, ...).
struct CollectionOps {
    client: ArrClient,
    path: &'static str,
}

impl ResourceOps for CollectionOps {
    fn list(&self) -> std::result::Result<Vec<Value>, OpError> {
        Ok(self.client.get_list(self.path)?)
    }

    fn create(&self, record: &Value) -> std::result::Result<Value, OpError> {
        Ok(self.client.post(self.path, record)?)
    }

    fn update(&self, id: i64, record: &Value) -> std::result::Result<Value, OpError> {
        Ok(self.client.put(self.path, id, record)?)
    }

    fn delete(&self, id: i64) -> std::result::Result<(), OpError> {
        Ok(self.client.delete(self.path, id)?)
    }
}

/// Operations for collections the server owns (`qualitydefinition`):
/// records can be listed and updated, never created or deleted.
struct FixedCollectionOps {
    client: ArrClient,
    path: &'static str,
}

impl ResourceOps for FixedCollectionOps {
    fn list(&self) -> std::result::Result<Vec<Value>, OpError> {
        Ok(self.client.get_list(self.path)?)
    }

    fn update(&self, id: i64, record: &Value) -> std::result::Result<Value, OpError> {
        Ok(self.client.put(self.path, id, record)?)
    }
}

/// Operations for singleton settings endpoints (`config/naming`): the one
/// record is presented as a single-element list.
struct SettingsOps {
    client: ArrClient,
    path: &'static str,
}

impl ResourceOps for SettingsOps {
    fn list(&self) -> std::result::Result<Vec<Value>, OpError> {
        Ok(vec![self.client.get_one(self.path)?])
    }

    fn update(&self, id: i64, record: &Value) -> std::result::Result<Value, OpError> {
        Ok(self.client.put(self.path, id, record)?)
    }
}

fn collection(client: &ArrClient, path: &'static str) -> Box<dyn ResourceOps> {
    Box::new(CollectionOps {
        client: client.clone(),
        path,
    })
}

/// Build the ordered sync stages for an instance.
pub fn build_stages(client: &ArrClient, config: &InstanceConfig) -> Vec<Box<dyn SyncStage>> {
    let mut stages: Vec<Box<dyn SyncStage>> = Vec::new();

    // 1. Tags (no dependencies; everything else may reference them)
    if let Some(section) = &config.tags {
        stages.push(Box::new(
            ResourceStage::new(
                1,
                Reconciler::new("Tag", TagMapper, collection(client, "tag")),
                section.definitions.clone(),
                section.delete_unmanaged,
            )
            .providing(tables::TAGS),
        ));
    }

    // 2. Custom formats (no dependencies; profiles score them)
    if let Some(section) = &config.custom_formats {
        stages.push(Box::new(
            ResourceStage::new(
                2,
                Reconciler::new(
                    "Custom Format",
                    CustomFormatMapper,
                    collection(client, "customformat"),
                ),
                section.definitions.clone(),
                section.delete_unmanaged,
            )
            .providing(tables::CUSTOM_FORMATS),
        ));
    }

    // 3. Quality definitions (update-only; mapping needs the server's
    //    existing records)
    if let Some(section) = &config.quality_definitions {
        stages.push(Box::new(
            ResourceStage::new(
                3,
                Reconciler::new(
                    "Quality Definition",
                    QualityDefinitionMapper,
                    Box::new(FixedCollectionOps {
                        client: client.clone(),
                        path: "qualitydefinition",
                    }),
                ),
                section.definitions.clone(),
                false,
            )
            .seeded_from(tables::QUALITY_DEFINITIONS),
        ));
    }

    // 4. Quality profiles (reference custom formats)
    if let Some(section) = &config.quality_profiles {
        stages.push(Box::new(ResourceStage::new(
            4,
            Reconciler::new(
                "Quality Profile",
                QualityProfileMapper,
                collection(client, "qualityprofile"),
            ),
            section.definitions.clone(),
            section.delete_unmanaged,
        )));
    }

    // 5. Delay profiles (reference tags)
    if let Some(section) = &config.delay_profiles {
        stages.push(Box::new(ResourceStage::new(
            5,
            Reconciler::new(
                "Delay Profile",
                DelayProfileMapper,
                collection(client, "delayprofile"),
            ),
            section.definitions.clone(),
            section.delete_unmanaged,
        )));
    }

    // 6. Indexers (may reference tags)
    if let Some(section) = &config.indexers {
        stages.push(Box::new(ResourceStage::new(
            6,
            Reconciler::new("Indexer", IndexerMapper, collection(client, "indexer")),
            section.definitions.clone(),
            section.delete_unmanaged,
        )));
    }

    // 7. Download clients (may reference tags)
    if let Some(section) = &config.download_clients {
        stages.push(Box::new(ResourceStage::new(
            7,
            Reconciler::new(
                "Download Client",
                DownloadClientMapper,
                collection(client, "downloadclient"),
            ),
            section.definitions.clone(),
            section.delete_unmanaged,
        )));
    }

    // 8. Naming settings (singleton)
    if let Some(settings) = &config.naming {
        stages.push(Box::new(ResourceStage::new(
            8,
            Reconciler::new(
                "Naming Config",
                NamingMapper,
                Box::new(SettingsOps {
                    client: client.clone(),
                    path: "config/naming",
                }),
            ),
            vec![settings.clone()],
            false,
        )));
    }

    // 9. Media management settings (singleton)
    if let Some(settings) = &config.media_management {
        stages.push(Box::new(ResourceStage::new(
            9,
            Reconciler::new(
                "Media Management Config",
                MediaManagementMapper,
                Box::new(SettingsOps {
                    client: client.clone(),
                    path: "config/mediamanagement",
                }),
            ),
            vec![settings.clone()],
            false,
        )));
    }

    stages
}

/// Pre-sync context: lookups for resource types that stages may reference
/// even when the referenced type is not itself declared. Refreshed by the
/// orchestrator after the providing stages run.
pub fn build_context(client: &ArrClient) -> Result<Context> {
    let mut context = Context::new();
    context.set_lookup(tables::TAGS, name_lookup(client, "tag", "label")?);
    context.set_lookup(
        tables::CUSTOM_FORMATS,
        name_lookup(client, "customformat", "name")?,
    );
    Ok(context)
}

fn name_lookup(client: &ArrClient, path: &str, key: &str) -> Result<HashMap<String, i64>> {
    let entries = client
        .get_list(path)?
        .iter()
        .filter_map(|item| {
            Some((
                item.get(key)?.as_str()?.to_string(),
                item.get("id")?.as_i64()?,
            ))
        })
        .collect();
    Ok(entries)
}
