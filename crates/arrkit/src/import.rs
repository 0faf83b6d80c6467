//! Import a live server's configuration into declarative form.
//!
//! The inverse of a sync: read every managed resource type and build an
//! [`InstanceConfig`] that, synced back, would be a no-op. Secrets are
//! masked with environment-variable placeholders unless explicitly
//! included.

use crate::client::ArrClient;
use crate::error::Result;
use crate::schema::{
    CustomFormatDef, CustomFormatsSection, DelayProfileDef, DelayProfilesSection,
    DownloadClientDef, DownloadClientsSection, FieldDef, IndexerDef, IndexersSection,
    InstanceConfig, MediaManagementSettings, NamingSettings, QualityDefinitionDef,
    QualityDefinitionsSection, QualityProfileDef, QualityProfilesSection, SpecificationDef,
    TagsSection,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

const SENSITIVE_FIELDS: &[&str] = &["apikey", "api_key", "password", "passkey", "secret", "token"];

/// Read the server and build the equivalent instance configuration.
pub fn import_instance(
    client: &ArrClient,
    instance_name: &str,
    api_key: &str,
    include_secrets: bool,
) -> Result<InstanceConfig> {
    let env_name = env_var_name(instance_name);

    log::info!("Importing tags...");
    let tags = client.get_list("tag")?;
    let tag_names = id_name_map(&tags, "label");

    log::info!("Importing custom formats...");
    let custom_formats = client.get_list("customformat")?;
    let format_names = id_name_map(&custom_formats, "name");

    log::info!("Importing quality definitions...");
    let quality_definitions = client.get_list("qualitydefinition")?;

    log::info!("Importing quality profiles...");
    let quality_profiles = client.get_list("qualityprofile")?;

    log::info!("Importing delay profiles...");
    let delay_profiles = client.get_list("delayprofile")?;

    log::info!("Importing indexers...");
    let indexers = client.get_list("indexer")?;

    log::info!("Importing download clients...");
    let download_clients = client.get_list("downloadclient")?;

    log::info!("Importing naming configuration...");
    let naming = client.get_one("config/naming")?;

    log::info!("Importing media management configuration...");
    let media_management = client.get_one("config/mediamanagement")?;

    Ok(InstanceConfig {
        name: instance_name.to_string(),
        base_url: Some(if include_secrets {
            client.base_url().to_string()
        } else {
            format!("${{SONARR_{env_name}_URL}}")
        }),
        api_key: Some(if include_secrets {
            api_key.to_string()
        } else {
            format!("${{SONARR_{env_name}_API_KEY}}")
        }),
        tags: tags_section(&tags),
        custom_formats: custom_formats_section(&custom_formats),
        quality_definitions: quality_definitions_section(&quality_definitions),
        quality_profiles: quality_profiles_section(&quality_profiles, &format_names),
        delay_profiles: delay_profiles_section(&delay_profiles, &tag_names),
        indexers: indexers_section(&indexers, &tag_names, include_secrets),
        download_clients: download_clients_section(&download_clients, &tag_names, include_secrets),
        naming: Some(naming_settings(&naming)),
        media_management: Some(media_management_settings(&media_management)),
    })
}

/// Instance name as it appears in credential env vars.
pub fn env_var_name(instance_name: &str) -> String {
    instance_name.to_uppercase().replace('-', "_")
}

fn id_name_map(records: &[Value], name_key: &str) -> HashMap<i64, String> {
    records
        .iter()
        .filter_map(|record| {
            Some((
                record.get("id")?.as_i64()?,
                record.get(name_key)?.as_str()?.to_string(),
            ))
        })
        .collect()
}

fn names_for(ids: Option<&Value>, known: &HashMap<i64, String>) -> Vec<String> {
    ids.and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_i64)
                .filter_map(|id| known.get(&id).cloned())
                .collect()
        })
        .unwrap_or_default()
}

fn str_of(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn bool_of(record: &Value, key: &str, default: bool) -> bool {
    record.get(key).and_then(Value::as_bool).unwrap_or(default)
}

fn i64_of(record: &Value, key: &str, default: i64) -> i64 {
    record.get(key).and_then(Value::as_i64).unwrap_or(default)
}

fn f64_of(record: &Value, key: &str) -> f64 {
    record.get(key).and_then(Value::as_f64).unwrap_or_default()
}

pub(crate) fn import_fields(fields: Option<&Value>, include_secrets: bool) -> Vec<FieldDef> {
    let Some(Value::Array(fields)) = fields else {
        return Vec::new();
    };
    fields
        .iter()
        .filter_map(|field| {
            let name = field.get("name")?.as_str()?.to_string();
            let mut value = field.get("value").cloned().unwrap_or(Value::Null);
            if !include_secrets && SENSITIVE_FIELDS.contains(&name.to_lowercase().as_str()) {
                value = Value::String(format!("${{YOUR_{}}}", name.to_uppercase()));
            }
            Some(FieldDef { name, value })
        })
        .collect()
}

fn tags_section(tags: &[Value]) -> Option<TagsSection> {
    if tags.is_empty() {
        return None;
    }
    Some(TagsSection {
        delete_unmanaged: false,
        definitions: tags.iter().map(|tag| str_of(tag, "label")).collect(),
    })
}

fn custom_formats_section(formats: &[Value]) -> Option<CustomFormatsSection> {
    if formats.is_empty() {
        return None;
    }
    let definitions = formats
        .iter()
        .map(|format| CustomFormatDef {
            name: str_of(format, "name"),
            include_when_renaming: bool_of(format, "includeCustomFormatWhenRenaming", false),
            specifications: format
                .get("specifications")
                .and_then(Value::as_array)
                .map(|specs| {
                    specs
                        .iter()
                        .map(|spec| SpecificationDef {
                            name: str_of(spec, "name"),
                            implementation: str_of(spec, "implementation"),
                            negate: bool_of(spec, "negate", false),
                            required: bool_of(spec, "required", false),
                            fields: import_fields(spec.get("fields"), true),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect();
    Some(CustomFormatsSection {
        delete_unmanaged: false,
        definitions,
    })
}

fn quality_definitions_section(definitions: &[Value]) -> Option<QualityDefinitionsSection> {
    if definitions.is_empty() {
        return None;
    }
    Some(QualityDefinitionsSection {
        definitions: definitions
            .iter()
            .map(|def| QualityDefinitionDef {
                title: str_of(def, "title"),
                min_size: f64_of(def, "minSize"),
                max_size: f64_of(def, "maxSize"),
                preferred_size: f64_of(def, "preferredSize"),
            })
            .collect(),
    })
}

fn quality_profiles_section(
    profiles: &[Value],
    format_names: &HashMap<i64, String>,
) -> Option<QualityProfilesSection> {
    if profiles.is_empty() {
        return None;
    }
    let definitions = profiles
        .iter()
        .map(|profile| {
            let format_scores: BTreeMap<String, i64> = profile
                .get("formatItems")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| {
                            let id = item.get("format")?.as_i64()?;
                            let score = item.get("score")?.as_i64()?;
                            // Zero scores are the server's padding, not config.
                            if score == 0 {
                                return None;
                            }
                            Some((format_names.get(&id)?.clone(), score))
                        })
                        .collect()
                })
                .unwrap_or_default();

            QualityProfileDef {
                name: str_of(profile, "name"),
                upgrade_allowed: bool_of(profile, "upgradeAllowed", true),
                cutoff: i64_of(profile, "cutoff", 0),
                items: profile
                    .get("items")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
                min_format_score: i64_of(profile, "minFormatScore", 0),
                cutoff_format_score: i64_of(profile, "cutoffFormatScore", 0),
                min_upgrade_format_score: i64_of(profile, "minUpgradeFormatScore", 1),
                format_scores,
            }
        })
        .collect();
    Some(QualityProfilesSection {
        delete_unmanaged: false,
        definitions,
    })
}

fn delay_profiles_section(
    profiles: &[Value],
    tag_names: &HashMap<i64, String>,
) -> Option<DelayProfilesSection> {
    if profiles.is_empty() {
        return None;
    }
    let definitions = profiles
        .iter()
        .map(|profile| DelayProfileDef {
            preferred_protocol: match str_of(profile, "preferredProtocol").as_str() {
                "usenet" => "usenet".to_string(),
                "torrent" => "torrent".to_string(),
                _ => "both".to_string(),
            },
            usenet_delay: i64_of(profile, "usenetDelay", 0),
            torrent_delay: i64_of(profile, "torrentDelay", 0),
            bypass_if_highest_quality: bool_of(profile, "bypassIfHighestQuality", false),
            tags: names_for(profile.get("tags"), tag_names),
            order: i64_of(profile, "order", i64::from(i32::MAX)),
        })
        .collect();
    Some(DelayProfilesSection {
        delete_unmanaged: false,
        definitions,
    })
}

fn indexers_section(
    indexers: &[Value],
    tag_names: &HashMap<i64, String>,
    include_secrets: bool,
) -> Option<IndexersSection> {
    if indexers.is_empty() {
        return None;
    }
    let definitions = indexers
        .iter()
        .map(|indexer| IndexerDef {
            name: str_of(indexer, "name"),
            implementation: str_of(indexer, "implementation"),
            enable_rss: bool_of(indexer, "enableRss", true),
            enable_automatic_search: bool_of(indexer, "enableAutomaticSearch", true),
            enable_interactive_search: bool_of(indexer, "enableInteractiveSearch", true),
            priority: i64_of(indexer, "priority", 25),
            download_client_id: indexer
                .get("downloadClientId")
                .and_then(Value::as_i64)
                .filter(|id| *id != 0),
            tags: names_for(indexer.get("tags"), tag_names),
            fields: import_fields(indexer.get("fields"), include_secrets),
        })
        .collect();
    Some(IndexersSection {
        delete_unmanaged: false,
        definitions,
    })
}

fn download_clients_section(
    clients: &[Value],
    tag_names: &HashMap<i64, String>,
    include_secrets: bool,
) -> Option<DownloadClientsSection> {
    if clients.is_empty() {
        return None;
    }
    let definitions = clients
        .iter()
        .map(|client| DownloadClientDef {
            name: str_of(client, "name"),
            implementation: str_of(client, "implementation"),
            enable: bool_of(client, "enable", true),
            priority: i64_of(client, "priority", 1),
            remove_completed_downloads: bool_of(client, "removeCompletedDownloads", true),
            remove_failed_downloads: bool_of(client, "removeFailedDownloads", false),
            tags: names_for(client.get("tags"), tag_names),
            fields: import_fields(client.get("fields"), include_secrets),
        })
        .collect();
    Some(DownloadClientsSection {
        delete_unmanaged: false,
        definitions,
    })
}

fn naming_settings(record: &Value) -> NamingSettings {
    NamingSettings {
        rename_episodes: bool_of(record, "renameEpisodes", true),
        replace_illegal_characters: bool_of(record, "replaceIllegalCharacters", true),
        standard_episode_format: str_of(record, "standardEpisodeFormat"),
        daily_episode_format: str_of(record, "dailyEpisodeFormat"),
        anime_episode_format: str_of(record, "animeEpisodeFormat"),
        series_folder_format: str_of(record, "seriesFolderFormat"),
        season_folder_format: str_of(record, "seasonFolderFormat"),
        specials_folder_format: str_of(record, "specialsFolderFormat"),
        multi_episode_style: i64_of(record, "multiEpisodeStyle", 0),
    }
}

fn media_management_settings(record: &Value) -> MediaManagementSettings {
    MediaManagementSettings {
        auto_unmonitor_previously_downloaded_episodes: bool_of(
            record,
            "autoUnmonitorPreviouslyDownloadedEpisodes",
            false,
        ),
        recycle_bin: str_of(record, "recycleBin"),
        recycle_bin_cleanup_days: i64_of(record, "recycleBinCleanupDays", 7),
        download_propers_and_repacks: bool_of(record, "downloadPropersAndRepacks", true),
        create_empty_series_folders: bool_of(record, "createEmptySeriesFolders", false),
        delete_empty_folders: bool_of(record, "deleteEmptyFolders", false),
        file_date: str_of(record, "fileDate"),
        rescan_after_refresh: bool_of(record, "rescanAfterRefresh", true),
        set_permissions_linux: bool_of(record, "setPermissionsLinux", false),
        chmod_folder: str_of(record, "chmodFolder"),
        chown_group: str_of(record, "chownGroup"),
        skip_free_space_check_when_importing: bool_of(
            record,
            "skipFreeSpaceCheckWhenImporting",
            false,
        ),
        minimum_free_space_when_importing: i64_of(record, "minimumFreeSpaceWhenImporting", 100),
        copy_using_hardlinks: bool_of(record, "copyUsingHardlinks", true),
        import_extra_files: bool_of(record, "importExtraFiles", false),
        extra_file_extensions: str_of(record, "extraFileExtensions"),
    }
}
