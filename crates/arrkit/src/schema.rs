//! Declarative configuration schema for one Sonarr instance.
//!
//! These are the types the YAML config deserializes into. Field names are
//! snake_case in YAML; mappers translate to the server's camelCase wire
//! form, so nothing here leaks transport details into user configs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_true() -> bool {
    true
}

fn default_priority() -> i64 {
    25
}

/// One declared server instance and the resources managed on it.
///
/// Sections left out of the YAML are not touched on the server at all.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceConfig {
    pub name: String,
    /// Server URL; falls back to `SONARR_<NAME>_URL` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// API key; falls back to `SONARR_<NAME>_API_KEY` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagsSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_formats: Option<CustomFormatsSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_definitions: Option<QualityDefinitionsSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_profiles: Option<QualityProfilesSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_profiles: Option<DelayProfilesSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexers: Option<IndexersSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_clients: Option<DownloadClientsSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naming: Option<NamingSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_management: Option<MediaManagementSettings>,
}

// ============================================================================
// Tags
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TagsSection {
    #[serde(default)]
    pub delete_unmanaged: bool,
    #[serde(default)]
    pub definitions: Vec<String>,
}

// ============================================================================
// Custom formats
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CustomFormatsSection {
    #[serde(default)]
    pub delete_unmanaged: bool,
    #[serde(default)]
    pub definitions: Vec<CustomFormatDef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomFormatDef {
    pub name: String,
    #[serde(default)]
    pub include_when_renaming: bool,
    #[serde(default)]
    pub specifications: Vec<SpecificationDef>,
}

/// One condition inside a custom format.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpecificationDef {
    pub name: String,
    pub implementation: String,
    #[serde(default)]
    pub negate: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// A name/value settings field, as used by specifications, indexers and
/// download clients.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub value: Value,
}

// ============================================================================
// Quality definitions
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QualityDefinitionsSection {
    #[serde(default)]
    pub definitions: Vec<QualityDefinitionDef>,
}

/// Size thresholds for one quality. The set of qualities is fixed by the
/// server; these only ever update existing definitions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QualityDefinitionDef {
    pub title: String,
    pub min_size: f64,
    pub max_size: f64,
    pub preferred_size: f64,
}

// ============================================================================
// Quality profiles
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QualityProfilesSection {
    #[serde(default)]
    pub delete_unmanaged: bool,
    #[serde(default)]
    pub definitions: Vec<QualityProfileDef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QualityProfileDef {
    pub name: String,
    #[serde(default = "default_true")]
    pub upgrade_allowed: bool,
    /// Quality id the profile upgrades towards.
    pub cutoff: i64,
    /// Quality items in the server's own nested shape, passed through
    /// verbatim.
    pub items: Vec<Value>,
    #[serde(default)]
    pub min_format_score: i64,
    #[serde(default)]
    pub cutoff_format_score: i64,
    #[serde(default)]
    pub min_upgrade_format_score: i64,
    /// Custom format name → score. Names unknown to the server are
    /// dropped during mapping.
    #[serde(default)]
    pub format_scores: std::collections::BTreeMap<String, i64>,
}

// ============================================================================
// Delay profiles
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DelayProfilesSection {
    #[serde(default)]
    pub delete_unmanaged: bool,
    #[serde(default)]
    pub definitions: Vec<DelayProfileDef>,
}

/// Delay profiles carry no name; they are identified by their tag set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DelayProfileDef {
    /// `usenet`, `torrent` or `both`.
    #[serde(default = "DelayProfileDef::default_protocol")]
    pub preferred_protocol: String,
    #[serde(default)]
    pub usenet_delay: i64,
    #[serde(default)]
    pub torrent_delay: i64,
    #[serde(default)]
    pub bypass_if_highest_quality: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Evaluation order; the server's catch-all default profile sits at
    /// `i32::MAX`.
    #[serde(default = "DelayProfileDef::default_order")]
    pub order: i64,
}

impl DelayProfileDef {
    fn default_protocol() -> String {
        "both".to_string()
    }

    fn default_order() -> i64 {
        i64::from(i32::MAX)
    }
}

// ============================================================================
// Indexers
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IndexersSection {
    #[serde(default)]
    pub delete_unmanaged: bool,
    #[serde(default)]
    pub definitions: Vec<IndexerDef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexerDef {
    pub name: String,
    pub implementation: String,
    #[serde(default = "default_true")]
    pub enable_rss: bool,
    #[serde(default = "default_true")]
    pub enable_automatic_search: bool,
    #[serde(default = "default_true")]
    pub enable_interactive_search: bool,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_client_id: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

// ============================================================================
// Download clients
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DownloadClientsSection {
    #[serde(default)]
    pub delete_unmanaged: bool,
    #[serde(default)]
    pub definitions: Vec<DownloadClientDef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadClientDef {
    pub name: String,
    pub implementation: String,
    #[serde(default = "default_true")]
    pub enable: bool,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default = "default_true")]
    pub remove_completed_downloads: bool,
    #[serde(default)]
    pub remove_failed_downloads: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

// ============================================================================
// Singleton settings
// ============================================================================

/// Episode/folder naming settings. One logical record per server; only
/// ever updated, never created or deleted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NamingSettings {
    #[serde(default = "default_true")]
    pub rename_episodes: bool,
    #[serde(default = "default_true")]
    pub replace_illegal_characters: bool,
    pub standard_episode_format: String,
    pub daily_episode_format: String,
    pub anime_episode_format: String,
    pub series_folder_format: String,
    pub season_folder_format: String,
    pub specials_folder_format: String,
    #[serde(default)]
    pub multi_episode_style: i64,
}

/// File handling settings. Singleton like [`NamingSettings`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaManagementSettings {
    #[serde(default)]
    pub auto_unmonitor_previously_downloaded_episodes: bool,
    #[serde(default)]
    pub recycle_bin: String,
    #[serde(default)]
    pub recycle_bin_cleanup_days: i64,
    #[serde(default = "default_true")]
    pub download_propers_and_repacks: bool,
    #[serde(default)]
    pub create_empty_series_folders: bool,
    #[serde(default)]
    pub delete_empty_folders: bool,
    #[serde(default)]
    pub file_date: String,
    #[serde(default = "default_true")]
    pub rescan_after_refresh: bool,
    #[serde(default)]
    pub set_permissions_linux: bool,
    #[serde(default = "MediaManagementSettings::default_chmod")]
    pub chmod_folder: String,
    #[serde(default)]
    pub chown_group: String,
    #[serde(default)]
    pub skip_free_space_check_when_importing: bool,
    #[serde(default = "MediaManagementSettings::default_min_free_space")]
    pub minimum_free_space_when_importing: i64,
    #[serde(default = "default_true")]
    pub copy_using_hardlinks: bool,
    #[serde(default)]
    pub import_extra_files: bool,
    #[serde(default)]
    pub extra_file_extensions: String,
}

impl MediaManagementSettings {
    fn default_chmod() -> String {
        "755".to_string()
    }

    fn default_min_free_space() -> i64 {
        100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_instance_deserializes() {
        let cfg: InstanceConfig = serde_json::from_value(serde_json::json!({
            "name": "main"
        }))
        .unwrap();
        assert_eq!(cfg.name, "main");
        assert!(cfg.tags.is_none());
        assert!(cfg.naming.is_none());
    }

    #[test]
    fn test_section_defaults() {
        let section: IndexersSection = serde_json::from_value(serde_json::json!({
            "definitions": [{
                "name": "nzb",
                "implementation": "Newznab"
            }]
        }))
        .unwrap();
        assert!(!section.delete_unmanaged);
        let def = &section.definitions[0];
        assert!(def.enable_rss);
        assert_eq!(def.priority, 25);
        assert!(def.download_client_id.is_none());
        assert!(def.fields.is_empty());
    }

    #[test]
    fn test_unknown_instance_field_rejected() {
        let result: Result<InstanceConfig, _> = serde_json::from_value(serde_json::json!({
            "name": "main",
            "qualityprofiles": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_delay_profile_protocol_default() {
        let def: DelayProfileDef = serde_json::from_value(serde_json::json!({
            "order": 1
        }))
        .unwrap();
        assert_eq!(def.preferred_protocol, "both");
        assert_eq!(def.usenet_delay, 0);
    }
}
