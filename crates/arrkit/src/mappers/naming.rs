//! Naming settings mapper - a singleton resource.
//!
//! The server holds exactly one naming configuration. The identity key is
//! a constant, so the record always matches the existing one and the diff
//! can only ever produce an update.

use super::project;
use crate::schema::NamingSettings;
use reconcile::{Context, OpError, Record, ResourceMapper};
use serde_json::{Value, json};

/// Constant identity for the single naming record.
pub(crate) const NAMING_KEY: &str = "naming";

pub struct NamingMapper;

impl ResourceMapper for NamingMapper {
    type Definition = NamingSettings;

    fn to_native(
        &self,
        definition: &NamingSettings,
        _context: &Context,
    ) -> Result<Value, OpError> {
        Ok(json!({
            "renameEpisodes": definition.rename_episodes,
            "replaceIllegalCharacters": definition.replace_illegal_characters,
            "standardEpisodeFormat": definition.standard_episode_format,
            "dailyEpisodeFormat": definition.daily_episode_format,
            "animeEpisodeFormat": definition.anime_episode_format,
            "seriesFolderFormat": definition.series_folder_format,
            "seasonFolderFormat": definition.season_folder_format,
            "specialsFolderFormat": definition.specials_folder_format,
            "multiEpisodeStyle": definition.multi_episode_style,
        }))
    }

    fn from_native(&self, native: &Value) -> Record {
        project(
            native,
            &[
                "id",
                "renameEpisodes",
                "replaceIllegalCharacters",
                "standardEpisodeFormat",
                "dailyEpisodeFormat",
                "animeEpisodeFormat",
                "seriesFolderFormat",
                "seasonFolderFormat",
                "specialsFolderFormat",
                "multiEpisodeStyle",
            ],
        )
    }

    fn identity_key(&self, _record: &Record) -> String {
        NAMING_KEY.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_identity_key() {
        let mapper = NamingMapper;
        let empty = Record::new();
        let populated = mapper.from_native(&json!({"id": 1, "renameEpisodes": true}));
        assert_eq!(mapper.identity_key(&empty), mapper.identity_key(&populated));
    }

    #[test]
    fn test_format_change_is_drift() {
        let mapper = NamingMapper;
        let current = mapper.from_native(&json!({
            "id": 1,
            "renameEpisodes": true,
            "replaceIllegalCharacters": true,
            "standardEpisodeFormat": "{Series Title} - S{season:00}E{episode:00}",
            "dailyEpisodeFormat": "{Series Title} - {Air-Date}",
            "animeEpisodeFormat": "{Series Title} - S{season:00}E{episode:00}",
            "seriesFolderFormat": "{Series Title}",
            "seasonFolderFormat": "Season {season}",
            "specialsFolderFormat": "Specials",
            "multiEpisodeStyle": 0
        }));
        let settings = NamingSettings {
            rename_episodes: true,
            replace_illegal_characters: true,
            standard_episode_format: "{Series Title} - S{season:00}E{episode:00} - {Episode Title}"
                .to_string(),
            daily_episode_format: "{Series Title} - {Air-Date}".to_string(),
            anime_episode_format: "{Series Title} - S{season:00}E{episode:00}".to_string(),
            series_folder_format: "{Series Title}".to_string(),
            season_folder_format: "Season {season}".to_string(),
            specials_folder_format: "Specials".to_string(),
            multi_episode_style: 0,
        };
        let desired = mapper.from_native(&mapper.to_native(&settings, &Context::new()).unwrap());
        assert!(reconcile::needs_update(
            &current,
            &desired,
            reconcile::DEFAULT_IGNORE_FIELDS
        ));
    }
}
