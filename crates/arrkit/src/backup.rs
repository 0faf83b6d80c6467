//! Pre-sync backups of the server's configuration.
//!
//! One timestamped JSON file per sync run, holding every resource list and
//! singleton settings record. Enough to put things back by hand if a sync
//! goes somewhere unexpected.

use crate::client::ArrClient;
use crate::error::Result;
use chrono::Local;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

const COLLECTIONS: &[(&str, &str)] = &[
    ("tags", "tag"),
    ("custom_formats", "customformat"),
    ("quality_definitions", "qualitydefinition"),
    ("quality_profiles", "qualityprofile"),
    ("delay_profiles", "delayprofile"),
    ("indexers", "indexer"),
    ("download_clients", "downloadclient"),
];

const SETTINGS: &[(&str, &str)] = &[
    ("naming_config", "config/naming"),
    ("media_management_config", "config/mediamanagement"),
];

/// Snapshot the server's current configuration to
/// `<backup_dir>/<instance>_<timestamp>.json`.
pub fn create_backup(
    client: &ArrClient,
    backup_dir: &Path,
    instance_name: &str,
) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_file = backup_dir.join(format!("{instance_name}_{timestamp}.json"));

    log::info!("Creating backup: {}", backup_file.display());

    let mut data = serde_json::Map::new();
    for (key, path) in COLLECTIONS {
        log::debug!("Backing up {key}...");
        data.insert((*key).to_string(), Value::Array(client.get_list(path)?));
    }
    for (key, path) in SETTINGS {
        log::debug!("Backing up {key}...");
        data.insert((*key).to_string(), client.get_one(path)?);
    }
    data.insert(
        "_metadata".to_string(),
        json!({
            "instance_name": instance_name,
            "timestamp": timestamp,
            "backup_version": "1.0",
        }),
    );

    fs::create_dir_all(backup_dir)?;
    fs::write(
        &backup_file,
        serde_json::to_string_pretty(&Value::Object(data))?,
    )?;

    log::info!("✓ Backup created: {}", backup_file.display());
    Ok(backup_file)
}

/// Backups on disk, newest first. Filters to one instance when given.
pub fn list_backups(backup_dir: &Path, instance_name: Option<&str>) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(backup_dir) else {
        return Vec::new();
    };

    let mut backups: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "json")
                && instance_name.is_none_or(|name| {
                    path.file_name()
                        .and_then(|file| file.to_str())
                        .is_some_and(|file| file.starts_with(&format!("{name}_")))
                })
        })
        .collect();

    // Timestamped file names sort chronologically.
    backups.sort();
    backups.reverse();
    backups
}

/// Delete all but the newest `keep_count` backups. Returns how many were
/// removed.
pub fn cleanup_old_backups(backup_dir: &Path, keep_count: usize) -> Result<usize> {
    let backups = list_backups(backup_dir, None);
    let mut removed = 0;
    for path in backups.iter().skip(keep_count) {
        fs::remove_file(path)?;
        removed += 1;
    }
    if removed > 0 {
        log::debug!("Removed {removed} old backup(s)");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "{}").unwrap();
    }

    #[test]
    fn test_list_backups_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "main_20250101_120000.json");
        touch(dir.path(), "main_20250301_120000.json");
        touch(dir.path(), "main_20250201_120000.json");
        touch(dir.path(), "notes.txt");

        let backups = list_backups(dir.path(), Some("main"));
        let names: Vec<String> = backups
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "main_20250301_120000.json",
                "main_20250201_120000.json",
                "main_20250101_120000.json",
            ]
        );
    }

    #[test]
    fn test_list_backups_filters_by_instance() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "main_20250101_120000.json");
        touch(dir.path(), "anime_20250101_120000.json");

        assert_eq!(list_backups(dir.path(), Some("anime")).len(), 1);
        assert_eq!(list_backups(dir.path(), None).len(), 2);
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=7 {
            touch(dir.path(), &format!("main_2025010{day}_120000.json"));
        }

        let removed = cleanup_old_backups(dir.path(), 5).unwrap();
        assert_eq!(removed, 2);

        let remaining = list_backups(dir.path(), Some("main"));
        assert_eq!(remaining.len(), 5);
        // The two oldest are gone.
        assert!(
            remaining
                .iter()
                .all(|p| !p.to_string_lossy().contains("20250101")
                    && !p.to_string_lossy().contains("20250102"))
        );
    }

    #[test]
    fn test_list_backups_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(list_backups(&missing, None).is_empty());
    }
}
