//! Media management settings mapper - singleton, update-only.

use super::project;
use crate::schema::MediaManagementSettings;
use reconcile::{Context, OpError, Record, ResourceMapper};
use serde_json::{Value, json};

pub(crate) const MEDIA_MANAGEMENT_KEY: &str = "media_management";

pub struct MediaManagementMapper;

impl ResourceMapper for MediaManagementMapper {
    type Definition = MediaManagementSettings;

    fn to_native(
        &self,
        definition: &MediaManagementSettings,
        _context: &Context,
    ) -> Result<Value, OpError> {
        Ok(json!({
            "autoUnmonitorPreviouslyDownloadedEpisodes":
                definition.auto_unmonitor_previously_downloaded_episodes,
            "recycleBin": definition.recycle_bin,
            "recycleBinCleanupDays": definition.recycle_bin_cleanup_days,
            "downloadPropersAndRepacks": definition.download_propers_and_repacks,
            "createEmptySeriesFolders": definition.create_empty_series_folders,
            "deleteEmptyFolders": definition.delete_empty_folders,
            "fileDate": definition.file_date,
            "rescanAfterRefresh": definition.rescan_after_refresh,
            "setPermissionsLinux": definition.set_permissions_linux,
            "chmodFolder": definition.chmod_folder,
            "chownGroup": definition.chown_group,
            "skipFreeSpaceCheckWhenImporting": definition.skip_free_space_check_when_importing,
            "minimumFreeSpaceWhenImporting": definition.minimum_free_space_when_importing,
            "copyUsingHardlinks": definition.copy_using_hardlinks,
            "importExtraFiles": definition.import_extra_files,
            "extraFileExtensions": definition.extra_file_extensions,
        }))
    }

    fn from_native(&self, native: &Value) -> Record {
        project(
            native,
            &[
                "id",
                "autoUnmonitorPreviouslyDownloadedEpisodes",
                "recycleBin",
                "recycleBinCleanupDays",
                "downloadPropersAndRepacks",
                "createEmptySeriesFolders",
                "deleteEmptyFolders",
                "fileDate",
                "rescanAfterRefresh",
                "setPermissionsLinux",
                "chmodFolder",
                "chownGroup",
                "skipFreeSpaceCheckWhenImporting",
                "minimumFreeSpaceWhenImporting",
                "copyUsingHardlinks",
                "importExtraFiles",
                "extraFileExtensions",
            ],
        )
    }

    fn identity_key(&self, _record: &Record) -> String {
        MEDIA_MANAGEMENT_KEY.to_string()
    }
}
