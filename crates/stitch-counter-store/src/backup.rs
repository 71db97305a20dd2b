//! Library export and import.
//!
//! Backups use the version 1 layout: timestamps are Unix epoch milliseconds
//! and every project lists its `image_paths`. Files written by older builds
//! that omit the lifetime fields still import.

use serde::{Deserialize, Serialize};
use stitch_counter_core::{Adjustment, ProjectId, ProjectKind, ProjectRecord};
use std::fs;
use std::path::Path;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::{JsonStore, Result, StoreError};

/// Backup format version written by this build.
pub const BACKUP_VERSION: u32 = 1;

/// Header of a backup file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupMetadata {
    /// Format version.
    pub version: u32,
    /// When the backup was taken.
    #[serde(with = "time::serde::timestamp::milliseconds_i64")]
    pub export_date: OffsetDateTime,
    /// Version of the application that wrote the backup.
    pub app_version: String,
    /// Number of projects in the backup.
    pub project_count: usize,
}

/// One project as stored in a backup file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupProject {
    /// Identifier in the exporting library.
    pub id: ProjectId,
    /// Single or double counter project.
    #[serde(rename = "type")]
    pub kind: ProjectKind,
    /// Project title.
    pub title: String,
    /// Stitch counter value.
    pub stitch_counter_number: u32,
    /// Stitch counter step.
    pub stitch_adjustment: Adjustment,
    /// Row counter value.
    #[serde(default)]
    pub row_counter_number: u32,
    /// Row counter step.
    #[serde(default)]
    pub row_adjustment: Adjustment,
    /// Total rows.
    #[serde(default)]
    pub total_rows: u32,
    /// Photos attached to the project, relative to the backup archive.
    /// The library keeps no photos, so these are written empty and ignored
    /// on import.
    #[serde(default)]
    pub image_paths: Vec<String>,
    /// Creation time; missing or non-positive means unknown.
    #[serde(
        default,
        with = "time::serde::timestamp::milliseconds_i64::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
    /// Last update time; missing or non-positive means unknown.
    #[serde(
        default,
        with = "time::serde::timestamp::milliseconds_i64::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
    /// When the project was marked finished.
    #[serde(default, with = "time::serde::timestamp::milliseconds_i64::option")]
    pub completed_at: Option<OffsetDateTime>,
    /// Stitches worked over the project's lifetime.
    #[serde(default)]
    pub total_stitches_ever: u32,
}

impl From<ProjectRecord> for BackupProject {
    fn from(record: ProjectRecord) -> Self {
        Self {
            id: record.id,
            kind: record.kind,
            title: record.title,
            stitch_counter_number: record.stitch_counter_number,
            stitch_adjustment: record.stitch_adjustment,
            row_counter_number: record.row_counter_number,
            row_adjustment: record.row_adjustment,
            total_rows: record.total_rows,
            image_paths: Vec::new(),
            created_at: Some(record.created_at),
            updated_at: Some(record.updated_at),
            completed_at: record.completed_at,
            total_stitches_ever: record.total_stitches_ever,
        }
    }
}

impl BackupProject {
    /// Library record for this project; unknown timestamps become `now`.
    #[must_use]
    pub fn into_record(self, now: OffsetDateTime) -> ProjectRecord {
        let known = |at: Option<OffsetDateTime>| {
            at.filter(|at| *at > OffsetDateTime::UNIX_EPOCH)
                .unwrap_or(now)
        };
        ProjectRecord {
            id: self.id,
            kind: self.kind,
            title: self.title,
            stitch_counter_number: self.stitch_counter_number,
            stitch_adjustment: self.stitch_adjustment,
            row_counter_number: self.row_counter_number,
            row_adjustment: self.row_adjustment,
            total_rows: self.total_rows,
            created_at: known(self.created_at),
            updated_at: known(self.updated_at),
            total_stitches_ever: self.total_stitches_ever,
            completed_at: self.completed_at,
        }
    }
}

/// Complete backup document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupData {
    /// Header.
    pub metadata: BackupMetadata,
    /// Every exported project.
    pub projects: Vec<BackupProject>,
}

/// Outcome of [`JsonStore::import_library`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Ids the imported projects were stored under, in backup order.
    pub imported: Vec<ProjectId>,
}

impl BackupData {
    /// Read and version-check a backup file.
    ///
    /// # Errors
    /// Returns [`StoreError::UnsupportedBackupVersion`] for foreign versions and
    /// I/O or JSON errors otherwise.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let data: Self = serde_json::from_str(&contents)?;
        if data.metadata.version != BACKUP_VERSION {
            return Err(StoreError::UnsupportedBackupVersion(data.metadata.version));
        }
        if data.metadata.project_count != data.projects.len() {
            warn!(
                declared = data.metadata.project_count,
                actual = data.projects.len(),
                "Backup project count does not match its header"
            );
        }
        Ok(data)
    }
}

impl JsonStore {
    /// Write every project to a backup file at `path`.
    ///
    /// # Errors
    /// Returns an error if the library cannot be read or the file written.
    pub fn export_library(&self, path: impl AsRef<Path>) -> Result<BackupMetadata> {
        let projects: Vec<BackupProject> = self.list()?.into_iter().map(Into::into).collect();
        let metadata = BackupMetadata {
            version: BACKUP_VERSION,
            export_date: OffsetDateTime::now_utc(),
            app_version: env!("CARGO_PKG_VERSION").to_owned(),
            project_count: projects.len(),
        };
        let data = BackupData {
            metadata: metadata.clone(),
            projects,
        };
        let path = path.as_ref();
        fs::write(path, serde_json::to_string_pretty(&data)?)?;
        info!(path = %path.display(), projects = metadata.project_count, "Exported library");
        Ok(metadata)
    }

    /// Load projects from a backup file.
    ///
    /// With `replace_existing` the backup ids are kept and matching projects
    /// are overwritten; otherwise every project is added as a new one.
    /// Stored timestamps are kept when the backup carries them.
    ///
    /// # Errors
    /// Returns an error if the backup is unreadable, of another version, or the
    /// library cannot be written.
    pub fn import_library(
        &self,
        path: impl AsRef<Path>,
        replace_existing: bool,
    ) -> Result<ImportSummary> {
        let data = BackupData::read(path)?;
        let now = OffsetDateTime::now_utc();
        let summary = self.modify(|library| {
            let imported = data
                .projects
                .into_iter()
                .map(|project| {
                    if !project.image_paths.is_empty() {
                        debug!(
                            id = %project.id,
                            images = project.image_paths.len(),
                            "Skipping project images"
                        );
                    }
                    let mut record = project.into_record(now);
                    if !replace_existing {
                        record.id = ProjectId::UNSET;
                    }
                    library.put(record)
                })
                .collect::<Result<_>>()?;
            Ok(ImportSummary { imported })
        })?;
        info!(
            imported = summary.imported.len(),
            replace_existing, "Imported library"
        );
        Ok(summary)
    }
}
