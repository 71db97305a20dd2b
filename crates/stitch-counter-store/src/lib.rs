//! File-backed project library for stitch-counter.

pub mod backup;
mod error;
mod lock;

pub use backup::{BACKUP_VERSION, BackupData, BackupMetadata, BackupProject, ImportSummary};
pub use error::{Result, StoreError};

use serde::{Deserialize, Serialize};
use stitch_counter_core::{ProjectId, ProjectRecord};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use tracing::{debug, info};

use lock::LibraryLock;

/// File name of the library inside the data directory.
pub const LIBRARY_FILE: &str = "projects.json";

/// Project library stored as a single JSON document.
///
/// Clones share the same write lock, so a store can be handed to a
/// background writer while the foreground keeps reading. Writers in other
/// processes are serialized through an exclusive lock on
/// `projects.json.lock`.
#[derive(Clone, Debug)]
pub struct JsonStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LibraryFile {
    #[serde(default)]
    projects: Vec<ProjectRecord>,
}

impl LibraryFile {
    fn next_id(&self) -> Result<ProjectId> {
        self.projects
            .iter()
            .map(|project| project.id)
            .max()
            .unwrap_or(ProjectId::UNSET)
            .next()
            .ok_or(StoreError::IdsExhausted)
    }

    fn position(&self, id: ProjectId) -> Option<usize> {
        self.projects.iter().position(|project| project.id == id)
    }

    /// Insert or replace `record`, returning the id it was stored under.
    fn upsert(&mut self, mut record: ProjectRecord, now: OffsetDateTime) -> Result<ProjectId> {
        record.updated_at = now;
        if let Some(index) = self.position(record.id) {
            record.created_at = self.projects[index].created_at;
        }
        self.put(record)
    }

    /// Store `record` as given, assigning an id to unsaved projects.
    fn put(&mut self, mut record: ProjectRecord) -> Result<ProjectId> {
        if !record.id.is_persisted() {
            record.id = self.next_id()?;
        }
        let id = record.id;
        match self.position(id) {
            Some(index) => self.projects[index] = record,
            None => self.projects.push(record),
        }
        Ok(id)
    }
}

impl JsonStore {
    /// Open (and create if needed) the library in `data_dir`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(LIBRARY_FILE);
        debug!(path = %path.display(), "Opened project library");
        Ok(Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Location of the library file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_library(&self) -> Result<LibraryFile> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(LibraryFile::default()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(LibraryFile::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_library(&self, library: &LibraryFile) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| StoreError::Other(format!("{} has no parent", self.path.display())))?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, library)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        Ok(())
    }

    /// Apply `change` to the library under the write locks and save it.
    ///
    /// Nothing is written when `change` fails.
    fn modify<T>(&self, change: impl FnOnce(&mut LibraryFile) -> Result<T>) -> Result<T> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockError)?;
        let _file_lock = LibraryLock::acquire(&self.path)?;
        let mut library = self.read_library()?;
        let out = change(&mut library)?;
        self.write_library(&library)?;
        Ok(out)
    }

    /// Insert a new project (id `0`) or replace an existing one.
    ///
    /// New projects receive the id after the largest one in use. Replacing
    /// keeps the stored creation time.
    ///
    /// # Errors
    /// Returns [`StoreError::IdsExhausted`] when a new project would need an
    /// id past `u32::MAX`, or an error if the library cannot be read or written.
    pub fn upsert(&self, record: ProjectRecord) -> Result<ProjectId> {
        let inserted = !record.id.is_persisted();
        let id = self.modify(|library| library.upsert(record, OffsetDateTime::now_utc()))?;
        info!(%id, inserted, "Saved project");
        Ok(id)
    }

    /// Load a single project.
    ///
    /// # Errors
    /// Returns [`StoreError::ProjectNotFound`] when the id is unknown.
    pub fn load(&self, id: ProjectId) -> Result<ProjectRecord> {
        let library = self.read_library()?;
        let record = library
            .projects
            .into_iter()
            .find(|project| project.id == id)
            .ok_or(StoreError::ProjectNotFound(id))?;
        debug!(%id, "Loaded project");
        Ok(record)
    }

    /// Whether a project with `id` exists.
    ///
    /// # Errors
    /// Returns an error if the library cannot be read.
    pub fn project_exists(&self, id: ProjectId) -> Result<bool> {
        Ok(self.read_library()?.position(id).is_some())
    }

    /// All projects ordered by id.
    ///
    /// # Errors
    /// Returns an error if the library cannot be read.
    pub fn list(&self) -> Result<Vec<ProjectRecord>> {
        let mut projects = self.read_library()?.projects;
        projects.sort_by_key(|project| project.id);
        Ok(projects)
    }

    /// Delete the given projects, returning how many were removed.
    ///
    /// Unknown ids are ignored.
    ///
    /// # Errors
    /// Returns an error if the library cannot be read or written.
    pub fn delete(&self, ids: &[ProjectId]) -> Result<usize> {
        let removed = self.modify(|library| {
            let before = library.projects.len();
            library.projects.retain(|project| !ids.contains(&project.id));
            Ok(before - library.projects.len())
        })?;
        info!(removed, requested = ids.len(), "Deleted projects");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_counter_core::{Counter, ProjectKind};
    use tempfile::TempDir;

    fn record(name: &str) -> ProjectRecord {
        ProjectRecord::from_counters(&Counter::named(name), None)
    }

    #[test]
    fn empty_library_lists_nothing() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = JsonStore::open(dir.path())?;
        assert!(store.list()?.is_empty());
        assert!(!store.project_exists(ProjectId(1))?);
        Ok(())
    }

    #[test]
    fn insert_assigns_increasing_ids() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = JsonStore::open(dir.path())?;
        let first = store.upsert(record("Hat"))?;
        let second = store.upsert(record("Scarf"))?;
        assert_eq!(first, ProjectId(1));
        assert_eq!(second, ProjectId(2));

        let titles: Vec<_> = store.list()?.into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["Hat", "Scarf"]);
        Ok(())
    }

    #[test]
    fn update_keeps_id_and_creation_time() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = JsonStore::open(dir.path())?;
        let id = store.upsert(record("Socks"))?;
        let stored = store.load(id)?;

        let mut counter = Counter::named("Socks");
        counter.assign_id(id);
        counter.increment();
        let mut updated = ProjectRecord::from_counters(&counter, None);
        updated.created_at = OffsetDateTime::UNIX_EPOCH;
        assert_eq!(store.upsert(updated)?, id);

        let reloaded = store.load(id)?;
        assert_eq!(reloaded.stitch_counter_number, 1);
        assert_eq!(reloaded.created_at, stored.created_at);
        assert_eq!(store.list()?.len(), 1);
        Ok(())
    }

    #[test]
    fn upsert_with_unknown_id_inserts_under_that_id() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = JsonStore::open(dir.path())?;
        let mut counter = Counter::named("Imported");
        counter.assign_id(ProjectId(40));
        assert_eq!(
            store.upsert(ProjectRecord::from_counters(&counter, None))?,
            ProjectId(40)
        );
        assert_eq!(store.upsert(record("Next"))?, ProjectId(41));
        Ok(())
    }

    #[test]
    fn insert_fails_once_the_largest_id_is_taken() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = JsonStore::open(dir.path())?;
        let mut counter = Counter::named("Last");
        counter.assign_id(ProjectId(u32::MAX));
        store.upsert(ProjectRecord::from_counters(&counter, None))?;

        assert!(matches!(
            store.upsert(record("Overflow")),
            Err(StoreError::IdsExhausted)
        ));
        let ids: Vec<_> = store.list()?.into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![ProjectId(u32::MAX)]);

        counter.increment();
        assert_eq!(
            store.upsert(ProjectRecord::from_counters(&counter, None))?,
            ProjectId(u32::MAX)
        );
        Ok(())
    }

    #[test]
    fn delete_removes_only_requested_projects() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = JsonStore::open(dir.path())?;
        let a = store.upsert(record("A"))?;
        let b = store.upsert(record("B"))?;
        let c = store.upsert(record("C"))?;

        assert_eq!(store.delete(&[a, c, ProjectId(99)])?, 2);
        let remaining: Vec<_> = store.list()?.into_iter().map(|p| p.id).collect();
        assert_eq!(remaining, vec![b]);
        assert!(matches!(
            store.load(a),
            Err(StoreError::ProjectNotFound(id)) if id == a
        ));
        Ok(())
    }

    #[test]
    fn double_projects_survive_reopen() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let stitch = Counter::named("Blanket");
        let mut row = Counter::named("Blanket");
        row.set_total_target(200);
        row.increment();
        let id = JsonStore::open(dir.path())?
            .upsert(ProjectRecord::from_counters(&stitch, Some(&row)))?;

        let reopened = JsonStore::open(dir.path())?;
        let stored = reopened.load(id)?;
        assert_eq!(stored.kind, ProjectKind::Double);
        assert_eq!(stored.total_rows, 200);
        assert_eq!(stored.row_counter_number, 1);
        Ok(())
    }

    #[test]
    fn corrupt_library_is_reported() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = JsonStore::open(dir.path())?;
        fs::write(store.path(), "{ not json")?;
        assert!(matches!(store.list(), Err(StoreError::Json(_))));
        Ok(())
    }
}
