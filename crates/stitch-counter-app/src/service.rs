//! Project library use cases.

use anyhow::Error;
use stitch_counter_core::{Adjustment, Counter, ProjectId, ProjectRecord};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

use crate::project_store::ProjectStore;

/// Errors raised by [`ProjectService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Projects need a non-blank name.
    #[error("project name must not be empty")]
    EmptyName,
    /// Backing store returned an error.
    #[error("store error: {0}")]
    Store(#[from] Error),
}

/// Convenience result alias for service operations.
pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

/// Service façade over the project library.
pub struct ProjectService<S> {
    store: S,
}

impl<S> ProjectService<S> {
    /// Wrap `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S: ProjectStore> ProjectService<S> {
    fn store_error(err: S::Error) -> ServiceError {
        ServiceError::Store(err.into())
    }

    /// Create a stitch-only project and return its id.
    ///
    /// # Errors
    /// Returns [`ServiceError::EmptyName`] for blank names and
    /// [`ServiceError::Store`] when the project cannot be saved.
    pub fn create_single(&self, name: &str, step: Adjustment) -> Result<ProjectId> {
        let mut stitch = Counter::named(validated_name(name)?);
        stitch.set_adjustment(step);
        self.insert(&stitch, None)
    }

    /// Create a project with a stitch counter and a row counter measuring
    /// progress against `total_rows`.
    ///
    /// # Errors
    /// Returns [`ServiceError::EmptyName`] for blank names and
    /// [`ServiceError::Store`] when the project cannot be saved.
    pub fn create_double(&self, name: &str, total_rows: u32, step: Adjustment) -> Result<ProjectId> {
        let name = validated_name(name)?;
        let mut stitch = Counter::named(name);
        stitch.set_adjustment(step);
        let mut row = Counter::named(name);
        row.set_adjustment(step);
        row.set_total_target(total_rows);
        self.insert(&stitch, Some(&row))
    }

    fn insert(&self, stitch: &Counter, row: Option<&Counter>) -> Result<ProjectId> {
        let record = ProjectRecord::from_counters(stitch, row);
        let kind = record.kind;
        let id = self.store.upsert(record).map_err(Self::store_error)?;
        info!(%id, kind = kind.as_str(), "Created project");
        Ok(id)
    }

    /// Counters of a stored project, ready for a session.
    ///
    /// # Errors
    /// Returns [`ServiceError::Store`] when the project is missing or unreadable.
    pub fn open(&self, id: ProjectId) -> Result<(Counter, Option<Counter>)> {
        let record = self.store.load(id).map_err(Self::store_error)?;
        Ok(record.counters())
    }

    /// Stored record of a project.
    ///
    /// # Errors
    /// Returns [`ServiceError::Store`] when the project is missing or unreadable.
    pub fn record(&self, id: ProjectId) -> Result<ProjectRecord> {
        self.store.load(id).map_err(Self::store_error)
    }

    /// Every project in the library.
    ///
    /// # Errors
    /// Returns [`ServiceError::Store`] when the library cannot be read.
    pub fn list(&self) -> Result<Vec<ProjectRecord>> {
        self.store.list().map_err(Self::store_error)
    }

    /// Mark a project finished and return the stored record.
    ///
    /// A project that is already finished keeps its original completion time.
    ///
    /// # Errors
    /// Returns [`ServiceError::Store`] when the project is missing or cannot be saved.
    pub fn complete(&self, id: ProjectId) -> Result<ProjectRecord> {
        self.set_completed(id, true)
    }

    /// Clear a project's finished mark and return the stored record.
    ///
    /// # Errors
    /// Returns [`ServiceError::Store`] when the project is missing or cannot be saved.
    pub fn reopen(&self, id: ProjectId) -> Result<ProjectRecord> {
        self.set_completed(id, false)
    }

    fn set_completed(&self, id: ProjectId, completed: bool) -> Result<ProjectRecord> {
        let mut record = self.record(id)?;
        record.completed_at = if completed {
            record.completed_at.or_else(|| Some(OffsetDateTime::now_utc()))
        } else {
            None
        };
        self.store.upsert(record).map_err(Self::store_error)?;
        info!(%id, completed, "Updated project completion");
        self.record(id)
    }

    /// Delete projects, returning how many were removed.
    ///
    /// # Errors
    /// Returns [`ServiceError::Store`] when the library cannot be written.
    pub fn delete(&self, ids: &[ProjectId]) -> Result<usize> {
        self.store.delete(ids).map_err(Self::store_error)
    }
}

fn validated_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::EmptyName);
    }
    Ok(name)
}
