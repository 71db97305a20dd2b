//! Storage seam between the application layer and a project library.

use anyhow::Error;
use stitch_counter_core::{ProjectId, ProjectRecord};
use stitch_counter_store::{JsonStore, StoreError};

/// Minimal storage abstraction required by the services and persisters.
pub trait ProjectStore {
    /// Error type bubbled up from the backing store.
    type Error: Into<Error>;

    /// Load a single project.
    ///
    /// # Errors
    /// Returns a store-specific error when the project is missing or unreadable.
    fn load(&self, id: ProjectId) -> Result<ProjectRecord, Self::Error>;

    /// Enumerate every stored project.
    ///
    /// # Errors
    /// Returns a store-specific error when listing fails.
    fn list(&self) -> Result<Vec<ProjectRecord>, Self::Error>;

    /// Insert (id `0`) or replace a project, returning its id.
    ///
    /// # Errors
    /// Returns a store-specific error when persisting fails.
    fn upsert(&self, record: ProjectRecord) -> Result<ProjectId, Self::Error>;

    /// Delete projects, returning how many were removed.
    ///
    /// # Errors
    /// Returns a store-specific error when deletion fails.
    fn delete(&self, ids: &[ProjectId]) -> Result<usize, Self::Error>;
}

impl ProjectStore for JsonStore {
    type Error = StoreError;

    fn load(&self, id: ProjectId) -> Result<ProjectRecord, Self::Error> {
        Self::load(self, id)
    }

    fn list(&self) -> Result<Vec<ProjectRecord>, Self::Error> {
        Self::list(self)
    }

    fn upsert(&self, record: ProjectRecord) -> Result<ProjectId, Self::Error> {
        Self::upsert(self, record)
    }

    fn delete(&self, ids: &[ProjectId]) -> Result<usize, Self::Error> {
        Self::delete(self, ids)
    }
}

impl<S: ProjectStore + ?Sized> ProjectStore for &S {
    type Error = S::Error;

    fn load(&self, id: ProjectId) -> Result<ProjectRecord, Self::Error> {
        (**self).load(id)
    }

    fn list(&self) -> Result<Vec<ProjectRecord>, Self::Error> {
        (**self).list()
    }

    fn upsert(&self, record: ProjectRecord) -> Result<ProjectId, Self::Error> {
        (**self).upsert(record)
    }

    fn delete(&self, ids: &[ProjectId]) -> Result<usize, Self::Error> {
        (**self).delete(ids)
    }
}
