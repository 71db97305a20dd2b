//! Fire-and-forget persistence of counters.

use stitch_counter_core::{Counter, ProjectId, ProjectRecord};
use tracing::{debug, warn};

use crate::project_store::ProjectStore;

/// Accepts counter snapshots for storage.
///
/// Callers never observe the outcome of a write; implementations own retries
/// and error reporting.
pub trait PersistenceGateway {
    /// Store `primary` and, for double-counter projects, the `paired` row counter.
    fn persist(&self, primary: &Counter, paired: Option<&Counter>) {
        self.persist_record(ProjectRecord::from_counters(primary, paired));
    }

    /// Store a complete project record.
    fn persist_record(&self, record: ProjectRecord);

    /// Insert a project that has no id yet and report the id it was given.
    ///
    /// Gateways that cannot learn the id synchronously return `None` without
    /// storing anything.
    fn insert_record(&self, record: ProjectRecord) -> Option<ProjectId> {
        debug!(title = %record.title, "Gateway cannot insert new projects");
        None
    }
}

impl<P: PersistenceGateway + ?Sized> PersistenceGateway for &P {
    fn persist(&self, primary: &Counter, paired: Option<&Counter>) {
        (**self).persist(primary, paired);
    }

    fn persist_record(&self, record: ProjectRecord) {
        (**self).persist_record(record);
    }

    fn insert_record(&self, record: ProjectRecord) -> Option<ProjectId> {
        (**self).insert_record(record)
    }
}

impl<P: PersistenceGateway + ?Sized> PersistenceGateway for Box<P> {
    fn persist(&self, primary: &Counter, paired: Option<&Counter>) {
        (**self).persist(primary, paired);
    }

    fn persist_record(&self, record: ProjectRecord) {
        (**self).persist_record(record);
    }

    fn insert_record(&self, record: ProjectRecord) -> Option<ProjectId> {
        (**self).insert_record(record)
    }
}

/// Gateway that writes synchronously through a [`ProjectStore`].
pub struct StorePersister<S> {
    store: S,
}

impl<S> StorePersister<S> {
    /// Wrap `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S: ProjectStore> StorePersister<S> {
    fn write(&self, record: ProjectRecord) -> Option<ProjectId> {
        let id = record.id;
        match self.store.upsert(record) {
            Ok(stored) => {
                debug!(id = %stored, "Persisted counters");
                Some(stored)
            }
            Err(err) => {
                let err: anyhow::Error = err.into();
                warn!(%id, error = %err, "Failed to persist counters");
                None
            }
        }
    }
}

impl<S: ProjectStore> PersistenceGateway for StorePersister<S> {
    fn persist_record(&self, record: ProjectRecord) {
        self.write(record);
    }

    fn insert_record(&self, record: ProjectRecord) -> Option<ProjectId> {
        self.write(record)
    }
}
