//! Application layer logic for stitch-counter.
//!
//! This crate wires counters to storage and presentation: the persistence
//! seam, counter sessions, library use cases and configuration shared by
//! front-ends.

pub mod background;
pub mod config;
pub mod persist;
pub mod project_store;
pub mod service;
pub mod session;

// Re-exports for convenience
pub use background::BackgroundPersister;
pub use config::{AppConfig, CounterConfig, DisplayConfig, PersistenceConfig, resolve_data_dir};
pub use persist::{PersistenceGateway, StorePersister};
pub use project_store::ProjectStore;
pub use service::{ProjectService, ServiceError};
pub use session::{CounterSession, SessionError, SessionState};
