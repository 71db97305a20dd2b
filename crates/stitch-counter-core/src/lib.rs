//! Domain types for stitch and row counters.

/// Adjustment steps.
pub mod adjustment;
/// Named-field bundle for seeding counters.
pub mod bundle;
/// The bounded counter state machine.
pub mod counter;
/// Error types.
pub mod error;
/// Identifier types.
pub mod id;
pub mod presentation;
/// Persisted project records.
pub mod project;
pub mod snapshot;

pub use adjustment::Adjustment;
pub use bundle::CounterBundle;
pub use counter::{Counter, Progress};
pub use error::CounterError;
pub use id::ProjectId;
pub use presentation::{
    AdjustmentHighlight, CounterFormat, CounterSlot, PresentationGateway, render,
    render_adjustment, render_value,
};
pub use project::{ProjectHistory, ProjectKind, ProjectRecord};
pub use snapshot::CounterSnapshot;
