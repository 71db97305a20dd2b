//! A counter screen: counters, rendering and persistence wired together.

use serde::{Deserialize, Serialize};
use stitch_counter_core::{
    Adjustment, Counter, CounterError, CounterFormat, CounterSlot, CounterSnapshot,
    PresentationGateway, ProjectHistory, ProjectRecord, render,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::persist::PersistenceGateway;

/// Errors raised by [`CounterSession`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The row slot was addressed on a single-counter project.
    #[error("this project has no row counter")]
    NoRowCounter,
    /// A counter operation was rejected.
    #[error(transparent)]
    Counter(#[from] CounterError),
}

/// Convenience result alias for session operations.
pub type Result<T, E = SessionError> = std::result::Result<T, E>;

/// Transport form of a session, suitable for saving across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Stitch counter snapshot.
    pub stitch: CounterSnapshot,
    /// Row counter snapshot for double projects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<CounterSnapshot>,
    /// Lifetime facts of the project.
    #[serde(default)]
    pub history: ProjectHistory,
}

/// One open project screen.
///
/// Every mutation re-renders the addressed slot and hands both counters to
/// the persistence gateway. A project without an id is only written by
/// [`pause`](Self::pause) and [`close`](Self::close), which insert it once
/// and adopt the id the gateway assigns.
pub struct CounterSession<G, P> {
    stitch: Counter,
    row: Option<Counter>,
    history: ProjectHistory,
    format: CounterFormat,
    presenter: G,
    persister: P,
}

impl<G, P> CounterSession<G, P>
where
    G: PresentationGateway,
    P: PersistenceGateway,
{
    /// Open a session and render every counter.
    pub fn open(
        stitch: Counter,
        row: Option<Counter>,
        format: CounterFormat,
        presenter: G,
        persister: P,
    ) -> Self {
        let mut session = Self {
            stitch,
            row,
            history: ProjectHistory::default(),
            format,
            presenter,
            persister,
        };
        session.render_all();
        session
    }

    /// Open a session on a stored project, keeping its lifetime facts.
    pub fn open_project(
        record: &ProjectRecord,
        format: CounterFormat,
        presenter: G,
        persister: P,
    ) -> Self {
        let (stitch, row) = record.counters();
        Self::open(stitch, row, format, presenter, persister).with_history(record.history())
    }

    /// Rebuild a session from [`save_state`](Self::save_state) output.
    ///
    /// # Errors
    /// Returns [`SessionError::Counter`] when a snapshot is malformed.
    pub fn restore(
        state: SessionState,
        format: CounterFormat,
        presenter: G,
        persister: P,
    ) -> Result<Self> {
        let stitch = Counter::from_snapshot(state.stitch)?;
        let row = state.row.map(Counter::from_snapshot).transpose()?;
        Ok(Self::open(stitch, row, format, presenter, persister).with_history(state.history))
    }

    /// Replace the project's lifetime facts.
    #[must_use]
    pub const fn with_history(mut self, history: ProjectHistory) -> Self {
        self.history = history;
        self
    }

    /// The stitch counter.
    #[must_use]
    pub const fn stitch(&self) -> &Counter {
        &self.stitch
    }

    /// The row counter, for double projects.
    #[must_use]
    pub const fn row(&self) -> Option<&Counter> {
        self.row.as_ref()
    }

    /// Counter in `slot`.
    ///
    /// # Errors
    /// Returns [`SessionError::NoRowCounter`] for the row slot of a single project.
    pub fn counter(&self, slot: CounterSlot) -> Result<&Counter> {
        match slot {
            CounterSlot::Stitch => Ok(&self.stitch),
            CounterSlot::Row => self.row.as_ref().ok_or(SessionError::NoRowCounter),
        }
    }

    /// Lifetime facts of the project.
    #[must_use]
    pub const fn history(&self) -> &ProjectHistory {
        &self.history
    }

    /// Presentation gateway.
    #[must_use]
    pub const fn presenter(&self) -> &G {
        &self.presenter
    }

    /// Persistence gateway.
    #[must_use]
    pub const fn persister(&self) -> &P {
        &self.persister
    }

    /// Increase the counter in `slot` by its step.
    ///
    /// Stitch increments also add the step to the lifetime stitch total, even
    /// when the counter is already at its maximum.
    ///
    /// # Errors
    /// Returns [`SessionError::NoRowCounter`] for the row slot of a single project.
    pub fn increment(&mut self, slot: CounterSlot) -> Result<()> {
        if slot == CounterSlot::Stitch {
            self.history.record_stitches(self.stitch.step().amount());
        }
        self.update(slot, Counter::increment)
    }

    /// Decrease the counter in `slot` by its step.
    ///
    /// # Errors
    /// Returns [`SessionError::NoRowCounter`] for the row slot of a single project.
    pub fn decrement(&mut self, slot: CounterSlot) -> Result<()> {
        self.update(slot, Counter::decrement)
    }

    /// Reset the counter in `slot` to zero.
    ///
    /// # Errors
    /// Returns [`SessionError::NoRowCounter`] for the row slot of a single project.
    pub fn reset(&mut self, slot: CounterSlot) -> Result<()> {
        self.update(slot, Counter::reset)
    }

    /// Change the step of the counter in `slot`.
    ///
    /// Nothing is rendered or persisted when `amount` is rejected.
    ///
    /// # Errors
    /// Returns [`SessionError::Counter`] for amounts other than 1, 5 or 10 and
    /// [`SessionError::NoRowCounter`] for the row slot of a single project.
    pub fn set_adjustment_step(&mut self, slot: CounterSlot, amount: i64) -> Result<Adjustment> {
        let step = self.counter_mut(slot)?.set_adjustment_step(amount)?;
        self.commit(slot);
        Ok(step)
    }

    /// Change the total the counter in `slot` measures progress against.
    ///
    /// # Errors
    /// Returns [`SessionError::NoRowCounter`] for the row slot of a single project.
    pub fn set_total_target(&mut self, slot: CounterSlot, total: u32) -> Result<()> {
        self.update(slot, |counter| counter.set_total_target(total))
    }

    /// Rename the project.
    pub fn rename(&mut self, name: &str) {
        self.stitch.set_project_name(name);
        if let Some(row) = self.row.as_mut() {
            row.set_project_name(name);
        }
        self.persist();
    }

    /// Lifecycle save: hand both counters to the persistence gateway,
    /// inserting the project if it has no id yet.
    pub fn pause(&mut self) {
        self.save();
    }

    /// Snapshots of the current counters.
    #[must_use]
    pub fn save_state(&self) -> SessionState {
        SessionState {
            stitch: self.stitch.to_snapshot(),
            row: self.row.as_ref().map(Counter::to_snapshot),
            history: self.history,
        }
    }

    /// Persist one last time and give back the gateways.
    pub fn close(mut self) -> (G, P) {
        self.save();
        (self.presenter, self.persister)
    }

    fn counter_mut(&mut self, slot: CounterSlot) -> Result<&mut Counter> {
        match slot {
            CounterSlot::Stitch => Ok(&mut self.stitch),
            CounterSlot::Row => self.row.as_mut().ok_or(SessionError::NoRowCounter),
        }
    }

    fn update(&mut self, slot: CounterSlot, change: impl FnOnce(&mut Counter)) -> Result<()> {
        change(self.counter_mut(slot)?);
        self.commit(slot);
        Ok(())
    }

    fn commit(&mut self, slot: CounterSlot) {
        let counter = match slot {
            CounterSlot::Stitch => &self.stitch,
            CounterSlot::Row => match self.row.as_ref() {
                Some(row) => row,
                None => return,
            },
        };
        debug!(slot = slot.as_str(), value = counter.value(), "Counter changed");
        render(counter, slot, &self.format, &mut self.presenter);
        self.persist();
    }

    fn render_all(&mut self) {
        render(&self.stitch, CounterSlot::Stitch, &self.format, &mut self.presenter);
        if let Some(row) = self.row.as_ref() {
            render(row, CounterSlot::Row, &self.format, &mut self.presenter);
        }
    }

    fn record(&self) -> ProjectRecord {
        ProjectRecord::from_counters(&self.stitch, self.row.as_ref()).with_history(self.history)
    }

    fn persist(&self) {
        if !self.stitch.id().is_persisted() {
            debug!("Project has no id yet; write deferred");
            return;
        }
        self.persister.persist_record(self.record());
    }

    fn save(&mut self) {
        if self.stitch.id().is_persisted() {
            self.persist();
            return;
        }
        match self.persister.insert_record(self.record()) {
            Some(id) => {
                debug!(%id, "Inserted project");
                self.stitch.assign_id(id);
                if let Some(row) = self.row.as_mut() {
                    row.assign_id(id);
                }
            }
            None => warn!(title = self.stitch.project_name(), "Project was not saved"),
        }
    }
}
