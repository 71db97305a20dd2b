use crate::adjustment::Adjustment;
use crate::error::{CounterError, Result};
use crate::id::ProjectId;

/// Bounded counter for one countable quantity of a project.
///
/// The value is clamped to [`Counter::MIN`]..=[`Counter::MAX`] on every
/// mutation and the step is always one of the [`Adjustment`] variants.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Counter {
    id: ProjectId,
    value: u32,
    step: Adjustment,
    total_target: u32,
    project_name: String,
}

/// Progress of a counter against its total target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Current counter value.
    pub value: u32,
    /// Total the value is measured against (never zero).
    pub total: u32,
    /// Rounded percentage of `total` reached by `value`.
    pub percent: u32,
}

impl Counter {
    /// Lowest reachable value.
    pub const MIN: u32 = 0;
    /// Highest reachable value.
    pub const MAX: u32 = 9999;

    /// Fresh, unpersisted counter at zero with a step of one.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh counter labelled with `name`.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            project_name: name.into(),
            ..Self::default()
        }
    }

    /// Rebuild a counter from stored fields, clamping the value into range.
    #[must_use]
    pub fn from_parts(
        id: ProjectId,
        value: u32,
        step: Adjustment,
        total_target: u32,
        project_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            value: value.min(Self::MAX),
            step,
            total_target,
            project_name: project_name.into(),
        }
    }

    /// Identifier of the project this counter belongs to.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Current value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Current adjustment step.
    #[must_use]
    pub const fn step(&self) -> Adjustment {
        self.step
    }

    /// Denominator used for progress; zero disables progress.
    #[must_use]
    pub const fn total_target(&self) -> u32 {
        self.total_target
    }

    /// Free-text project label.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Record the identifier assigned by the project library.
    pub const fn assign_id(&mut self, id: ProjectId) {
        self.id = id;
    }

    /// Add one step, saturating at [`Counter::MAX`].
    pub fn increment(&mut self) {
        self.value = self
            .value
            .saturating_add(self.step.amount())
            .min(Self::MAX);
    }

    /// Subtract one step, saturating at [`Counter::MIN`].
    pub fn decrement(&mut self) {
        self.value = self
            .value
            .saturating_sub(self.step.amount())
            .max(Self::MIN);
    }

    /// Return the value to [`Counter::MIN`].
    pub const fn reset(&mut self) {
        self.value = Self::MIN;
    }

    /// Change the step to `amount`.
    ///
    /// # Errors
    /// Returns [`CounterError::InvalidAdjustment`] when `amount` is not 1, 5
    /// or 10; the current step is kept.
    pub fn set_adjustment_step(&mut self, amount: i64) -> Result<Adjustment> {
        let step = Adjustment::from_amount(amount)?;
        self.step = step;
        Ok(step)
    }

    /// Change the step to an already validated adjustment.
    pub const fn set_adjustment(&mut self, step: Adjustment) {
        self.step = step;
    }

    /// Set the total the value is measured against.
    pub const fn set_total_target(&mut self, total: u32) {
        self.total_target = total;
    }

    /// Replace the project label. Empty names are accepted here.
    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.project_name = name.into();
    }

    /// Percentage of the total target reached, rounded half up.
    ///
    /// # Errors
    /// Returns [`CounterError::UndefinedProgress`] when the total target is zero.
    pub fn progress_percent(&self) -> Result<u32> {
        if self.total_target == 0 {
            return Err(CounterError::UndefinedProgress);
        }
        let value = u64::from(self.value);
        let total = u64::from(self.total_target);
        // round(100 * value / total) == floor((200 * value + total) / (2 * total))
        let percent = (200 * value + total) / (2 * total);
        Ok(u32::try_from(percent).unwrap_or(u32::MAX))
    }

    /// Progress against the total target, if one is set.
    #[must_use]
    pub fn progress(&self) -> Option<Progress> {
        self.progress_percent().ok().map(|percent| Progress {
            value: self.value,
            total: self.total_target,
            percent,
        })
    }
}
