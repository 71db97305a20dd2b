//! Named-field bundle used to seed a counter when a screen opens.

use serde::{Deserialize, Serialize};

use crate::adjustment::Adjustment;
use crate::counter::Counter;
use crate::error::Result;
use crate::id::ProjectId;

/// Initial values for a new counter session.
///
/// Every field is optional. A non-positive id, value or empty name leaves the
/// counter's current value alone; a non-positive step selects the default
/// step of one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterBundle {
    /// Project identifier; `0` leaves the counter unpersisted.
    #[serde(rename = "_id", default)]
    pub id: i64,
    /// Project name; empty leaves the default name.
    #[serde(default)]
    pub name: Option<String>,
    /// Starting value; `<= 0` keeps zero.
    #[serde(rename = "stitch_counter_number", default)]
    pub counter_number: i64,
    /// Starting step; `<= 0` selects the default step of one.
    #[serde(rename = "stitch_adjustment", default)]
    pub adjustment: i64,
}

impl CounterBundle {
    /// Parse a bundle from a JSON object.
    ///
    /// # Errors
    /// Propagates JSON errors.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Counter {
    /// Overlay the values carried by `bundle` onto this counter.
    ///
    /// The step is always taken from the bundle, falling back to
    /// [`Adjustment::One`] when it carries none.
    ///
    /// # Errors
    /// Returns [`CounterError::InvalidAdjustment`](crate::CounterError::InvalidAdjustment)
    /// when the bundle carries a positive step other than 1, 5 or 10. Nothing
    /// is applied in that case.
    pub fn apply_bundle(&mut self, bundle: &CounterBundle) -> Result<()> {
        let mut next = self.clone();
        if bundle.adjustment > 0 {
            next.set_adjustment_step(bundle.adjustment)?;
        } else {
            next.set_adjustment(Adjustment::One);
        }
        if let Ok(id) = u32::try_from(bundle.id)
            && id > 0
        {
            next.assign_id(ProjectId(id));
        }
        if let Some(name) = bundle.name.as_deref().filter(|name| !name.is_empty()) {
            next.set_project_name(name);
        }
        if bundle.counter_number > 0 {
            let value = u32::try_from(bundle.counter_number).unwrap_or(Self::MAX);
            next = Self::from_parts(
                next.id(),
                value,
                next.step(),
                next.total_target(),
                next.project_name(),
            );
        }
        *self = next;
        Ok(())
    }

    /// Build a fresh counter seeded from `bundle`.
    ///
    /// # Errors
    /// See [`Counter::apply_bundle`].
    pub fn from_bundle(bundle: &CounterBundle) -> Result<Self> {
        let mut counter = Self::new();
        counter.apply_bundle(bundle)?;
        Ok(counter)
    }
}
