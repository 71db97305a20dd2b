//! Positional transport snapshot of a [`Counter`].
//!
//! Field order is part of the format: `id`, `value`, `step`, `total_target`,
//! `project_name`. The JSON form is an array; the binary form writes each
//! integer as a little-endian `u32` followed by the name as a `u32` byte
//! length and UTF-8 bytes ([`ABSENT_NAME`] marks a missing name).

use serde::{Deserialize, Serialize};

use crate::adjustment::Adjustment;
use crate::counter::Counter;
use crate::error::{CounterError, Result};
use crate::id::ProjectId;

/// Length marker for a snapshot written without a project name.
pub const ABSENT_NAME: u32 = u32::MAX;

/// Ordered snapshot `(id, value, step, total_target, project_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot(
    /// Project identifier (`0` when unpersisted).
    pub u32,
    /// Counter value.
    pub u32,
    /// Adjustment step.
    pub u32,
    /// Total target.
    pub u32,
    /// Project name.
    pub String,
);

impl Counter {
    /// Capture the counter as an ordered transport snapshot.
    #[must_use]
    pub fn to_snapshot(&self) -> CounterSnapshot {
        CounterSnapshot(
            self.id().0,
            self.value(),
            self.step().amount(),
            self.total_target(),
            self.project_name().to_owned(),
        )
    }

    /// Rebuild a counter from a transport snapshot.
    ///
    /// # Errors
    /// Returns [`CounterError::InvalidSnapshot`] when the value is out of range
    /// or the step is not a known adjustment.
    pub fn from_snapshot(snapshot: CounterSnapshot) -> Result<Self> {
        let CounterSnapshot(id, value, step, total_target, project_name) = snapshot;
        if value > Self::MAX {
            return Err(CounterError::InvalidSnapshot(format!(
                "value {value} exceeds {}",
                Self::MAX
            )));
        }
        let step = Adjustment::from_amount(i64::from(step))
            .map_err(|err| CounterError::InvalidSnapshot(err.to_string()))?;
        Ok(Self::from_parts(
            ProjectId(id),
            value,
            step,
            total_target,
            project_name,
        ))
    }
}

impl TryFrom<CounterSnapshot> for Counter {
    type Error = CounterError;

    fn try_from(snapshot: CounterSnapshot) -> Result<Self> {
        Self::from_snapshot(snapshot)
    }
}

impl From<&Counter> for CounterSnapshot {
    fn from(counter: &Counter) -> Self {
        counter.to_snapshot()
    }
}

impl CounterSnapshot {
    /// Encode the snapshot in its binary parcel form.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(20 + self.4.len());
        for field in [self.0, self.1, self.2, self.3] {
            out.extend_from_slice(&field.to_le_bytes());
        }
        // Names longer than u32::MAX - 1 bytes cannot occur for a text label.
        let len = u32::try_from(self.4.len()).unwrap_or(ABSENT_NAME - 1);
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&self.4.as_bytes()[..len as usize]);
        out
    }

    /// Decode a snapshot from its binary parcel form, reading fields in order.
    ///
    /// # Errors
    /// Returns [`CounterError::InvalidSnapshot`] for truncated input, trailing
    /// bytes or a name that is not valid UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = ParcelReader { bytes, pos: 0 };
        let id = reader.read_u32("id")?;
        let value = reader.read_u32("value")?;
        let step = reader.read_u32("step")?;
        let total_target = reader.read_u32("total_target")?;
        let name = reader.read_string("project_name")?;
        if reader.pos != bytes.len() {
            return Err(CounterError::InvalidSnapshot(format!(
                "{} trailing bytes",
                bytes.len() - reader.pos
            )));
        }
        Ok(Self(id, value, step, total_target, name))
    }

    /// Encode the snapshot as a positional JSON array.
    ///
    /// # Errors
    /// Propagates serializer failures.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a snapshot from a positional JSON array.
    ///
    /// # Errors
    /// Returns [`CounterError::InvalidSnapshot`] when the JSON does not match.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| CounterError::InvalidSnapshot(err.to_string()))
    }
}

struct ParcelReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl ParcelReader<'_> {
    fn take(&mut self, len: usize, field: &str) -> Result<&[u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| CounterError::InvalidSnapshot(format!("truncated at {field}")))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u32(&mut self, field: &str) -> Result<u32> {
        let raw = self.take(4, field)?;
        let mut buf = [0_u8; 4];
        buf.copy_from_slice(raw);
        Ok(u32::from_le_bytes(buf))
    }

    fn read_string(&mut self, field: &str) -> Result<String> {
        let len = self.read_u32(field)?;
        if len == ABSENT_NAME {
            return Ok(String::new());
        }
        let raw = self.take(len as usize, field)?;
        String::from_utf8(raw.to_vec())
            .map_err(|err| CounterError::InvalidSnapshot(format!("{field}: {err}")))
    }
}
