use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::adjustment::Adjustment;
use crate::counter::Counter;
use crate::id::ProjectId;

/// Layout of a project screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    /// Stitch counter only.
    #[default]
    Single,
    /// Stitch counter paired with a row counter.
    Double,
}

impl ProjectKind {
    /// String representation used in listings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
        }
    }
}

/// Project facts that outlive individual counter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectHistory {
    /// Stitches worked over the project's lifetime; resets and decrements
    /// never lower it.
    #[serde(default)]
    pub total_stitches_ever: u32,
    /// When the project was marked finished.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

impl ProjectHistory {
    /// Whether the project is marked finished.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Count `amount` stitches towards the lifetime total.
    pub const fn record_stitches(&mut self, amount: u32) {
        self.total_stitches_ever = self.total_stitches_ever.saturating_add(amount);
    }
}

/// Stored form of a project in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Library identifier (`0` until inserted).
    pub id: ProjectId,
    /// Single or double counter project.
    #[serde(rename = "type")]
    pub kind: ProjectKind,
    /// Project title.
    pub title: String,
    /// Stitch counter value.
    pub stitch_counter_number: u32,
    /// Stitch counter step.
    pub stitch_adjustment: Adjustment,
    /// Row counter value (zero for single projects).
    #[serde(default)]
    pub row_counter_number: u32,
    /// Row counter step.
    #[serde(default)]
    pub row_adjustment: Adjustment,
    /// Total progress is measured against: the row counter's target for
    /// double projects, the stitch counter's for single ones.
    #[serde(default)]
    pub total_rows: u32,
    /// Creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last time the record was written.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Stitches worked over the project's lifetime.
    #[serde(default)]
    pub total_stitches_ever: u32,
    /// When the project was marked finished.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

impl ProjectRecord {
    /// Capture `primary` (and the optional `paired` row counter) as a record.
    ///
    /// With a paired counter the record is a double project whose title and
    /// total rows come from the row counter; the id always comes from the
    /// primary counter.
    #[must_use]
    pub fn from_counters(primary: &Counter, paired: Option<&Counter>) -> Self {
        let now = OffsetDateTime::now_utc();
        let mut record = Self {
            id: primary.id(),
            kind: ProjectKind::Single,
            title: primary.project_name().to_owned(),
            stitch_counter_number: primary.value(),
            stitch_adjustment: primary.step(),
            row_counter_number: 0,
            row_adjustment: Adjustment::default(),
            total_rows: primary.total_target(),
            created_at: now,
            updated_at: now,
            total_stitches_ever: 0,
            completed_at: None,
        };
        if let Some(row) = paired {
            record.kind = ProjectKind::Double;
            row.project_name().clone_into(&mut record.title);
            record.row_counter_number = row.value();
            record.row_adjustment = row.step();
            record.total_rows = row.total_target();
        }
        record
    }

    /// Attach lifetime facts carried outside the counters.
    #[must_use]
    pub const fn with_history(mut self, history: ProjectHistory) -> Self {
        self.total_stitches_ever = history.total_stitches_ever;
        self.completed_at = history.completed_at;
        self
    }

    /// Lifetime facts stored with this record.
    #[must_use]
    pub const fn history(&self) -> ProjectHistory {
        ProjectHistory {
            total_stitches_ever: self.total_stitches_ever,
            completed_at: self.completed_at,
        }
    }

    /// Counters described by this record: the stitch counter and, for double
    /// projects, the row counter.
    #[must_use]
    pub fn counters(&self) -> (Counter, Option<Counter>) {
        let stitch_target = match self.kind {
            ProjectKind::Single => self.total_rows,
            ProjectKind::Double => 0,
        };
        let stitch = Counter::from_parts(
            self.id,
            self.stitch_counter_number,
            self.stitch_adjustment,
            stitch_target,
            self.title.as_str(),
        );
        let row = match self.kind {
            ProjectKind::Single => None,
            ProjectKind::Double => Some(Counter::from_parts(
                self.id,
                self.row_counter_number,
                self.row_adjustment,
                self.total_rows,
                self.title.as_str(),
            )),
        };
        (stitch, row)
    }

    /// Progress of the counter carrying the total, when one is set.
    #[must_use]
    pub fn progress_percent(&self) -> Option<u32> {
        let (stitch, row) = self.counters();
        row.unwrap_or(stitch).progress_percent().ok()
    }
}
