use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};

/// Identifier of a persisted project.
///
/// The value `0` is reserved for counters that have not been written to the
/// library yet; the store assigns positive identifiers on first insert.
#[derive(
    Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProjectId(pub u32);

impl ProjectId {
    /// Identifier of a counter that has not been persisted.
    pub const UNSET: Self = Self(0);

    /// Whether this identifier refers to a stored project.
    #[must_use]
    pub const fn is_persisted(self) -> bool {
        self.0 > 0
    }

    /// The identifier that follows `self`, used by stores when assigning ids.
    ///
    /// Returns `None` once the id space is exhausted.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(next) => Some(Self(next)),
            None => None,
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProjectId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<u32> for ProjectId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_id_is_not_persisted() {
        assert!(!ProjectId::UNSET.is_persisted());
        assert!(!ProjectId::default().is_persisted());
        assert!(ProjectId(7).is_persisted());
    }

    #[test]
    fn next_stops_at_the_largest_id() {
        assert_eq!(ProjectId::UNSET.next(), Some(ProjectId(1)));
        assert_eq!(ProjectId(u32::MAX - 1).next(), Some(ProjectId(u32::MAX)));
        assert_eq!(ProjectId(u32::MAX).next(), None);
    }

    #[test]
    fn project_id_roundtrip() {
        let parsed: ProjectId = " 42 ".parse().expect("must parse project id");
        assert_eq!(parsed, ProjectId(42));
        assert_eq!(parsed.to_string(), "42");
    }

    #[test]
    fn project_id_rejects_negative_values() {
        assert!("-1".parse::<ProjectId>().is_err());
    }

    #[test]
    fn project_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&ProjectId(3)).expect("must serialize");
        assert_eq!(json, "3");
    }
}
