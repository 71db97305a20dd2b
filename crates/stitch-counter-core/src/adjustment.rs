use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CounterError;

/// Amount applied to a counter per increment or decrement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub enum Adjustment {
    /// Step by one.
    #[default]
    One,
    /// Step by five.
    Five,
    /// Step by ten.
    Ten,
}

impl Adjustment {
    /// Every adjustment, in the order the controls are laid out.
    pub const ALL: [Self; 3] = [Self::One, Self::Five, Self::Ten];

    /// Numeric step applied to the counter value.
    #[must_use]
    pub const fn amount(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Five => 5,
            Self::Ten => 10,
        }
    }

    /// Label shown on the adjustment control.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::One => "+1",
            Self::Five => "+5",
            Self::Ten => "+10",
        }
    }

    /// Resolve an adjustment from its numeric step.
    ///
    /// # Errors
    /// Returns [`CounterError::InvalidAdjustment`] for anything but 1, 5 or 10.
    pub fn from_amount(amount: i64) -> Result<Self, CounterError> {
        match amount {
            1 => Ok(Self::One),
            5 => Ok(Self::Five),
            10 => Ok(Self::Ten),
            other => Err(CounterError::InvalidAdjustment(other)),
        }
    }
}

impl TryFrom<i64> for Adjustment {
    type Error = CounterError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_amount(value)
    }
}

impl From<Adjustment> for i64 {
    fn from(value: Adjustment) -> Self {
        Self::from(value.amount())
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.amount().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_known_steps() {
        assert_eq!(Adjustment::from_amount(1), Ok(Adjustment::One));
        assert_eq!(Adjustment::from_amount(5), Ok(Adjustment::Five));
        assert_eq!(Adjustment::from_amount(10), Ok(Adjustment::Ten));
        for bad in [-10, -1, 0, 2, 3, 4, 6, 9, 11, 100] {
            assert_eq!(
                Adjustment::from_amount(bad),
                Err(CounterError::InvalidAdjustment(bad))
            );
        }
    }

    #[test]
    fn serializes_as_its_amount() {
        let json = serde_json::to_string(&Adjustment::Five).expect("must serialize");
        assert_eq!(json, "5");
        let parsed: Adjustment = serde_json::from_str("10").expect("must parse");
        assert_eq!(parsed, Adjustment::Ten);
        assert!(serde_json::from_str::<Adjustment>("7").is_err());
    }

    #[test]
    fn labels_match_controls() {
        let labels: Vec<_> = Adjustment::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels, vec!["+1", "+5", "+10"]);
    }
}
