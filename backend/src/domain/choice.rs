//! A person's lunch choice for one day.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Time slot selection.
///
/// At most one slot is held per person per day; `None` is a first-class
/// state so that re-selecting the held slot can deselect it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LunchSlot {
    /// No slot booked.
    #[default]
    None,
    /// The 11:45 sitting.
    Slot1145,
    /// The 12:30 sitting.
    Slot1230,
}

impl LunchSlot {
    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Slot1145 => "11:45",
            Self::Slot1230 => "12:30",
        }
    }

    /// Roster category listing people on this slot.
    #[must_use]
    pub const fn category(self) -> Option<RosterCategory> {
        match self {
            Self::None => None,
            Self::Slot1145 => Some(RosterCategory::Slot1145),
            Self::Slot1230 => Some(RosterCategory::Slot1230),
        }
    }
}

impl fmt::Display for LunchSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown slot or category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {input}")]
pub struct ParseChoiceError {
    /// What was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub input: String,
}

impl FromStr for LunchSlot {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "1145" | "11:45" | "11h45" | "slot1145" => Ok(Self::Slot1145),
            "1230" | "12:30" | "12h30" | "slot1230" => Ok(Self::Slot1230),
            _ => Err(ParseChoiceError {
                kind: "slot",
                input: s.to_owned(),
            }),
        }
    }
}

/// One person's state for one date.
///
/// A choice with `vegetarian == false` and no slot means "no reservation";
/// the store never keeps such a value as an explicit entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Choice {
    /// Vegetarian meal requested; independent of the slot.
    pub vegetarian: bool,
    /// Booked sitting.
    pub slot: LunchSlot,
}

impl Choice {
    /// Whether this choice is equivalent to "no reservation".
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Aggregation categories for counts and rosters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RosterCategory {
    /// People who asked for the vegetarian meal.
    Vegetarian,
    /// People booked on the 11:45 sitting.
    Slot1145,
    /// People booked on the 12:30 sitting.
    Slot1230,
}

impl RosterCategory {
    /// Every category, in export order.
    pub const ALL: [Self; 3] = [Self::Vegetarian, Self::Slot1145, Self::Slot1230];

    /// Whether `choice` belongs in this category.
    #[must_use]
    pub fn includes(self, choice: &Choice) -> bool {
        match self {
            Self::Vegetarian => choice.vegetarian,
            Self::Slot1145 => choice.slot == LunchSlot::Slot1145,
            Self::Slot1230 => choice.slot == LunchSlot::Slot1230,
        }
    }

    /// Heading used in exports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vegetarian => "Vegetarian",
            Self::Slot1145 => "11:45",
            Self::Slot1230 => "12:30",
        }
    }
}

impl fmt::Display for RosterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RosterCategory {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "veg" | "vegetarian" => Ok(Self::Vegetarian),
            other => match other.parse::<LunchSlot>().map(LunchSlot::category) {
                Ok(Some(category)) => Ok(category),
                _ => Err(ParseChoiceError {
                    kind: "category",
                    input: s.to_owned(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1145", LunchSlot::Slot1145)]
    #[case("11:45", LunchSlot::Slot1145)]
    #[case("Slot1230", LunchSlot::Slot1230)]
    #[case("12h30", LunchSlot::Slot1230)]
    #[case("none", LunchSlot::None)]
    fn parses_slots(#[case] raw: &str, #[case] expected: LunchSlot) {
        assert_eq!(raw.parse::<LunchSlot>(), Ok(expected));
    }

    #[rstest]
    #[case("veg", RosterCategory::Vegetarian)]
    #[case("1145", RosterCategory::Slot1145)]
    #[case("12:30", RosterCategory::Slot1230)]
    fn parses_categories(#[case] raw: &str, #[case] expected: RosterCategory) {
        assert_eq!(raw.parse::<RosterCategory>(), Ok(expected));
    }

    #[rstest]
    #[case("none")]
    #[case("13:00")]
    fn rejects_unknown_categories(#[case] raw: &str) {
        assert!(raw.parse::<RosterCategory>().is_err());
    }

    #[test]
    fn default_choice_is_empty() {
        assert!(Choice::default().is_empty());
        let vegetarian_only = Choice {
            vegetarian: true,
            slot: LunchSlot::None,
        };
        assert!(!vegetarian_only.is_empty());
    }

    #[test]
    fn vegetarian_is_independent_of_slot_categories() {
        let choice = Choice {
            vegetarian: true,
            slot: LunchSlot::Slot1230,
        };
        assert!(RosterCategory::Vegetarian.includes(&choice));
        assert!(RosterCategory::Slot1230.includes(&choice));
        assert!(!RosterCategory::Slot1145.includes(&choice));
    }
}
