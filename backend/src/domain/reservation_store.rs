//! In-memory owner of one month's reservations.

use chrono::NaiveDate;
use tracing::debug;

use super::{
    Choice, LunchSlot, MonthKey, MonthReservations, PersonId, ReservationError, RosterCategory,
};

/// Resolves person ids to display names for rosters.
pub trait NameLookup {
    /// Display name for `id`, if the person is known.
    fn display_name(&self, id: &PersonId) -> Option<&str>;
}

/// Per-date counts for every category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayCounts {
    /// Vegetarian meals.
    pub vegetarian: usize,
    /// People on the 11:45 sitting.
    pub slot_1145: usize,
    /// People on the 12:30 sitting.
    pub slot_1230: usize,
}

/// Counts for the two sittings, as reported after a slot change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotCounts {
    /// People on the 11:45 sitting.
    pub slot_1145: usize,
    /// People on the 12:30 sitting.
    pub slot_1230: usize,
}

/// Exclusive in-memory owner of a [`MonthReservations`].
///
/// Every mutation is idempotent: repeating a call with the same arguments
/// leaves the same state. Slot exclusivity holds at write time because a
/// person's choice carries a single [`LunchSlot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationStore {
    reservations: MonthReservations,
}

impl ReservationStore {
    /// Wrap loaded reservations.
    #[must_use]
    pub const fn new(reservations: MonthReservations) -> Self {
        Self { reservations }
    }

    /// The loaded month.
    #[must_use]
    pub const fn month(&self) -> MonthKey {
        self.reservations.month()
    }

    /// Read-only view for persistence and export.
    #[must_use]
    pub const fn snapshot(&self) -> &MonthReservations {
        &self.reservations
    }

    /// Swap in freshly loaded reservations, discarding the current ones.
    pub fn replace(&mut self, reservations: MonthReservations) {
        self.reservations = reservations;
    }

    /// Choice for `person` on `date`; "no reservation" when absent.
    #[must_use]
    pub fn get_choice(&self, date: NaiveDate, person: &PersonId) -> Choice {
        self.reservations
            .day(date)
            .and_then(|day| day.get(person))
            .copied()
            .unwrap_or_default()
    }

    /// Set the vegetarian flag.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError`] when `date` is not a weekday of the
    /// loaded month.
    pub fn set_vegetarian(
        &mut self,
        date: NaiveDate,
        person: &PersonId,
        value: bool,
    ) -> Result<Choice, ReservationError> {
        let choice = self
            .reservations
            .update(date, person, |choice| choice.vegetarian = value)?;
        debug!(%date, person = %person, vegetarian = value, "vegetarian flag set");
        Ok(choice)
    }

    /// Book `slot`, replacing any other slot held by `person` that day.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError`] when `date` is not a weekday of the
    /// loaded month.
    pub fn set_slot(
        &mut self,
        date: NaiveDate,
        person: &PersonId,
        slot: LunchSlot,
    ) -> Result<Choice, ReservationError> {
        let choice = self
            .reservations
            .update(date, person, |choice| choice.slot = slot)?;
        debug!(%date, person = %person, slot = %slot, "slot set");
        Ok(choice)
    }

    /// Number of people matching `category` on `date`.
    #[must_use]
    pub fn count_for(&self, date: NaiveDate, category: RosterCategory) -> usize {
        self.reservations.day(date).map_or(0, |day| {
            day.iter()
                .filter(|(_, choice)| category.includes(choice))
                .count()
        })
    }

    /// All three counts for `date`.
    #[must_use]
    pub fn counts(&self, date: NaiveDate) -> DayCounts {
        DayCounts {
            vegetarian: self.count_for(date, RosterCategory::Vegetarian),
            slot_1145: self.count_for(date, RosterCategory::Slot1145),
            slot_1230: self.count_for(date, RosterCategory::Slot1230),
        }
    }

    /// Sitting counts for `date`.
    #[must_use]
    pub fn slot_counts(&self, date: NaiveDate) -> SlotCounts {
        SlotCounts {
            slot_1145: self.count_for(date, RosterCategory::Slot1145),
            slot_1230: self.count_for(date, RosterCategory::Slot1230),
        }
    }

    /// Names matching `category` on `date`, first-registered first.
    ///
    /// Ids unknown to `names` are listed as the raw id.
    #[must_use]
    pub fn roster_for(
        &self,
        date: NaiveDate,
        category: RosterCategory,
        names: &impl NameLookup,
    ) -> Vec<String> {
        self.reservations.day(date).map_or_else(Vec::new, |day| {
            day.iter()
                .filter(|(_, choice)| category.includes(choice))
                .map(|(id, _)| {
                    names
                        .display_name(id)
                        .map_or_else(|| id.to_string(), str::to_owned)
                })
                .collect()
        })
    }
}
