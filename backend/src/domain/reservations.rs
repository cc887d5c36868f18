//! Per-month reservation data.
//!
//! [`MonthReservations`] maps each weekday of one month to a [`DayEntry`],
//! which maps person ids to their [`Choice`]. Person keys keep insertion
//! order: rosters list the first-registered person first.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use thiserror::Error;

use super::{Choice, MonthKey, PersonId, is_weekday};

/// Precondition violations raised when a caller addresses a date the loaded
/// month cannot hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationError {
    /// The date belongs to another month.
    #[error("date {date} is outside the loaded month {month}")]
    OutsideMonth {
        /// Requested date.
        date: NaiveDate,
        /// Loaded month.
        month: MonthKey,
    },
    /// The date is a Saturday or Sunday.
    #[error("date {date} falls on a weekend")]
    Weekend {
        /// Requested date.
        date: NaiveDate,
    },
}

/// Choices recorded for one date, keyed by person.
///
/// Absence of a key means "no reservation"; stored choices are never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayEntry(IndexMap<PersonId, Choice>);

impl DayEntry {
    /// Choice recorded for `person`, if any.
    #[must_use]
    pub fn get(&self, person: &PersonId) -> Option<&Choice> {
        self.0.get(person)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&PersonId, &Choice)> {
        self.0.iter()
    }

    /// Number of people with a reservation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nobody has a reservation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(super) fn entry_mut(&mut self, person: &PersonId) -> &mut Choice {
        self.0.entry(person.clone()).or_default()
    }

    /// Drop the key when its choice is "no reservation".
    ///
    /// `shift_remove` keeps the remaining keys in registration order.
    pub(super) fn clear_if_empty(&mut self, person: &PersonId) {
        if self.0.get(person).is_some_and(Choice::is_empty) {
            self.0.shift_remove(person);
        }
    }
}

/// All reservations of one calendar month.
///
/// ## Invariants
/// - Keys are weekdays of [`MonthReservations::month`].
/// - No [`DayEntry`] is empty and no stored [`Choice`] is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthReservations {
    month: MonthKey,
    days: BTreeMap<NaiveDate, DayEntry>,
}

impl MonthReservations {
    /// Empty reservations for `month`.
    #[must_use]
    pub const fn new(month: MonthKey) -> Self {
        Self {
            month,
            days: BTreeMap::new(),
        }
    }

    /// The month these reservations cover.
    #[must_use]
    pub const fn month(&self) -> MonthKey {
        self.month
    }

    /// Entry for `date`, if anyone has reserved.
    #[must_use]
    pub fn day(&self, date: NaiveDate) -> Option<&DayEntry> {
        self.days.get(&date)
    }

    /// Non-empty days in calendar order.
    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, &DayEntry)> {
        self.days.iter().map(|(date, entry)| (*date, entry))
    }

    /// Whether no reservation exists in the month.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Check that `date` is a weekday of this month.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError`] for dates in other months or on
    /// weekends.
    pub fn ensure_bookable(&self, date: NaiveDate) -> Result<(), ReservationError> {
        if !self.month.contains(date) {
            return Err(ReservationError::OutsideMonth {
                date,
                month: self.month,
            });
        }
        if !is_weekday(date) {
            return Err(ReservationError::Weekend { date });
        }
        Ok(())
    }

    /// Record `choice` for `person` on `date`, appending new keys at the end.
    ///
    /// An empty choice removes the key instead, so loading and mutation share
    /// one garbage-collection rule.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError`] when `date` is not bookable.
    pub fn insert(
        &mut self,
        date: NaiveDate,
        person: &PersonId,
        choice: Choice,
    ) -> Result<(), ReservationError> {
        self.update(date, person, |current| *current = choice)
            .map(|_| ())
    }

    pub(super) fn update(
        &mut self,
        date: NaiveDate,
        person: &PersonId,
        apply: impl FnOnce(&mut Choice),
    ) -> Result<Choice, ReservationError> {
        self.ensure_bookable(date)?;
        let entry = self.days.entry(date).or_default();
        let choice = entry.entry_mut(person);
        apply(choice);
        let result = *choice;
        entry.clear_if_empty(person);
        if entry.is_empty() {
            self.days.remove(&date);
        }
        Ok(result)
    }
}
