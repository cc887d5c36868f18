//! Selection controller: the single entry point for reservation changes.
//!
//! Every change passes two guards, evaluated on each call: an actor must be
//! selected, and the edit window must still be open for the date at the
//! clock's current local time. A failed guard is a routine outcome reported
//! as [`Outcome::Rejected`]; it never mutates state and never errors.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use tracing::debug;

use super::{
    EditWindow, LunchSlot, PersonId, ReservationError, ReservationStore, RosterCategory,
    SlotCounts,
};

/// Why a change was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardRejection {
    /// No acting person is selected.
    NoActor,
    /// The date is past, or today after the cutoff.
    Locked,
}

/// Whether a change went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The store was updated.
    Applied,
    /// A guard refused the change; the store is untouched.
    Rejected(GuardRejection),
}

impl Outcome {
    /// `true` for [`Outcome::Applied`].
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Result of [`SelectionController::toggle_vegetarian`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VegetarianToggle {
    /// Whether the flag flipped.
    pub outcome: Outcome,
    /// Vegetarian count for the date after the call.
    pub count: usize,
}

/// Result of [`SelectionController::select_slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSelection {
    /// Whether the slot changed.
    pub outcome: Outcome,
    /// Sitting counts for the date after the call.
    pub counts: SlotCounts,
}

/// Guards and applies reservation changes.
#[derive(Clone)]
pub struct SelectionController {
    window: EditWindow,
    clock: Arc<dyn Clock>,
}

impl SelectionController {
    /// Controller enforcing `window` against `clock`.
    pub const fn new(window: EditWindow, clock: Arc<dyn Clock>) -> Self {
        Self { window, clock }
    }

    /// Whether `date` is editable right now.
    #[must_use]
    pub fn is_editable(&self, date: NaiveDate) -> bool {
        self.window
            .is_editable(date, self.clock.local().naive_local())
    }

    fn admit<'a>(
        &self,
        date: NaiveDate,
        actor: Option<&'a PersonId>,
    ) -> Result<&'a PersonId, GuardRejection> {
        let person = actor.ok_or(GuardRejection::NoActor)?;
        if self.is_editable(date) {
            Ok(person)
        } else {
            Err(GuardRejection::Locked)
        }
    }

    /// Flip the actor's vegetarian flag for `date`.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError`] when `date` is not a weekday of the
    /// store's month. That check runs before the guards.
    pub fn toggle_vegetarian(
        &self,
        store: &mut ReservationStore,
        date: NaiveDate,
        actor: Option<&PersonId>,
    ) -> Result<VegetarianToggle, ReservationError> {
        store.snapshot().ensure_bookable(date)?;
        let outcome = match self.admit(date, actor) {
            Ok(person) => {
                let current = store.get_choice(date, person);
                store.set_vegetarian(date, person, !current.vegetarian)?;
                Outcome::Applied
            }
            Err(rejection) => {
                debug!(%date, ?rejection, "vegetarian toggle rejected");
                Outcome::Rejected(rejection)
            }
        };
        Ok(VegetarianToggle {
            outcome,
            count: store.count_for(date, RosterCategory::Vegetarian),
        })
    }

    /// Select `slot` for the actor on `date`.
    ///
    /// Selecting the slot the actor already holds deselects it, as does
    /// passing [`LunchSlot::None`]. The vegetarian flag is never touched.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError`] when `date` is not a weekday of the
    /// store's month. That check runs before the guards.
    pub fn select_slot(
        &self,
        store: &mut ReservationStore,
        date: NaiveDate,
        actor: Option<&PersonId>,
        slot: LunchSlot,
    ) -> Result<SlotSelection, ReservationError> {
        store.snapshot().ensure_bookable(date)?;
        let outcome = match self.admit(date, actor) {
            Ok(person) => {
                let held = store.get_choice(date, person).slot;
                let target = if held == slot { LunchSlot::None } else { slot };
                store.set_slot(date, person, target)?;
                Outcome::Applied
            }
            Err(rejection) => {
                debug!(%date, ?rejection, slot = %slot, "slot selection rejected");
                Outcome::Rejected(rejection)
            }
        };
        Ok(SlotSelection {
            outcome,
            counts: store.slot_counts(date),
        })
    }
}
