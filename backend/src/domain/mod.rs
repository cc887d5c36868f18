//! Reservation engine primitives and services.
//!
//! Purpose: model who eats, when, and whether they still may change their
//! mind. Everything here is synchronous and clock-injected; adapters behind
//! [`ports`] supply storage, the remote name seed and remote publishing.
//!
//! Public surface:
//! - Person, PersonId, PersonName — validated participant identity.
//! - MonthKey — a calendar month and its bookable weekdays.
//! - Choice, LunchSlot, RosterCategory — one person's pick for one day.
//! - MonthReservations, ReservationStore — the month blob and its owner.
//! - EditWindow — cutoff policy for past days and today.
//! - IdentityRegistry — the growing set of known participants.
//! - SelectionController — guarded mutation entry point.
//! - PersistenceSync — load, flush and external-change detection.
//! - DayRosters, RosterSheet — plain-text exports.
//! - CanteenSession — one month's engine as driven by a presentation layer.

pub mod ports;

mod choice;
mod edit_window;
mod identity;
mod month;
mod person;
mod reservation_store;
mod reservations;
mod roster_export;
mod selection;
mod session;
mod sync;

pub use self::choice::{Choice, LunchSlot, ParseChoiceError, RosterCategory};
pub use self::edit_window::{DEFAULT_CUTOFF_HOUR, EditWindow, InvalidCutoffHour};
pub use self::identity::{DEFAULT_SUGGESTION_LIMIT, IdentityError, IdentityRegistry, fetch_seed};
pub use self::month::{MonthKey, ParseMonthKeyError, is_weekday};
pub use self::person::{Person, PersonId, PersonName, PersonValidationError};
pub use self::reservation_store::{DayCounts, NameLookup, ReservationStore, SlotCounts};
pub use self::reservations::{DayEntry, MonthReservations, ReservationError};
pub use self::roster_export::{DayRosters, NONE_MARKER, Roster, RosterSheet};
pub use self::selection::{
    GuardRejection, Outcome, SelectionController, SlotSelection, VegetarianToggle,
};
pub use self::session::{CanteenSession, DayOverview, PublishError, SaveStatus};
pub use self::sync::{ChangeListener, ExternalChange, PersistenceSync};
