//! Weekday lunch reservation engine.
//!
//! People register for lunch on the weekdays of a calendar month: a
//! vegetarian flag plus one of two time slots. The crate is split
//! hexagonally:
//!
//! - [`domain`] holds the engine: identity registry, reservation store,
//!   edit-window policy, selection controller, persistence sync and the
//!   per-month [`domain::CanteenSession`] tying them together.
//! - [`domain::ports`] declares the storage, name-source and publishing
//!   boundaries.
//! - [`outbound`] implements those ports against JSON files, HTTP and the
//!   GitHub contents API.
//! - [`settings`] loads layered configuration.

pub mod domain;
pub mod outbound;
pub mod settings;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
