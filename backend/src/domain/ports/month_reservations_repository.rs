//! Port for durable per-month reservation blobs.
//!
//! One blob per month is the unit of persistence and of cross-process
//! consistency: a flush fully replaces the stored blob (last writer wins),
//! and [`Revision`] values let a session notice that another process
//! replaced it.

use std::fmt;

use crate::domain::{MonthKey, MonthReservations};

use super::define_port_error;

/// Opaque fingerprint of one stored blob.
///
/// Two equal revisions mean the stored bytes are identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    /// Wrap an adapter-computed fingerprint.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl AsRef<str> for Revision {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Result of loading one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMonth {
    /// Loaded reservations; empty when the blob is absent or unreadable.
    pub reservations: MonthReservations,
    /// Fingerprint of the blob that was read; `None` when nothing is stored.
    pub revision: Option<Revision>,
}

impl StoredMonth {
    /// Empty reservations with no stored blob behind them.
    #[must_use]
    pub const fn absent(month: MonthKey) -> Self {
        Self {
            reservations: MonthReservations::new(month),
            revision: None,
        }
    }
}

define_port_error! {
    /// Errors raised when a month blob cannot be written.
    pub enum MonthReservationsRepositoryError {
        /// The blob could not be serialised.
        Encode { month: String, message: String } =>
            "failed to encode reservations for {month}: {message}",
        /// The storage medium rejected the write.
        Write { month: String, message: String } =>
            "failed to write reservations for {month}: {message}",
    }
}

/// Durable storage of one blob per month.
///
/// Loading never fails: absent, corrupt or unreadable blobs yield empty
/// reservations, and adapters log what they recovered from.
#[cfg_attr(test, mockall::automock)]
pub trait MonthReservationsRepository {
    /// Read the stored blob for `month`.
    fn load(&self, month: MonthKey) -> StoredMonth;

    /// Replace the stored blob for the reservations' month.
    ///
    /// Returns the revision of the blob just written.
    fn flush(
        &self,
        reservations: &MonthReservations,
    ) -> Result<Revision, MonthReservationsRepositoryError>;

    /// Fingerprint of the blob currently stored for `month`, if any.
    fn current_revision(&self, month: MonthKey) -> Option<Revision>;
}
