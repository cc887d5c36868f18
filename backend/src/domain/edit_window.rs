//! Edit-window policy: which dates may still change.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use thiserror::Error;

/// Default hour (local time) from which today's choices lock.
pub const DEFAULT_CUTOFF_HOUR: u32 = 10;

/// Error returned for a cutoff hour outside `0..=23`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cutoff hour must be between 0 and 23, got {hour}")]
pub struct InvalidCutoffHour {
    /// The rejected hour.
    pub hour: u32,
}

/// Decides whether a date is still mutable at a given instant.
///
/// Past dates are locked. Today locks for the whole cutoff hour onward;
/// with the default cutoff, 09:59:59 is editable and 10:00:00 is not.
/// Future dates are always editable. The policy holds no clock: callers
/// pass "now" on every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditWindow {
    cutoff_hour: u32,
}

impl EditWindow {
    /// Policy locking today from `cutoff_hour` onward.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCutoffHour`] when `cutoff_hour > 23`.
    pub const fn new(cutoff_hour: u32) -> Result<Self, InvalidCutoffHour> {
        if cutoff_hour > 23 {
            return Err(InvalidCutoffHour { hour: cutoff_hour });
        }
        Ok(Self { cutoff_hour })
    }

    /// The configured cutoff hour.
    #[must_use]
    pub const fn cutoff_hour(&self) -> u32 {
        self.cutoff_hour
    }

    /// Whether `date` may be mutated at local time `now`.
    ///
    /// # Examples
    ///
    /// ```
    /// use canteen::domain::EditWindow;
    /// use chrono::NaiveDate;
    ///
    /// let window = EditWindow::default();
    /// let today = NaiveDate::from_ymd_opt(2025, 12, 2).expect("valid date");
    /// let before = today.and_hms_opt(9, 59, 59).expect("valid time");
    /// let at_cutoff = today.and_hms_opt(10, 0, 0).expect("valid time");
    ///
    /// assert!(window.is_editable(today, before));
    /// assert!(!window.is_editable(today, at_cutoff));
    /// ```
    #[must_use]
    pub fn is_editable(&self, date: NaiveDate, now: NaiveDateTime) -> bool {
        let today = now.date();
        if date < today {
            return false;
        }
        if date == today {
            return now.hour() < self.cutoff_hour;
        }
        true
    }
}

impl Default for EditWindow {
    fn default() -> Self {
        Self {
            cutoff_hour: DEFAULT_CUTOFF_HOUR,
        }
    }
}
