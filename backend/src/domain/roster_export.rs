//! Plain-text rosters for printing or display.

use chrono::NaiveDate;

use super::{NameLookup, ReservationStore, RosterCategory};

/// Marker printed in place of an empty roster.
pub const NONE_MARKER: &str = "(none)";

/// One category's roster for a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    /// Category the names belong to.
    pub category: RosterCategory,
    /// Names, first-registered first.
    pub names: Vec<String>,
}

impl Roster {
    fn render(&self, heading: &str, out: &mut String) {
        out.push_str(&format!("{heading} ({})\n", self.names.len()));
        if self.names.is_empty() {
            out.push_str(NONE_MARKER);
            out.push('\n');
        }
        for name in &self.names {
            out.push_str(name);
            out.push('\n');
        }
    }
}

/// The three rosters of one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRosters {
    /// Date the rosters describe.
    pub date: NaiveDate,
    /// Vegetarian, 11:45 and 12:30 rosters, in that order.
    pub rosters: Vec<Roster>,
}

impl DayRosters {
    /// Collect every category for `date`.
    #[must_use]
    pub fn collect(store: &ReservationStore, date: NaiveDate, names: &impl NameLookup) -> Self {
        let rosters = RosterCategory::ALL
            .iter()
            .map(|&category| Roster {
                category,
                names: store.roster_for(date, category, names),
            })
            .collect();
        Self { date, rosters }
    }

    /// Roster for `category`.
    #[must_use]
    pub fn get(&self, category: RosterCategory) -> Option<&Roster> {
        self.rosters.iter().find(|roster| roster.category == category)
    }

    /// Sections headed `Label (N)`, one name per line, separated by blank
    /// lines.
    ///
    /// # Examples
    ///
    /// ```
    /// use canteen::domain::{DayRosters, Roster, RosterCategory};
    /// use chrono::NaiveDate;
    ///
    /// let rosters = DayRosters {
    ///     date: NaiveDate::from_ymd_opt(2025, 12, 2).expect("valid date"),
    ///     rosters: vec![
    ///         Roster { category: RosterCategory::Vegetarian, names: vec!["Alice".into()] },
    ///         Roster { category: RosterCategory::Slot1145, names: Vec::new() },
    ///     ],
    /// };
    ///
    /// assert_eq!(
    ///     rosters.to_plain_text(),
    ///     "2025-12-02\n\nVegetarian (1)\nAlice\n\n11:45 (0)\n(none)\n",
    /// );
    /// ```
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        let mut out = format!("{}\n", self.date);
        for roster in &self.rosters {
            out.push('\n');
            roster.render(roster.category.label(), &mut out);
        }
        out
    }
}

/// Print sheet for a single category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSheet {
    /// Sheet heading, e.g. `Vegetarian - 2025-12-02`.
    pub title: String,
    /// Names, first-registered first.
    pub names: Vec<String>,
}

impl RosterSheet {
    /// Sheet for `category` on `date`.
    #[must_use]
    pub fn collect(
        store: &ReservationStore,
        date: NaiveDate,
        category: RosterCategory,
        names: &impl NameLookup,
    ) -> Self {
        Self {
            title: format!("{} - {date}", category.label()),
            names: store.roster_for(date, category, names),
        }
    }

    /// Title, `N registered`, then the names or the none marker.
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        let mut out = format!("{}\n{} registered\n", self.title, self.names.len());
        if self.names.is_empty() {
            out.push_str(NONE_MARKER);
            out.push('\n');
        }
        for name in &self.names {
            out.push_str(name);
            out.push('\n');
        }
        out
    }
}
