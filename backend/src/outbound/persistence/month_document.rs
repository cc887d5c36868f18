//! JSON shape of a month blob and its translation to domain types.
//!
//! ```json
//! { "2025-12-02": { "u-1": { "vegetarian": true, "slot": "Slot1145" } } }
//! ```
//!
//! Person keys keep their stored order, which is the roster order.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Choice, LunchSlot, MonthKey, MonthReservations, PersonId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum SlotDocument {
    Slot1145,
    Slot1230,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct ChoiceDocument {
    #[serde(default)]
    vegetarian: bool,
    #[serde(default)]
    slot: Option<SlotDocument>,
}

type MonthDocument = BTreeMap<String, IndexMap<String, ChoiceDocument>>;

impl From<Choice> for ChoiceDocument {
    fn from(choice: Choice) -> Self {
        let slot = match choice.slot {
            LunchSlot::None => None,
            LunchSlot::Slot1145 => Some(SlotDocument::Slot1145),
            LunchSlot::Slot1230 => Some(SlotDocument::Slot1230),
        };
        Self {
            vegetarian: choice.vegetarian,
            slot,
        }
    }
}

impl From<ChoiceDocument> for Choice {
    fn from(document: ChoiceDocument) -> Self {
        let slot = match document.slot {
            None => LunchSlot::None,
            Some(SlotDocument::Slot1145) => LunchSlot::Slot1145,
            Some(SlotDocument::Slot1230) => LunchSlot::Slot1230,
        };
        Self {
            vegetarian: document.vegetarian,
            slot,
        }
    }
}

/// Serialise `reservations` as pretty-printed JSON.
pub(crate) fn encode(reservations: &MonthReservations) -> serde_json::Result<String> {
    let document: MonthDocument = reservations
        .days()
        .map(|(date, day)| {
            let people = day
                .iter()
                .map(|(id, choice)| (id.to_string(), ChoiceDocument::from(*choice)))
                .collect();
            (date.format("%Y-%m-%d").to_string(), people)
        })
        .collect();
    serde_json::to_string_pretty(&document)
}

/// Parse a stored blob for `month`.
///
/// A blob that is not the expected shape loads as empty. Dates that are not
/// weekdays of `month`, invalid person ids and "no reservation" entries are
/// dropped individually.
pub(crate) fn decode(month: MonthKey, raw: &str) -> MonthReservations {
    let mut reservations = MonthReservations::new(month);
    let document: MonthDocument = match serde_json::from_str(raw) {
        Ok(document) => document,
        Err(err) => {
            warn!(%month, error = %err, "malformed reservations blob replaced by empty month");
            return reservations;
        }
    };

    for (raw_date, people) in document {
        let Some(date) = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d")
            .ok()
            .filter(|date| month.contains_weekday(*date))
        else {
            warn!(%month, date = %raw_date, "dropping date outside the month's weekdays");
            continue;
        };
        for (raw_id, stored) in people {
            let Ok(id) = PersonId::new(raw_id.as_str()) else {
                warn!(%month, id = %raw_id, "dropping invalid person id");
                continue;
            };
            let choice = Choice::from(stored);
            if choice.is_empty() {
                warn!(%month, %date, %id, "dropping empty reservation");
                continue;
            }
            if reservations.insert(date, &id, choice).is_err() {
                warn!(%month, %date, %id, "dropping unbookable reservation");
            }
        }
    }
    reservations
}
