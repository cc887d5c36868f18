//! JSON shape of the participant list: `[{"id": "...", "name": "..."}]`.
//!
//! The same shape is served by the remote seed, so the HTTP name source
//! reuses [`decode_people`].

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Person, PersonId, PersonName};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PersonDocument {
    id: String,
    name: String,
}

impl From<&Person> for PersonDocument {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id().to_string(),
            name: person.name().to_string(),
        }
    }
}

impl PersonDocument {
    fn into_person(self) -> Option<Person> {
        let id = PersonId::new(self.id.as_str()).ok()?;
        let name = PersonName::new(&self.name).ok()?;
        Some(Person::new(id, name))
    }
}

/// Serialise `people` in order.
pub(crate) fn encode_people(people: &[Person]) -> serde_json::Result<String> {
    let documents: Vec<PersonDocument> = people.iter().map(PersonDocument::from).collect();
    serde_json::to_string_pretty(&documents)
}

/// Parse a participant list, skipping records with a blank id or name.
///
/// # Errors
///
/// Returns the JSON error when the payload is not an array of records.
pub(crate) fn decode_people(raw: &str) -> serde_json::Result<Vec<Person>> {
    let documents: Vec<PersonDocument> = serde_json::from_str(raw)?;
    Ok(documents
        .into_iter()
        .filter_map(|document| {
            let label = document.id.clone();
            let person = document.into_person();
            if person.is_none() {
                warn!(id = %label, "dropping participant with blank id or name");
            }
            person
        })
        .collect())
}
