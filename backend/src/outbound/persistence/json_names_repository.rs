//! File-backed names repository: `names.json` plus `last-person-id`.

use tracing::warn;

use crate::domain::ports::{NamesRepository, NamesRepositoryError};
use crate::domain::{Person, PersonId};

use super::DataDir;
use super::names_document::{decode_people, encode_people};

/// File holding the participant list.
pub const NAMES_FILE: &str = "names.json";
/// File holding the last selected person id.
pub const LAST_PERSON_FILE: &str = "last-person-id";

/// Names repository storing JSON in a [`DataDir`].
#[derive(Debug, Clone)]
pub struct JsonFileNamesRepository {
    data: DataDir,
}

impl JsonFileNamesRepository {
    /// Repository over `data`.
    #[must_use]
    pub const fn new(data: DataDir) -> Self {
        Self { data }
    }
}

impl NamesRepository for JsonFileNamesRepository {
    fn load_names(&self) -> Vec<Person> {
        let Some(raw) = self.data.read(NAMES_FILE) else {
            return Vec::new();
        };
        decode_people(&raw).unwrap_or_else(|err| {
            warn!(file = NAMES_FILE, error = %err, "malformed names list replaced by empty list");
            Vec::new()
        })
    }

    fn save_names(&self, people: &[Person]) -> Result<(), NamesRepositoryError> {
        let encoded =
            encode_people(people).map_err(|err| NamesRepositoryError::encode(err.to_string()))?;
        self.data
            .write(NAMES_FILE, &encoded)
            .map_err(|err| NamesRepositoryError::write(NAMES_FILE, err.to_string()))
    }

    fn load_last_selected(&self) -> Option<PersonId> {
        let raw = self.data.read(LAST_PERSON_FILE)?;
        PersonId::new(raw.trim()).ok()
    }

    fn save_last_selected(&self, id: &PersonId) -> Result<(), NamesRepositoryError> {
        self.data
            .write(LAST_PERSON_FILE, id.as_ref())
            .map_err(|err| NamesRepositoryError::write(LAST_PERSON_FILE, err.to_string()))
    }
}
