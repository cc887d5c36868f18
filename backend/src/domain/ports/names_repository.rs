//! Port for the durable list of known participants.

use crate::domain::{Person, PersonId};

use super::define_port_error;

define_port_error! {
    /// Errors raised when participant data cannot be written.
    pub enum NamesRepositoryError {
        /// The names list could not be serialised.
        Encode { message: String } =>
            "failed to encode names: {message}",
        /// The storage medium rejected the write.
        Write { key: String, message: String } =>
            "failed to write {key}: {message}",
    }
}

/// Durable storage for known names and the last-selected participant.
///
/// Reads recover locally: corrupt or missing data reads as empty.
#[cfg_attr(test, mockall::automock)]
pub trait NamesRepository {
    /// Stored participants in their persisted order.
    fn load_names(&self) -> Vec<Person>;

    /// Replace the stored participant list.
    fn save_names(&self, people: &[Person]) -> Result<(), NamesRepositoryError>;

    /// Id remembered as the current actor, if any.
    fn load_last_selected(&self) -> Option<PersonId>;

    /// Remember `id` as the current actor.
    fn save_last_selected(&self, id: &PersonId) -> Result<(), NamesRepositoryError>;
}

/// Repository that stores nothing.
///
/// Use it where names persistence is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNamesRepository;

impl NamesRepository for FixtureNamesRepository {
    fn load_names(&self) -> Vec<Person> {
        Vec::new()
    }

    fn save_names(&self, _people: &[Person]) -> Result<(), NamesRepositoryError> {
        Ok(())
    }

    fn load_last_selected(&self) -> Option<PersonId> {
        None
    }

    fn save_last_selected(&self, _id: &PersonId) -> Result<(), NamesRepositoryError> {
        Ok(())
    }
}
