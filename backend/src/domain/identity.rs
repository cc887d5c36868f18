//! Identity registry: the set of known participants.
//!
//! The registry only grows. Names are unique case-insensitively: asking for
//! an existing name in any casing returns the existing person instead of
//! creating a duplicate.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::ports::{NameSource, NamesRepository, NamesRepositoryError};
use super::{NameLookup, Person, PersonId, PersonName, PersonValidationError};

/// Default cap on name suggestions.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 20;

/// Errors raised by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The supplied name was blank.
    #[error(transparent)]
    InvalidName(#[from] PersonValidationError),
    /// The id does not belong to a known person.
    #[error("unknown person id {id}")]
    UnknownPerson {
        /// The unresolved id.
        id: PersonId,
    },
    /// The change could not be persisted; in-memory state is unchanged.
    #[error(transparent)]
    Persistence(#[from] NamesRepositoryError),
}

/// Fetch the seed participant list, or `None` when the source fails.
///
/// A failing source is logged and the registry falls back to the locally
/// persisted names.
pub async fn fetch_seed<S: NameSource + ?Sized>(source: &S) -> Option<Vec<Person>> {
    match source.fetch_names().await {
        Ok(people) => {
            info!(count = people.len(), "remote names loaded");
            Some(people)
        }
        Err(error) => {
            warn!(%error, "remote names unavailable; using local names");
            None
        }
    }
}

/// Known participants plus the remembered current actor.
pub struct IdentityRegistry<N> {
    people: Vec<Person>,
    last_selected: Option<PersonId>,
    suggestion_limit: usize,
    repository: Arc<N>,
}

impl<N: NamesRepository> IdentityRegistry<N> {
    /// Build the registry from persisted names and an optional external
    /// seed.
    ///
    /// Seed entries come first in their given order; persisted entries not
    /// already present (by id, then case-insensitive name) follow. A
    /// remembered actor that no longer resolves is forgotten.
    pub fn load(repository: Arc<N>, seed: Option<Vec<Person>>, suggestion_limit: usize) -> Self {
        let stored = repository.load_names();
        let mut people: Vec<Person> = Vec::with_capacity(stored.len());
        for person in seed.into_iter().flatten().chain(stored) {
            let duplicate = people.iter().any(|known| {
                known.id() == person.id() || known.name().matches(person.name().as_ref())
            });
            if duplicate {
                debug!(id = %person.id(), "skipping duplicate participant");
            } else {
                people.push(person);
            }
        }

        let last_selected = repository
            .load_last_selected()
            .filter(|id| people.iter().any(|person| person.id() == id));

        info!(participants = people.len(), "identity registry loaded");
        Self {
            people,
            last_selected,
            suggestion_limit: suggestion_limit.max(1),
            repository,
        }
    }

    /// Known participants in registration order.
    #[must_use]
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    /// Person with `id`, if known.
    #[must_use]
    pub fn get(&self, id: &PersonId) -> Option<&Person> {
        self.people.iter().find(|person| person.id() == id)
    }

    /// Case-insensitive substring search, capped at the suggestion limit.
    ///
    /// A blank query yields no suggestions.
    #[must_use]
    pub fn find_by_name(&self, query: &str) -> Vec<&Person> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.people
            .iter()
            .filter(|person| person.name().contains_lowercase(&needle))
            .take(self.suggestion_limit)
            .collect()
    }

    /// Return the person named `name` (any casing), creating and persisting
    /// a new one when nobody matches.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidName`] for a blank name and
    /// [`IdentityError::Persistence`] when the grown list cannot be stored;
    /// the registry is left unchanged in that case.
    pub fn find_or_create(&mut self, name: &str) -> Result<Person, IdentityError> {
        let wanted = PersonName::new(name)?;
        if let Some(existing) = self
            .people
            .iter()
            .find(|person| person.name().matches(wanted.as_ref()))
        {
            return Ok(existing.clone());
        }

        let person = Person::new(PersonId::random(), wanted);
        let mut grown = self.people.clone();
        grown.push(person.clone());
        self.repository.save_names(&grown)?;
        self.people = grown;
        info!(id = %person.id(), "participant registered");
        Ok(person)
    }

    /// Remember `id` as the current actor across sessions.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::UnknownPerson`] for ids outside the registry
    /// and [`IdentityError::Persistence`] when the choice cannot be stored.
    pub fn set_last_selected(&mut self, id: &PersonId) -> Result<(), IdentityError> {
        if self.get(id).is_none() {
            return Err(IdentityError::UnknownPerson { id: id.clone() });
        }
        if let Err(error) = self.repository.save_last_selected(id) {
            warn!(%error, "failed to remember selected participant");
            return Err(error.into());
        }
        self.last_selected = Some(id.clone());
        Ok(())
    }

    /// The remembered actor, if any.
    #[must_use]
    pub fn last_selected(&self) -> Option<&Person> {
        self.last_selected.as_ref().and_then(|id| self.get(id))
    }
}

impl<N: NamesRepository> NameLookup for IdentityRegistry<N> {
    fn display_name(&self, id: &PersonId) -> Option<&str> {
        self.get(id).map(|person| person.name().as_ref())
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::always;
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{
        FixtureNamesRepository, MockNameSource, MockNamesRepository, NameSourceError,
    };

    fn person(id: &str, name: &str) -> Person {
        Person::new(
            PersonId::new(id).expect("valid id"),
            PersonName::new(name).expect("valid name"),
        )
    }

    fn stored_repo(people: Vec<Person>, last: Option<&str>) -> MockNamesRepository {
        let mut repo = MockNamesRepository::new();
        repo.expect_load_names().return_const(people);
        let last_id = last.map(|id| PersonId::new(id).expect("valid id"));
        repo.expect_load_last_selected().return_const(last_id);
        repo
    }

    fn fixture_registry(people: Vec<Person>) -> IdentityRegistry<FixtureNamesRepository> {
        IdentityRegistry::load(Arc::new(FixtureNamesRepository), Some(people), 2)
    }

    #[test]
    fn seed_comes_first_and_local_additions_follow() {
        let repo = stored_repo(
            vec![person("u-1", "dupont alice"), person("u-9", "Local Only")],
            None,
        );
        let seed = vec![person("u-1", "Dupont Alice"), person("u-2", "Martin Paul")];

        let registry = IdentityRegistry::load(Arc::new(repo), Some(seed), 20);
        let names: Vec<&str> = registry
            .people()
            .iter()
            .map(|p| p.name().as_ref())
            .collect();

        assert_eq!(names, ["Dupont Alice", "Martin Paul", "Local Only"]);
    }

    #[test]
    fn forgets_a_last_selected_id_that_no_longer_resolves() {
        let repo = stored_repo(vec![person("u-1", "Alice")], Some("u-404"));
        let registry = IdentityRegistry::load(Arc::new(repo), None, 20);
        assert!(registry.last_selected().is_none());
    }

    #[rstest]
    #[case("", 0)]
    #[case("a", 2)]
    #[case("NGUYEN", 1)]
    #[case("zz", 0)]
    fn suggestions_are_case_insensitive_and_capped(#[case] query: &str, #[case] hits: usize) {
        let registry = fixture_registry(vec![
            person("u-1", "Dupont Alice"),
            person("u-2", "Martin Paul"),
            person("u-3", "Nguyen Lea"),
        ]);
        assert_eq!(registry.find_by_name(query).len(), hits);
    }

    #[test]
    fn find_or_create_returns_existing_person_for_any_casing() {
        let mut repo = stored_repo(vec![person("u-3", "Nguyen Lea")], None);
        repo.expect_save_names().never();
        let mut registry = IdentityRegistry::load(Arc::new(repo), None, 20);

        let found = registry.find_or_create("  nguyen LEA ").expect("existing");

        assert_eq!(found.id().as_ref(), "u-3");
        assert_eq!(registry.people().len(), 1);
    }

    #[test]
    fn find_or_create_persists_new_people() {
        let mut repo = stored_repo(vec![person("u-1", "Alice")], None);
        repo.expect_save_names()
            .withf(|people| people.len() == 2)
            .times(1)
            .returning(|_| Ok(()));
        let mut registry = IdentityRegistry::load(Arc::new(repo), None, 20);

        let created = registry.find_or_create("Bob").expect("created");

        assert_eq!(created.name().as_ref(), "Bob");
        assert_eq!(registry.get(created.id()), Some(&created));
    }

    #[test]
    fn failed_persistence_leaves_the_registry_unchanged() {
        let mut repo = stored_repo(Vec::new(), None);
        repo.expect_save_names()
            .with(always())
            .returning(|_| Err(NamesRepositoryError::write("names.json", "read-only")));
        let mut registry = IdentityRegistry::load(Arc::new(repo), None, 20);

        let result = registry.find_or_create("Bob");

        assert!(matches!(result, Err(IdentityError::Persistence(_))));
        assert!(registry.people().is_empty());
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut registry = fixture_registry(Vec::new());
        assert!(matches!(
            registry.find_or_create("   "),
            Err(IdentityError::InvalidName(PersonValidationError::EmptyName))
        ));
    }

    #[test]
    fn last_selected_round_trips_through_the_registry() {
        let mut registry = fixture_registry(vec![person("u-1", "Alice")]);
        let id = PersonId::new("u-1").expect("valid id");

        registry.set_last_selected(&id).expect("known id");

        assert_eq!(
            registry.last_selected().map(|p| p.name().as_ref()),
            Some("Alice")
        );
    }

    #[test]
    fn selecting_an_unknown_id_fails() {
        let mut registry = fixture_registry(Vec::new());
        let id = PersonId::new("u-404").expect("valid id");
        assert!(matches!(
            registry.set_last_selected(&id),
            Err(IdentityError::UnknownPerson { .. })
        ));
    }

    #[tokio::test]
    async fn seed_is_taken_from_a_reachable_source() {
        let mut source = MockNameSource::new();
        source
            .expect_fetch_names()
            .times(1)
            .returning(|| Ok(vec![person("u-2", "Martin Paul")]));

        let seed = fetch_seed(&source).await.expect("seed fetched");

        let registry = fixture_registry(seed);
        assert_eq!(registry.people().len(), 1);
        assert!(registry.get(&PersonId::new("u-2").expect("valid id")).is_some());
    }

    #[rstest]
    #[case(NameSourceError::status(404_u16))]
    #[case(NameSourceError::decode("expected an array"))]
    #[tokio::test]
    async fn unreachable_source_falls_back_to_local_names(#[case] error: NameSourceError) {
        let mut source = MockNameSource::new();
        source
            .expect_fetch_names()
            .times(1)
            .returning(move || Err(error.clone()));

        let seed = fetch_seed(&source).await;
        assert!(seed.is_none());

        let repo = stored_repo(vec![person("u-9", "Local Only")], None);
        let registry = IdentityRegistry::load(Arc::new(repo), seed, 20);
        assert_eq!(registry.people().len(), 1);
    }
}
