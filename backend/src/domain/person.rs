//! Participant identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors returned when constructing identity values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersonValidationError {
    /// The id was empty or whitespace.
    #[error("person id must not be empty")]
    EmptyId,
    /// The id carried leading or trailing whitespace.
    #[error("person id must not contain surrounding whitespace")]
    PaddedId,
    /// The name was empty once trimmed.
    #[error("person name must not be empty")]
    EmptyName,
}

/// Opaque participant identifier.
///
/// Ids created by this crate are random UUIDs, but any non-empty string is
/// accepted so name lists produced elsewhere (`u-1`, `u-1733400000000`)
/// load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonId(String);

impl PersonId {
    /// Validate and construct a [`PersonId`].
    ///
    /// # Errors
    ///
    /// Returns [`PersonValidationError::EmptyId`] for blank input and
    /// [`PersonValidationError::PaddedId`] when the id is not trimmed.
    ///
    /// # Examples
    ///
    /// ```
    /// use canteen::domain::PersonId;
    ///
    /// let id = PersonId::new("u-1").expect("valid id");
    /// assert_eq!(id.as_ref(), "u-1");
    /// assert!(PersonId::new("  ").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, PersonValidationError> {
        Self::from_owned(id.into())
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    fn from_owned(id: String) -> Result<Self, PersonValidationError> {
        if id.trim().is_empty() {
            return Err(PersonValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(PersonValidationError::PaddedId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for PersonId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PersonId> for String {
    fn from(value: PersonId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonId {
    type Error = PersonValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Human readable participant name, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Trim and validate a participant name.
    ///
    /// # Errors
    ///
    /// Returns [`PersonValidationError::EmptyName`] when nothing remains
    /// after trimming.
    pub fn new(name: impl AsRef<str>) -> Result<Self, PersonValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PersonValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Case-insensitive equality against raw input.
    ///
    /// # Examples
    ///
    /// ```
    /// use canteen::domain::PersonName;
    ///
    /// let name = PersonName::new("Dupont Alice").expect("valid name");
    /// assert!(name.matches(" dupont alice "));
    /// assert!(!name.matches("Dupont"));
    /// ```
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }

    /// Case-insensitive substring test; `needle` must already be lowercase.
    pub(crate) fn contains_lowercase(&self, needle: &str) -> bool {
        self.0.to_lowercase().contains(needle)
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = PersonValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A registered participant.
///
/// ## Invariants
/// - `id` never changes once the person exists.
/// - `name` is unique case-insensitively within an
///   [`IdentityRegistry`](super::IdentityRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    id: PersonId,
    name: PersonName,
}

impl Person {
    /// Build a person from validated parts.
    #[must_use]
    pub const fn new(id: PersonId, name: PersonName) -> Self {
        Self { id, name }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> &PersonId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &PersonName {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", PersonValidationError::EmptyId)]
    #[case("   ", PersonValidationError::EmptyId)]
    #[case(" u-1", PersonValidationError::PaddedId)]
    fn rejects_invalid_ids(#[case] raw: &str, #[case] expected: PersonValidationError) {
        assert_eq!(PersonId::new(raw), Err(expected));
    }

    #[test]
    fn random_ids_are_distinct() {
        assert_ne!(PersonId::random(), PersonId::random());
    }

    #[test]
    fn names_are_trimmed() {
        let name = PersonName::new("  Martin Paul ").expect("valid name");
        assert_eq!(name.as_ref(), "Martin Paul");
    }

    #[rstest]
    #[case("")]
    #[case("\t \n")]
    fn rejects_blank_names(#[case] raw: &str) {
        assert_eq!(PersonName::new(raw), Err(PersonValidationError::EmptyName));
    }

    #[rstest]
    #[case("nguyen", true)]
    #[case("LEA", true)]
    #[case("marie", false)]
    fn substring_match_ignores_case(#[case] needle: &str, #[case] expected: bool) {
        let name = PersonName::new("Nguyen Lea").expect("valid name");
        assert_eq!(name.contains_lowercase(&needle.to_lowercase()), expected);
    }

    #[test]
    fn person_deserializes_from_stored_shape() {
        let person: Person =
            serde_json::from_str(r#"{"id":"u-2","name":"Martin Paul"}"#).expect("deserialize");
        assert_eq!(person.id().as_ref(), "u-2");
        assert_eq!(person.name().as_ref(), "Martin Paul");
    }

    #[test]
    fn person_rejects_blank_stored_name() {
        let result = serde_json::from_str::<Person>(r#"{"id":"u-2","name":"  "}"#);
        assert!(result.is_err());
    }
}
