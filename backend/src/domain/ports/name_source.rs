//! Driven port for the externally published participant list.
//!
//! The list seeds the identity registry once at startup. It is the only
//! asynchronous boundary of the engine; reservation mutation never waits
//! on it.

use async_trait::async_trait;

use crate::domain::Person;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while fetching the remote participant list.
    pub enum NameSourceError {
        /// Network transport failed or timed out.
        Transport { message: String } =>
            "name source transport failed: {message}",
        /// The source answered with a non-success status.
        Status { status: u16 } =>
            "name source answered with status {status}",
        /// The payload was not an array of `{id, name}` records.
        Decode { message: String } =>
            "name source payload invalid: {message}",
    }
}

/// Source of the seed participant list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NameSource: Send + Sync {
    /// Fetch the ordered participant list.
    async fn fetch_names(&self) -> Result<Vec<Person>, NameSourceError>;
}
