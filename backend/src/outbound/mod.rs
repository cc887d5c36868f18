//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: JSON blobs in a local data directory
//! - **names**: the published participant list, fetched over HTTP
//! - **publish**: optional write-back of month blobs to a GitHub repository
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod names;
pub mod persistence;
pub mod publish;
