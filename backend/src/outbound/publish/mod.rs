//! Remote write-back adapters.
//!
//! This module provides a GitHub contents API implementation of the
//! `ReservationPublisher` port.

mod github_contents;

pub use github_contents::{GitHubContentsPublisher, GitHubTarget};
