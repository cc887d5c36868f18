//! Remote participant list adapters.
//!
//! This module provides a thin HTTP implementation of the `NameSource`
//! port.

mod http_source;

pub use http_source::HttpNameSource;
