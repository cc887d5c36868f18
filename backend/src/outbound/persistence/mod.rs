//! JSON-file persistence adapters.
//!
//! Every blob lives in one data directory opened through `cap-std`:
//!
//! - `names.json` holds the ordered participant list.
//! - `last-person-id` holds the remembered actor.
//! - `reservations-YYYY-MM.json` holds one month each.
//!
//! Writes replace whole files atomically. Reads never fail: missing or
//! malformed blobs load as empty and the recovery is logged. Serialisation
//! shapes are private to this module and translated into domain types on
//! the way in and out.

mod atomic_io;
mod data_dir;
mod json_month_repository;
mod json_names_repository;
mod month_document;
mod names_document;
mod revision;

pub use self::atomic_io::AtomicWriteError;
pub use self::data_dir::DataDir;
pub use self::json_month_repository::{JsonFileMonthRepository, month_file_name};
pub use self::json_names_repository::{JsonFileNamesRepository, LAST_PERSON_FILE, NAMES_FILE};
pub(crate) use self::month_document::encode as encode_month;
pub(crate) use self::names_document::decode_people;
