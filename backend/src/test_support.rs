//! Test utilities for the canteen crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests
//! or with the `test-support` feature.

use std::sync::Mutex;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use mockable::Clock;
use tempfile::TempDir;

use crate::outbound::persistence::DataDir;

pub mod cap_fs {
    //! Capability-safe file helpers for tests.
    //!
    //! The crate forbids direct `std::fs` calls. These helpers let suites
    //! play the part of another process writing the data directory.

    use std::io;

    use camino::Utf8Path;
    use cap_std::{ambient_authority, fs::Dir};

    /// Overwrite `name` inside `dir` with `contents`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use camino::Utf8PathBuf;
    /// use canteen::test_support::cap_fs::{read_file_to_string, write_file};
    ///
    /// let temp = tempfile::TempDir::new()?;
    /// let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8");
    /// write_file(&dir, "names.json", "[]")?;
    /// assert_eq!(read_file_to_string(&dir, "names.json")?, "[]");
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn write_file(dir: &Utf8Path, name: &str, contents: &str) -> io::Result<()> {
        Dir::open_ambient_dir(dir, ambient_authority())?.write(name, contents)
    }

    /// Read `name` inside `dir` as UTF-8.
    pub fn read_file_to_string(dir: &Utf8Path, name: &str) -> io::Result<String> {
        Dir::open_ambient_dir(dir, ambient_authority())?.read_to_string(name)
    }
}

/// Clock reporting a settable local time.
pub struct MutableClock(Mutex<DateTime<Local>>);

impl MutableClock {
    /// Clock frozen at local `raw` (`YYYY-MM-DD HH:MM:SS`).
    ///
    /// # Panics
    ///
    /// Panics when `raw` does not parse or names a non-existent local time.
    #[must_use]
    pub fn at(raw: &str) -> Self {
        Self(Mutex::new(local_time(raw)))
    }

    /// Move the clock to local `raw`.
    ///
    /// # Panics
    ///
    /// Panics when `raw` does not parse or names a non-existent local time.
    pub fn set(&self, raw: &str) {
        *self.lock_clock() = local_time(raw);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Local>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        *self.lock_clock()
    }

    fn utc(&self) -> DateTime<Utc> {
        self.local().with_timezone(&Utc)
    }
}

fn local_time(raw: &str) -> DateTime<Local> {
    let naive = match NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        Ok(naive) => naive,
        Err(error) => panic!("invalid fixture timestamp {raw:?}: {error}"),
    };
    match Local.from_local_datetime(&naive).single() {
        Some(local) => local,
        None => panic!("fixture timestamp {raw:?} is ambiguous in the local zone"),
    }
}

/// A data directory that disappears with the value.
pub struct TempDataDir {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl TempDataDir {
    /// Fresh, empty data directory.
    ///
    /// # Panics
    ///
    /// Panics when the temporary directory cannot be created or its path is
    /// not UTF-8.
    #[must_use]
    pub fn new() -> Self {
        let temp = match TempDir::new() {
            Ok(temp) => temp,
            Err(error) => panic!("temp dir: {error}"),
        };
        let root = match Utf8PathBuf::from_path_buf(temp.path().to_path_buf()) {
            Ok(root) => root,
            Err(path) => panic!("non UTF-8 temp dir {}", path.display()),
        };
        Self { _temp: temp, root }
    }

    /// Path of the directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Open a fresh [`DataDir`] handle, as a separate process would.
    ///
    /// # Panics
    ///
    /// Panics when the directory cannot be opened.
    #[must_use]
    pub fn open(&self) -> DataDir {
        match DataDir::open(&self.root) {
            Ok(data) => data,
            Err(error) => panic!("open data dir: {error}"),
        }
    }
}

impl Default for TempDataDir {
    fn default() -> Self {
        Self::new()
    }
}
