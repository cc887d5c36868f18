//! Capability handle on the directory holding every blob.

use std::io;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use tracing::warn;

use super::atomic_io::{AtomicWriteError, write_atomic};

/// The data directory, opened once and shared by the file repositories.
///
/// All access goes through the capability handle, so blob names cannot
/// escape the directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: Utf8PathBuf,
    dir: Arc<Dir>,
}

impl DataDir {
    /// Open `root`, creating it and its parents when missing.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be created
    /// or opened.
    pub fn open(root: &Utf8Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: root.to_path_buf(),
            dir: Arc::new(dir),
        })
    }

    /// Path the directory was opened from.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Contents of `name`, or `None` when it is absent or unreadable.
    ///
    /// Read failures other than "not found" are logged and treated as
    /// absence.
    pub(crate) fn read(&self, name: &str) -> Option<String> {
        match self.dir.read_to_string(name) {
            Ok(contents) => Some(contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(file = %self.root.join(name), error = %err, "unreadable blob treated as absent");
                None
            }
        }
    }

    /// Atomically replace `name` with `contents`.
    pub(crate) fn write(&self, name: &str, contents: &str) -> Result<(), AtomicWriteError> {
        write_atomic(&self.dir, Utf8Path::new(name), contents)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn utf8(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 temp path")
    }

    #[test]
    fn creates_missing_directories() {
        let temp = TempDir::new().expect("temp dir");
        let nested = utf8(&temp).join("a").join("b");

        let data = DataDir::open(&nested).expect("opened");
        data.write("names.json", "[]").expect("written");

        assert_eq!(data.read("names.json").as_deref(), Some("[]"));
        assert_eq!(data.root(), nested);
    }

    #[test]
    fn missing_blobs_read_as_none() {
        let temp = TempDir::new().expect("temp dir");
        let data = DataDir::open(&utf8(&temp)).expect("opened");
        assert!(data.read("reservations-2025-12.json").is_none());
    }
}
