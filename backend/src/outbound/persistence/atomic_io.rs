//! Atomic file replacement inside a capability directory.
//!
//! Blobs are written to a hidden temporary file next to the target, synced,
//! then renamed over it. Readers in other processes therefore see either the
//! previous blob or the new one, never a torn write.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::fs::{Dir, OpenOptions};
use thiserror::Error;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Failure to replace a blob.
#[derive(Debug, Error)]
#[error("failed to write {path}: {message}")]
pub struct AtomicWriteError {
    /// File that could not be written.
    pub path: Utf8PathBuf,
    /// Underlying cause.
    pub message: String,
}

impl AtomicWriteError {
    fn new(path: &Utf8Path, message: &impl fmt::Display) -> Self {
        Self {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

/// Replace `path` inside `dir` with `contents`.
///
/// # Errors
///
/// Returns [`AtomicWriteError`] when `path` is not a plain file name or any
/// filesystem step fails. The temporary file is removed on failure.
pub(crate) fn write_atomic(
    dir: &Dir,
    path: &Utf8Path,
    contents: &str,
) -> Result<(), AtomicWriteError> {
    let mut components = path.components();
    let (Some(Utf8Component::Normal(file_name)), None) = (components.next(), components.next())
    else {
        return Err(AtomicWriteError::new(path, &"blob path must be a file name"));
    };
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(
        ".{file_name}.tmp.{}.{suffix}.{counter}",
        std::process::id()
    );

    write_temp(dir, &tmp_name, contents).map_err(|err| {
        discard_temp(dir, &tmp_name);
        AtomicWriteError::new(&path.with_file_name(&tmp_name), &err)
    })?;
    replace_target(dir, &tmp_name, file_name).map_err(|err| {
        discard_temp(dir, &tmp_name);
        AtomicWriteError::new(path, &err)
    })?;
    sync_directory(dir);
    Ok(())
}

fn write_temp(dir: &Dir, tmp_name: &str, contents: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

#[cfg(windows)]
fn replace_target(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    match dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(not(windows))]
fn replace_target(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target_name)
}

fn discard_temp(dir: &Dir, tmp_name: &str) {
    if dir.remove_file(tmp_name).is_err() {
        // Already gone or never created.
    }
}

fn sync_directory(dir: &Dir) {
    if dir.open(".").and_then(|handle| handle.sync_all()).is_err() {
        // Directory sync is best effort.
    }
}
