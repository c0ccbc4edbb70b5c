//! Collision-free destination names.
//!
//! A file is never moved onto an existing path. When the desired name is
//! taken, the allocator appends the current time (second granularity) to the
//! file stem, and then an increasing counter if that name is taken as well.
//! Checks are plain existence tests, which is sound because a run is
//! single-threaded.

use chrono::{Local, NaiveDateTime};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Format of the timestamp suffix, e.g. `photo_20240501_132455.jpg`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Resolves destination names inside a target directory.
pub struct PathAllocator;

impl PathAllocator {
    /// Returns a path inside `target_dir` named `file_name`, or a disambiguated
    /// variant of it when that path already exists.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use orisort::path_allocator::PathAllocator;
    /// use std::path::Path;
    ///
    /// let dest = PathAllocator::allocate(Path::new("/photos/Portrait-Photo"), "IMG_0001.jpg");
    /// println!("Moving to {}", dest.display());
    /// ```
    pub fn allocate(target_dir: &Path, file_name: impl AsRef<OsStr>) -> PathBuf {
        Self::allocate_at(target_dir, file_name, Local::now().naive_local())
    }

    /// Like [`PathAllocator::allocate`], with the timestamp supplied by the caller.
    pub fn allocate_at(
        target_dir: &Path,
        file_name: impl AsRef<OsStr>,
        timestamp: NaiveDateTime,
    ) -> PathBuf {
        let file_name = Path::new(file_name.as_ref());
        let candidate = target_dir.join(file_name);
        if !candidate.exists() {
            return candidate;
        }

        // Leading dots belong to the stem, so `.hidden` has no extension.
        let stem = file_name.file_stem().unwrap_or(file_name.as_os_str());
        let extension = file_name.extension();
        let stamp = timestamp.format(TIMESTAMP_FORMAT).to_string();

        let candidate = target_dir.join(build_name(stem, &stamp, None, extension));
        if !candidate.exists() {
            return candidate;
        }

        let mut counter: u64 = 1;
        loop {
            let candidate = target_dir.join(build_name(stem, &stamp, Some(counter), extension));
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Builds `<stem>_<stamp>[_<counter>][.<extension>]`.
fn build_name(
    stem: &OsStr,
    stamp: &str,
    counter: Option<u64>,
    extension: Option<&OsStr>,
) -> OsString {
    let mut name = stem.to_os_string();
    name.push("_");
    name.push(stamp);
    if let Some(counter) = counter {
        name.push(format!("_{}", counter));
    }
    if let Some(extension) = extension {
        name.push(".");
        name.push(extension);
    }
    name
}
