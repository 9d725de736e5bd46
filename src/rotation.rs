//! Rotation policy and slot naming.
//!
//! Rotated generations are numbered siblings of the base path: `app.log`
//! rotates to `app_001.log`, `app_002.log`, ... with the index zero-padded
//! to the digit width of the configured maximum.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::fs::Filesystem;

/// Configuration for size-based rotation.
#[derive(Debug, Clone, Copy)]
pub struct RotationConfig {
    /// Size threshold in bytes. A write that would push the current file
    /// past this triggers rotation first.
    pub rotation_size: u64,

    /// Maximum number of rotated generations that may coexist.
    pub max_rotation: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            rotation_size: 10 * 1024 * 1024, // 10 MiB
            max_rotation: 999,
        }
    }
}

impl RotationConfig {
    /// Create a new rotation config.
    pub fn new(rotation_size: u64, max_rotation: usize) -> Self {
        Self {
            rotation_size,
            max_rotation,
        }
    }
}

/// Number of decimal digits in `n`; the zero-pad width for slot indices.
fn digit_width(mut n: usize) -> usize {
    let mut width = 1;
    while n >= 10 {
        n /= 10;
        width += 1;
    }
    width
}

/// Build the rotated name for generation `index` of `path`.
///
/// The index is zero-padded to the digit width of `max_rotation` and
/// inserted before the extension: `app.log` becomes `app_001.log` for a
/// maximum of 999. A path without an extension gets the suffix appended
/// directly. Pure function of its inputs.
pub fn rotated_path(path: &Path, index: usize, max_rotation: usize) -> PathBuf {
    let width = digit_width(max_rotation);
    let suffix = format!("_{:0width$}", index);

    match path.extension() {
        Some(ext) => {
            let mut name = match path.file_stem() {
                Some(stem) => stem.to_os_string(),
                None => OsString::new(),
            };
            name.push(&suffix);
            name.push(".");
            name.push(ext);
            path.with_file_name(name)
        }
        None => {
            let mut name = match path.file_name() {
                Some(name) => name.to_os_string(),
                None => OsString::new(),
            };
            name.push(&suffix);
            path.with_file_name(name)
        }
    }
}

/// Search generation indices `1..=max_rotation` in increasing order for the
/// first rotated name not already on disk.
///
/// The search restarts at index 1 every time, so gaps left by deleted
/// generations are reused. Returns `None` when every slot is occupied.
pub fn find_rotation_target<F: Filesystem>(
    fs: &F,
    path: &Path,
    max_rotation: usize,
) -> Option<PathBuf> {
    (1..=max_rotation)
        .map(|index| rotated_path(path, index, max_rotation))
        .find(|candidate| !fs.exists(candidate))
}
