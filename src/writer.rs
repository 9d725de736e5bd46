//! Size-bounded rotating file writer.
//!
//! `SizeRotator` appends bytes to a file and, once a write would push it
//! past the configured size threshold, renames the file to the first free
//! numbered sibling and starts a fresh file at the base path.

use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::fs::Filesystem;
use crate::rotation::{find_rotation_target, RotationConfig};

/// Errors from rotating-writer operations.
#[derive(Debug, Error)]
pub enum RotatorError {
    /// Every rotation slot up to the configured maximum is occupied.
    #[error("rotation limit of {max} files exceeded")]
    RotationExhausted { max: usize },

    /// Renaming the active file to its rotation target failed.
    #[error("failed to rotate {} to {}: {}", .from.display(), .to.display(), .source)]
    Rotate {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// Opening the active file for appending failed.
    #[error("failed to open {}: {}", .path.display(), .source)]
    Open { path: PathBuf, source: io::Error },

    /// Writing to the active file failed after `written` bytes landed.
    #[error("write failed after {written} bytes: {source}")]
    Write { written: usize, source: io::Error },

    /// Flushing the active file on close failed.
    #[error("failed to close {}: {}", .path.display(), .source)]
    Close { path: PathBuf, source: io::Error },

    /// The writer has no open file handle to close.
    #[error("no open file to close")]
    NotOpen,

    /// The writer was closed and no longer accepts writes.
    #[error("writer is closed")]
    Closed,
}

/// State guarded by the writer's lock: the active handle and the byte
/// count written to it since it was opened.
#[derive(Debug)]
struct WriterState<File> {
    file: Option<File>,
    total_size: u64,
    closed: bool,
}

/// File writer that rotates by size.
///
/// The file at the base path always receives writes; once a write would
/// push it past the threshold the file is renamed to the first free
/// numbered sibling and a fresh file is created at the base path. All
/// operations are serialized by an internal lock, so any number of threads
/// may share one writer.
pub struct SizeRotator<F: Filesystem> {
    fs: F,
    path: PathBuf,
    config: RotationConfig,
    state: Mutex<WriterState<F::File>>,
}

impl<F: Filesystem> SizeRotator<F> {
    /// Create a writer with the default rotation policy (10 MiB threshold,
    /// 999 rotation slots). No file is opened until the first write.
    pub fn new(fs: F, path: impl Into<PathBuf>) -> Self {
        Self::with_config(fs, path, RotationConfig::default())
    }

    /// Create a writer with an explicit rotation policy.
    pub fn with_config(fs: F, path: impl Into<PathBuf>, config: RotationConfig) -> Self {
        Self {
            fs,
            path: path.into(),
            config,
            state: Mutex::new(WriterState {
                file: None,
                total_size: 0,
                closed: false,
            }),
        }
    }

    /// The base path writes are appended to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The rotation policy in effect.
    pub fn config(&self) -> RotationConfig {
        self.config
    }

    /// Append `data` to the active file, rotating first if the write would
    /// push it past the size threshold.
    ///
    /// The whole operation runs under the writer's lock: size discovery,
    /// the rotation decision, the rename, the reopen, and the write itself
    /// never interleave with another caller's. Returns the number of bytes
    /// written; on error nothing was written, unless the failure came from
    /// the write itself, in which case the error carries the partial count.
    pub fn write(&self, data: &[u8]) -> Result<usize, RotatorError> {
        let mut state = self.state.lock().unwrap();

        if state.closed {
            return Err(RotatorError::Closed);
        }

        // With no open handle the on-disk file is the source of truth for
        // size accounting, so a restarted process resumes where it left off.
        if state.file.is_none() {
            if let Some(size) = self.fs.file_size(&self.path) {
                state.total_size = size;
            }
        }

        // Rotate before the write when it would cross the threshold. The
        // payload is still written in full afterwards, so a single
        // oversized write can leave the fresh file past the nominal limit.
        if state.total_size + data.len() as u64 > self.config.rotation_size {
            let target = find_rotation_target(&self.fs, &self.path, self.config.max_rotation)
                .ok_or(RotatorError::RotationExhausted {
                    max: self.config.max_rotation,
                })?;
            // The open handle refers to the file about to be renamed away.
            state.file = None;
            self.fs
                .rename(&self.path, &target)
                .map_err(|source| RotatorError::Rotate {
                    from: self.path.clone(),
                    to: target,
                    source,
                })?;
        }

        let mut file = match state.file.take() {
            Some(file) => file,
            None => {
                let file = self
                    .fs
                    .open_append(&self.path)
                    .map_err(|source| RotatorError::Open {
                        path: self.path.clone(),
                        source,
                    })?;
                state.total_size = 0;
                file
            }
        };

        let (written, result) = write_through(&mut file, data);
        state.total_size += written as u64;
        state.file = Some(file);

        match result {
            Ok(()) => Ok(written),
            Err(source) => Err(RotatorError::Write { written, source }),
        }
    }

    /// Append the UTF-8 bytes of `text`; same contract as [`Self::write`].
    pub fn write_str(&self, text: &str) -> Result<usize, RotatorError> {
        self.write(text.as_bytes())
    }

    /// Flush and release the active file handle.
    ///
    /// The writer is closed for good afterwards; closing a writer with no
    /// open handle is an error.
    pub fn close(&self) -> Result<(), RotatorError> {
        let mut state = self.state.lock().unwrap();
        match state.file.take() {
            Some(mut file) => {
                state.closed = true;
                file.flush().map_err(|source| RotatorError::Close {
                    path: self.path.clone(),
                    source,
                })
            }
            None => Err(RotatorError::NotOpen),
        }
    }
}

/// Adapter so logging frameworks can use the writer as a generic byte sink.
impl<F: Filesystem> io::Write for SizeRotator<F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        SizeRotator::write(self, buf).map_err(io::Error::other)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Write all of `data`, counting bytes as they land. Returns the count
/// together with the first hard error, so partial progress is never lost.
fn write_through(file: &mut impl io::Write, data: &[u8]) -> (usize, io::Result<()>) {
    let mut written = 0;
    while written < data.len() {
        match file.write(&data[written..]) {
            Ok(0) => {
                return (
                    written,
                    Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write whole buffer",
                    )),
                );
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return (written, Err(e)),
        }
    }
    (written, Ok(()))
}
