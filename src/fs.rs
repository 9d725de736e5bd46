//! Filesystem abstraction for the rotating writer.
//!
//! Provides the `Filesystem` trait covering the operations rotation depends
//! on, a real implementation over `std::fs`, and a mock implementation over
//! an in-memory map for deterministic tests.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Trait for the filesystem operations the rotating writer performs.
/// Abstracted for testing with mock implementations.
pub trait Filesystem: Send + Sync {
    /// Handle to an open file accepting appended bytes.
    type File: io::Write + Send;

    /// Open the file at `path` for appending, creating it if absent.
    fn open_append(&self, path: &Path) -> io::Result<Self::File>;

    /// Size in bytes of the file at `path`, or `None` if the probe fails.
    ///
    /// A failed probe means "no file here"; callers use this to resume
    /// size accounting and must not treat absence as an error.
    fn file_size(&self, path: &Path) -> Option<u64>;

    /// Rename a file.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFilesystem;

impl Filesystem for RealFilesystem {
    type File = fs::File;

    fn open_append(&self, path: &Path) -> io::Result<fs::File> {
        OpenOptions::new().create(true).append(true).open(path)
    }

    fn file_size(&self, path: &Path) -> Option<u64> {
        // Non-following stat; the path itself is what gets renamed.
        fs::symlink_metadata(path).ok().map(|meta| meta.len())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }
}

/// Mock filesystem for testing.
/// Cloning creates a new handle to the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MockFilesystem {
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
}

impl MockFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all files in the mock filesystem.
    pub fn files(&self) -> HashMap<PathBuf, Vec<u8>> {
        self.files.read().unwrap().clone()
    }

    /// Get content of a specific file.
    pub fn get_file(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.read().unwrap().get(path).cloned()
    }

    /// Add a file directly (for test setup).
    pub fn add_file(&self, path: PathBuf, data: Vec<u8>) {
        self.files.write().unwrap().insert(path, data);
    }
}

impl Filesystem for MockFilesystem {
    type File = MockFile;

    fn open_append(&self, path: &Path) -> io::Result<MockFile> {
        self.files
            .write()
            .unwrap()
            .entry(path.to_path_buf())
            .or_insert_with(Vec::new);
        Ok(MockFile {
            path: path.to_path_buf(),
            files: Arc::clone(&self.files),
        })
    }

    fn file_size(&self, path: &Path) -> Option<u64> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|data| data.len() as u64)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut files = self.files.write().unwrap();
        match files.remove(from) {
            Some(data) => {
                files.insert(to.to_path_buf(), data);
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {}", from.display()),
            )),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }
}

/// Append handle into the mock filesystem's backing map.
#[derive(Debug)]
pub struct MockFile {
    path: PathBuf,
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
}

impl io::Write for MockFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut files = self.files.write().unwrap();
        files
            .entry(self.path.clone())
            .or_insert_with(Vec::new)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
