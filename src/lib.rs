//! Size-bounded rotating file writer.
//!
//! This crate provides:
//! - [`SizeRotator`], a thread-safe writer that appends bytes to a file and
//!   renames it aside once a write would push it past a size threshold
//! - [`Filesystem`] trait for file operations, with real and mock
//!   implementations
//! - Rotation slot naming and first-free-slot search
//!
//! The file at the base path always receives new writes; rotated
//! generations live next to it as numbered siblings (`app_001.log`,
//! `app_002.log`, ...).

pub mod fs;
pub mod rotation;
pub mod writer;

pub use fs::{Filesystem, MockFile, MockFilesystem, RealFilesystem};
pub use rotation::{find_rotation_target, rotated_path, RotationConfig};
pub use writer::{RotatorError, SizeRotator};
