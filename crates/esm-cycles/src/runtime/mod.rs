//! File system abstraction for module loading.
//!
//! Analysis is fully synchronous, so the seam is a plain trait rather than an
//! async runtime. [`NativeFileSystem`] reads from disk; [`MemoryFileSystem`]
//! serves sources from a map and backs most of the unit tests.

pub mod memory;
pub mod native;

use std::path::{Path, PathBuf};

pub use memory::MemoryFileSystem;
pub use native::NativeFileSystem;

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur while reading module sources
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error reading {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    /// The file exists but is not valid UTF-8
    #[error("File is not valid UTF-8: {}", .0.display())]
    NotUtf8(PathBuf),
}

/// Read-only file system operations needed to resolve and load modules.
///
/// # Example
///
/// ```rust
/// use esm_cycles::runtime::{FileSystem, MemoryFileSystem};
/// use std::path::Path;
///
/// let fs = MemoryFileSystem::new().with_file("/app/index.js", "export {};");
/// assert!(fs.is_file(Path::new("/app/index.js")));
/// assert!(fs.is_dir(Path::new("/app")));
/// ```
pub trait FileSystem: std::fmt::Debug {
    /// Read a whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> RuntimeResult<String>;

    /// Check whether `path` names a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check whether `path` names a directory.
    fn is_dir(&self, path: &Path) -> bool;
}
