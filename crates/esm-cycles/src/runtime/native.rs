//! Native file system implementation.
//!
//! ```text
//! ┌───────────────────┐
//! │ NativeFileSystem  │
//! │  .read_to_string()│────▶ std::fs::read_to_string()
//! │  .is_file()       │────▶ std::path::Path::is_file()
//! │  .is_dir()        │────▶ std::path::Path::is_dir()
//! └───────────────────┘
//! ```

use std::io::ErrorKind;
use std::path::Path;

use super::{FileSystem, RuntimeError, RuntimeResult};

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFileSystem;

impl FileSystem for NativeFileSystem {
    fn read_to_string(&self, path: &Path) -> RuntimeResult<String> {
        std::fs::read_to_string(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => RuntimeError::FileNotFound(path.to_path_buf()),
            ErrorKind::InvalidData => RuntimeError::NotUtf8(path.to_path_buf()),
            _ => RuntimeError::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        })
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
