//! In-memory file system for tests and embedders.

use path_clean::PathClean;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

use super::{FileSystem, RuntimeError, RuntimeResult};

/// A [`FileSystem`] holding sources in a map.
///
/// Paths are normalized lexically when inserted and when looked up, so
/// `/app/./src/../a.js` and `/app/a.js` name the same file. Directories
/// exist implicitly as ancestors of inserted files.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: FxHashMap<PathBuf, String>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, contents: impl Into<String>) {
        self.files.insert(path.as_ref().clean(), contents.into());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> RuntimeResult<String> {
        self.files
            .get(&path.clean())
            .cloned()
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(&path.clean())
    }

    fn is_dir(&self, path: &Path) -> bool {
        let dir = path.clean();
        self.files
            .keys()
            .any(|file| file != &dir && file.starts_with(&dir))
    }
}
