//! Shared utilities for command implementations.
//!
//! - Path resolution against the working directory
//! - Project root discovery
//! - Entry point resolution

use crate::error::{CliError, Result};
use esm_cycles::{ModuleResolver, NativeFileSystem};
use std::path::{Path, PathBuf};

/// Resolve a path relative to a working directory.
///
/// If the path is absolute, returns it unchanged. Otherwise, joins it with
/// the working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Get the current working directory.
///
/// # Errors
///
/// Returns I/O error if current directory cannot be determined.
pub fn get_cwd() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| {
        CliError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to get current directory: {}", e),
        ))
    })
}

/// Walks up the directory tree to find the nearest package.json.
///
/// Returns the directory containing it, or `None` when no ancestor of
/// `start_dir` has one.
pub fn find_package_root(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .find(|dir| dir.join("package.json").is_file())
        .map(Path::to_path_buf)
}

/// Resolve an entrypoint named on the command line or in the config file.
///
/// Bare files, files missing one of `extensions`, and directories (through
/// their package.json `main`, then `index`) are accepted.
///
/// # Errors
///
/// Returns `CliError::EntrypointNotFound` if nothing matches.
pub fn resolve_entrypoint(entry: &str, cwd: &Path, extensions: &[String]) -> Result<PathBuf> {
    let candidate = resolve_path(Path::new(entry), cwd);
    ModuleResolver::new(&NativeFileSystem, extensions)
        .resolve_entrypoint(&candidate)
        .ok_or(CliError::EntrypointNotFound(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn js() -> Vec<String> {
        vec![".js".to_string()]
    }

    #[test]
    fn test_resolve_path() {
        let cwd = Path::new("/project");
        assert_eq!(resolve_path(Path::new("src/a.js"), cwd), PathBuf::from("/project/src/a.js"));
        assert_eq!(resolve_path(Path::new("/abs/a.js"), cwd), PathBuf::from("/abs/a.js"));
    }

    #[test]
    fn test_find_package_root() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), "{}").unwrap();
        let nested = temp.path().join("src/components");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_package_root(&nested), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn test_resolve_entrypoint_variants() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("lib")).unwrap();
        fs::create_dir_all(temp.path().join("pkg/dist")).unwrap();
        fs::write(temp.path().join("main.js"), "").unwrap();
        fs::write(temp.path().join("lib/index.js"), "").unwrap();
        fs::write(temp.path().join("pkg/package.json"), r#"{ "main": "dist/entry.js" }"#).unwrap();
        fs::write(temp.path().join("pkg/dist/entry.js"), "").unwrap();

        let cwd = temp.path();
        assert_eq!(resolve_entrypoint("main.js", cwd, &js()).unwrap(), cwd.join("main.js"));
        assert_eq!(resolve_entrypoint("main", cwd, &js()).unwrap(), cwd.join("main.js"));
        assert_eq!(resolve_entrypoint("lib", cwd, &js()).unwrap(), cwd.join("lib/index.js"));
        assert_eq!(resolve_entrypoint("pkg", cwd, &js()).unwrap(), cwd.join("pkg/dist/entry.js"));
    }

    #[test]
    fn test_missing_entrypoint() {
        let temp = TempDir::new().unwrap();
        let err = resolve_entrypoint("missing", temp.path(), &js()).unwrap_err();
        assert!(matches!(err, CliError::EntrypointNotFound(path) if path == temp.path().join("missing")));
    }
}
