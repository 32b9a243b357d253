//! Module specifier resolution.
//!
//! Only relative specifiers are resolved against the file system. Anything
//! else is a bare package specifier and becomes an opaque external module.

use path_clean::PathClean;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::runtime::FileSystem;

/// Extensions tried when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js"];

/// Outcome of resolving a specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveResult {
    /// A local source file.
    Local(PathBuf),
    /// A bare specifier, kept verbatim.
    External(String),
    /// A relative specifier that matched nothing.
    Unresolved,
}

/// Returns `true` for specifiers resolved against the importing file.
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with('.')
}

/// Resolves specifiers using a configured extension list.
#[derive(Debug, Clone, Copy)]
pub struct ModuleResolver<'a> {
    fs: &'a dyn FileSystem,
    extensions: &'a [String],
}

impl<'a> ModuleResolver<'a> {
    pub fn new(fs: &'a dyn FileSystem, extensions: &'a [String]) -> Self {
        Self { fs, extensions }
    }

    /// Resolve `specifier` as written in the module at `from`.
    ///
    /// Candidates are tried in this order:
    /// 1. the literal path
    /// 2. the path with each extension appended
    /// 3. `<path>/index` with each extension appended, if the path is a directory
    pub fn resolve(&self, specifier: &str, from: &Path) -> ResolveResult {
        if !is_relative(specifier) {
            return ResolveResult::External(specifier.to_string());
        }

        let base = from.parent().unwrap_or_else(|| Path::new(""));
        let candidate = base.join(specifier).clean();
        match self.resolve_path(&candidate) {
            Some(resolved) => {
                trace!(specifier, resolved = %resolved.display(), "resolved specifier");
                ResolveResult::Local(resolved)
            }
            None => ResolveResult::Unresolved,
        }
    }

    /// Apply file, extension, and index lookups to an absolute candidate.
    pub fn resolve_path(&self, candidate: &Path) -> Option<PathBuf> {
        if self.fs.is_file(candidate) {
            return Some(candidate.to_path_buf());
        }

        if let Some(found) = self.try_extensions(candidate) {
            return Some(found);
        }

        if self.fs.is_dir(candidate) {
            return self.try_extensions(&candidate.join("index"));
        }

        None
    }

    /// Resolve a path named on the command line.
    ///
    /// Directories additionally honour the `main` field of a `package.json`
    /// before falling back to `index` files.
    pub fn resolve_entrypoint(&self, path: &Path) -> Option<PathBuf> {
        let path = path.clean();
        if self.fs.is_file(&path) {
            return Some(path);
        }

        if let Some(found) = self.try_extensions(&path) {
            return Some(found);
        }

        if self.fs.is_dir(&path) {
            if let Some(main) = self.package_main(&path) {
                let candidate = path.join(main).clean();
                if let Some(found) = self.resolve_path(&candidate) {
                    return Some(found);
                }
            }
            return self.try_extensions(&path.join("index"));
        }

        None
    }

    fn try_extensions(&self, base: &Path) -> Option<PathBuf> {
        self.extensions.iter().find_map(|ext| {
            let mut name = OsString::from(base.as_os_str());
            name.push(ext);
            let with_ext = PathBuf::from(name);
            self.fs.is_file(&with_ext).then_some(with_ext)
        })
    }

    fn package_main(&self, dir: &Path) -> Option<String> {
        #[derive(Deserialize)]
        struct PackageJson {
            main: Option<String>,
        }

        let manifest = dir.join("package.json");
        let contents = self.fs.read_to_string(&manifest).ok()?;
        match serde_json::from_str::<PackageJson>(&contents) {
            Ok(package) => package.main,
            Err(err) => {
                trace!(path = %manifest.display(), error = %err, "ignoring unreadable package.json");
                None
            }
        }
    }
}
