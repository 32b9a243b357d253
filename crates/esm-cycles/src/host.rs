//! The module host: registry of every module seen during one analysis session.

use path_clean::PathClean;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::entries::{ModuleRequest, extract_entries};
use crate::error::{AnalysisError, Result};
use crate::evaluation::evaluate;
use crate::facts::parse_module;
use crate::issue::{Issue, IssueKind, sort_issues};
use crate::linking::link;
use crate::record::{ModuleId, ModuleKind, ModuleRecord, RequestTarget, SourceModule};
use crate::resolver::{DEFAULT_EXTENSIONS, ModuleResolver, ResolveResult};
use crate::runtime::{FileSystem, NativeFileSystem};
use crate::span::SourceNode;

/// Options for a [`ModuleHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostOptions {
    /// Extensions tried, in order, when a specifier names no existing file.
    pub extensions: Vec<String>,
    /// Root that relative display paths are computed from.
    pub working_directory: PathBuf,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            working_directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

/// Owns every module record of one analysis session.
///
/// Modules are parsed lazily, the first time something requests them, and
/// memoized by absolute path. External modules are memoized by specifier.
/// Several entrypoints may be analyzed in one host; they share records, so a
/// module is linked and evaluated at most once.
///
/// # Example
///
/// ```no_run
/// use esm_cycles::{HostOptions, ModuleHost};
/// use std::path::Path;
///
/// let mut host = ModuleHost::new(HostOptions::default());
/// host.parse_entrypoint(Path::new("src/index.js"))?;
/// for issue in host.issues() {
///     println!("{}: {}", issue.relative_path, issue.message);
/// }
/// # Ok::<(), esm_cycles::AnalysisError>(())
/// ```
#[derive(Debug)]
pub struct ModuleHost {
    fs: Arc<dyn FileSystem>,
    options: HostOptions,
    records: Vec<ModuleRecord>,
    by_path: FxHashMap<PathBuf, ModuleId>,
    externals: FxHashMap<String, ModuleId>,
    reported_cycles: FxHashSet<(ModuleId, u32, u32)>,
    issues: Vec<Issue>,
}

impl ModuleHost {
    /// Create a host reading from the real file system.
    pub fn new(options: HostOptions) -> Self {
        Self::with_file_system(Arc::new(NativeFileSystem), options)
    }

    pub fn with_file_system(fs: Arc<dyn FileSystem>, options: HostOptions) -> Self {
        Self {
            fs,
            options,
            records: Vec::new(),
            by_path: FxHashMap::default(),
            externals: FxHashMap::default(),
            reported_cycles: FxHashSet::default(),
            issues: Vec::new(),
        }
    }

    pub fn options(&self) -> &HostOptions {
        &self.options
    }

    pub fn file_system(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Drop every record and issue, keeping the options.
    pub fn reset(&mut self) {
        self.records.clear();
        self.by_path.clear();
        self.externals.clear();
        self.reported_cycles.clear();
        self.issues.clear();
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this host.
    pub fn record(&self, id: ModuleId) -> &ModuleRecord {
        &self.records[id.index()]
    }

    pub(crate) fn record_mut(&mut self, id: ModuleId) -> &mut ModuleRecord {
        &mut self.records[id.index()]
    }

    pub fn records(&self) -> impl Iterator<Item = &ModuleRecord> {
        self.records.iter()
    }

    pub fn module_id(&self, path: impl AsRef<Path>) -> Option<ModuleId> {
        self.by_path.get(&path.as_ref().clean()).copied()
    }

    /// Paths of all successfully parsed source modules, sorted.
    pub fn file_names(&self) -> Vec<PathBuf> {
        let mut names: Vec<PathBuf> = self
            .records
            .iter()
            .filter(|record| record.as_source().is_some())
            .map(|record| record.path.clone())
            .collect();
        names.sort();
        names
    }

    /// All issues, in canonical order.
    pub fn issues(&self) -> Vec<Issue> {
        let mut issues = self.issues.clone();
        sort_issues(&mut issues);
        issues
    }

    /// The issues attributed to one module, in the order they were found.
    pub fn module_issues(&self, id: ModuleId) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.module == id)
    }

    pub fn add_issue(
        &mut self,
        module: ModuleId,
        kind: IssueKind,
        node: Option<SourceNode>,
        message: impl Into<String>,
    ) {
        let record = self.record(module);
        let issue = Issue {
            module,
            file_path: record.path.clone(),
            relative_path: record.relative_path.clone(),
            kind,
            node,
            message: message.into(),
        };
        self.issues.push(issue);
    }

    /// Resolve `specifier` relative to the module at `from`.
    pub fn resolve_module(&self, from: &Path, specifier: &str) -> ResolveResult {
        ModuleResolver::new(self.fs.as_ref(), &self.options.extensions).resolve(specifier, from)
    }

    /// Read and analyze an entrypoint.
    ///
    /// Only a failure to read the entrypoint itself is an error. Everything
    /// found in the module graph is reported through [`issues`](Self::issues),
    /// including broken invariants of the algorithms, which stop the
    /// analysis of this entrypoint.
    pub fn parse_entrypoint(&mut self, path: &Path) -> Result<ModuleId> {
        let path = path.clean();
        let source = self.fs.read_to_string(&path)?;
        self.top_level_module_evaluation(&source, &path)
    }

    /// Analyze `source` as the module at `path`, then link and evaluate it.
    pub fn top_level_module_evaluation(&mut self, source: &str, path: &Path) -> Result<ModuleId> {
        let path = path.clean();
        let id = match self.by_path.get(&path) {
            Some(&id) => id,
            None => self.parse_module(path, source),
        };

        match link(self, id).and_then(|()| evaluate(self, id)) {
            Ok(()) => Ok(id),
            Err(AnalysisError::Assertion { algorithm, part }) => {
                warn!(algorithm, part, "analysis aborted on a failed assertion");
                self.add_issue(
                    id,
                    IssueKind::Assertion { algorithm, part },
                    None,
                    format!("Assertion failed in {algorithm} step {part}."),
                );
                Ok(id)
            }
            Err(AnalysisError::Internal(message)) => {
                warn!(%message, "analysis aborted on an internal error");
                self.add_issue(id, IssueKind::InternalError, None, message);
                Ok(id)
            }
            Err(err @ AnalysisError::Runtime(_)) => Err(err),
        }
    }

    /// Parse `source` into a new record for `path`.
    ///
    /// Syntax errors and malformed declarations yield an opaque record so the
    /// path is never parsed again.
    pub(crate) fn parse_module(&mut self, path: PathBuf, source: &str) -> ModuleId {
        let id = ModuleId(self.records.len() as u32);
        let relative_path = self.relative_path(&path);

        let facts = match parse_module(&path, source) {
            Ok(facts) => facts,
            Err(failure) => {
                debug!(path = %path.display(), "module failed to parse");
                self.insert_record(ModuleRecord::opaque(id, path, relative_path, ModuleKind::Unparsed));
                self.add_issue(id, IssueKind::ParseError, Some(failure.node), failure.message);
                return id;
            }
        };

        let resolver = ModuleResolver::new(self.fs.as_ref(), &self.options.extensions);
        let mut targets = FxHashMap::default();
        let mut unresolved: Vec<(String, SourceNode)> = Vec::new();
        let entries = extract_entries(&facts, |specifier, node| {
            match resolver.resolve(specifier, &path) {
                ResolveResult::Local(resolved) => {
                    targets.insert(specifier.to_string(), RequestTarget::File(resolved));
                    true
                }
                ResolveResult::External(name) => {
                    targets.insert(specifier.to_string(), RequestTarget::External(name));
                    true
                }
                ResolveResult::Unresolved => {
                    unresolved.push((specifier.to_string(), *node));
                    false
                }
            }
        });

        let entries = match entries {
            Ok(entries) => entries,
            Err(err) => {
                self.insert_record(ModuleRecord::opaque(id, path, relative_path, ModuleKind::Unparsed));
                self.add_issue(id, IssueKind::InternalError, None, err.to_string());
                return id;
            }
        };

        debug!(
            path = %path.display(),
            imports = entries.import_entries.len(),
            requests = entries.requested_modules.len(),
            "parsed module"
        );

        let module = SourceModule {
            entries,
            facts,
            targets,
            ..SourceModule::default()
        };
        self.insert_record(ModuleRecord::source(id, path, relative_path, module));

        for (specifier, node) in unresolved {
            let message = format!("Unable to locate module for specifier '{specifier}'.");
            self.add_issue(id, IssueKind::ImportError { specifier }, Some(node), message);
        }

        id
    }

    /// The record a specifier of `referrer` points at, loading it if needed.
    ///
    /// Returns `None` for specifiers that were dropped during extraction. A
    /// dependency that cannot be read is reported on `referrer` and replaced
    /// by an opaque record.
    pub fn resolve_imported_module(
        &mut self,
        referrer: ModuleId,
        specifier: &str,
    ) -> Result<Option<ModuleId>> {
        let Some(source) = self.record(referrer).as_source() else {
            return Ok(None);
        };
        let Some(target) = source.targets.get(specifier).cloned() else {
            return Ok(None);
        };

        match target {
            RequestTarget::External(name) => Ok(Some(self.external_module(name))),
            RequestTarget::File(path) => {
                if let Some(&id) = self.by_path.get(&path) {
                    return Ok(Some(id));
                }

                match self.fs.read_to_string(&path) {
                    Ok(text) => Ok(Some(self.parse_module(path, &text))),
                    Err(err) => {
                        let declaration = self
                            .requested_modules(referrer)
                            .into_iter()
                            .find(|request| request.specifier == specifier)
                            .map(|request| request.declaration);
                        let id = ModuleId(self.records.len() as u32);
                        let relative_path = self.relative_path(&path);
                        self.insert_record(ModuleRecord::opaque(
                            id,
                            path,
                            relative_path,
                            ModuleKind::Unparsed,
                        ));
                        self.add_issue(
                            referrer,
                            IssueKind::ImportError {
                                specifier: specifier.to_string(),
                            },
                            declaration,
                            format!("Unable to read module for specifier '{specifier}'. {err}"),
                        );
                        Ok(Some(id))
                    }
                }
            }
        }
    }

    pub(crate) fn requested_modules(&self, module: ModuleId) -> Vec<ModuleRequest> {
        self.record(module)
            .as_source()
            .map(|source| source.entries.requested_modules.clone())
            .unwrap_or_default()
    }

    pub(crate) fn tarjan_indices(&self, module: ModuleId) -> Result<(usize, usize)> {
        let record = self.record(module);
        match (record.index, record.ancestor_index) {
            (Some(index), Some(ancestor)) => Ok((index, ancestor)),
            _ => Err(AnalysisError::Internal(format!(
                "{} has no index after being visited",
                record.relative_path
            ))),
        }
    }

    /// Remember a reported cycle edge. Returns `false` if it was already known.
    pub(crate) fn mark_cycle_reported(&mut self, importer: ModuleId, declaration: &SourceNode) -> bool {
        self.reported_cycles
            .insert((importer, declaration.start, declaration.end))
    }

    fn external_module(&mut self, specifier: String) -> ModuleId {
        if let Some(&id) = self.externals.get(&specifier) {
            return id;
        }

        let id = ModuleId(self.records.len() as u32);
        self.records.push(ModuleRecord::opaque(
            id,
            PathBuf::from(&specifier),
            specifier.clone(),
            ModuleKind::External {
                specifier: specifier.clone(),
            },
        ));
        self.externals.insert(specifier, id);
        id
    }

    fn insert_record(&mut self, record: ModuleRecord) {
        self.by_path.insert(record.path.clone(), record.id);
        self.records.push(record);
    }

    fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.options.working_directory)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}
