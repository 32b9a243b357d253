//! Module records.
//!
//! Records live in an arena owned by the [`ModuleHost`](crate::ModuleHost)
//! and refer to each other only by [`ModuleId`]. Edges from a module to the
//! modules it imports are looked up through the host, never stored as
//! references, so the graph can be cyclic without any ownership cycle.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::entries::ModuleEntries;
use crate::exports::ResolvedBinding;
use crate::facts::ModuleFacts;

/// Index of a record in the host's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ModuleId(pub(crate) u32);

impl ModuleId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a cyclic module record. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Unlinked,
    Linking,
    Linked,
    Evaluating,
    Evaluated,
}

/// Where a module specifier of a source module points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    File(PathBuf),
    External(String),
}

/// A module parsed from a local source file.
#[derive(Debug, Default)]
pub struct SourceModule {
    pub entries: ModuleEntries,
    pub facts: ModuleFacts,
    /// Resolution of every specifier that survived extraction.
    pub targets: FxHashMap<String, RequestTarget>,
    /// Resolved binding per import entry, filled in while linking.
    pub environment: Vec<Option<ResolvedBinding>>,
    /// Sorted, unambiguous export names. Computed at most once.
    pub namespace: Option<Vec<String>>,
}

#[derive(Debug)]
pub enum ModuleKind {
    Source(Box<SourceModule>),
    /// A bare specifier. Exports every name, never cyclic.
    External { specifier: String },
    /// A local file that failed to parse.
    Unparsed,
}

#[derive(Debug)]
pub struct ModuleRecord {
    pub id: ModuleId,
    /// Absolute path, or the raw specifier of an external module.
    pub path: PathBuf,
    /// Display path relative to the working directory.
    pub relative_path: String,
    pub status: Status,
    pub index: Option<usize>,
    pub ancestor_index: Option<usize>,
    /// Set once this module's own body has been executed, which can be
    /// earlier than its SCC reaching [`Status::Evaluated`].
    pub has_executed: bool,
    pub kind: ModuleKind,
}

impl ModuleRecord {
    pub(crate) fn source(id: ModuleId, path: PathBuf, relative_path: String, module: SourceModule) -> Self {
        Self {
            id,
            path,
            relative_path,
            status: Status::Unlinked,
            index: None,
            ancestor_index: None,
            has_executed: false,
            kind: ModuleKind::Source(Box::new(module)),
        }
    }

    /// Leaves are linked and executed from the moment they exist.
    pub(crate) fn opaque(id: ModuleId, path: PathBuf, relative_path: String, kind: ModuleKind) -> Self {
        Self {
            id,
            path,
            relative_path,
            status: Status::Evaluated,
            index: None,
            ancestor_index: None,
            has_executed: true,
            kind,
        }
    }

    pub fn is_opaque(&self) -> bool {
        !matches!(self.kind, ModuleKind::Source(_))
    }

    pub fn is_external(&self) -> bool {
        matches!(self.kind, ModuleKind::External { .. })
    }

    pub fn as_source(&self) -> Option<&SourceModule> {
        match &self.kind {
            ModuleKind::Source(module) => Some(module),
            _ => None,
        }
    }

    pub fn as_source_mut(&mut self) -> Option<&mut SourceModule> {
        match &mut self.kind {
            ModuleKind::Source(module) => Some(module),
            _ => None,
        }
    }
}
