//! # esm-cycles
//!
//! Static detection of ECMAScript module import cycles, and of the bugs they
//! cause: reading an imported binding before the module that defines it has
//! finished executing.
//!
//! Nothing is executed. The crate replays the module linking and evaluation
//! algorithms of the ECMAScript specification over parsed source, tracking
//! Tarjan indices to find strongly connected components, and inspects every
//! reference to an import to decide whether it is read too early.
//!
//! ## Architecture
//!
//! ```text
//!  entrypoint ──► ModuleHost ──────────────────────────────┐
//!                 │  arena of ModuleRecord, keyed by path   │
//!                 │  lazy parse via FileSystem + resolver   │
//!                 └──────────┬──────────────────────────────┘
//!                            │ facts (oxc parse + semantic)
//!                            ▼
//!                 ┌─────────────────────┐
//!                 │  import / export    │
//!                 │  entries            │
//!                 └──────────┬──────────┘
//!                            │
//!          ┌─────────────────┼──────────────────┐
//!          ▼                 ▼                  ▼
//!     ┌─────────┐      ┌────────────┐     ┌──────────────┐
//!     │ linking │ ───► │ evaluation │ ──► │ usage        │
//!     │ (SCCs)  │      │ (cycles)   │     │ (use before  │
//!     └─────────┘      └────────────┘     │  execution)  │
//!                                         └──────┬───────┘
//!                                                ▼
//!                                          Issue ► LintResult
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use esm_cycles::{HostOptions, MemoryFileSystem, ModuleHost};
//! use std::path::{Path, PathBuf};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), esm_cycles::AnalysisError> {
//! let fs = MemoryFileSystem::new()
//!     .with_file("/app/a.js", "import { b } from './b.js';\nexport const a = 1;")
//!     .with_file("/app/b.js", "import { a } from './a.js';\nconsole.log(a);\nexport const b = 2;");
//!
//! let options = HostOptions {
//!     extensions: vec![".js".to_string()],
//!     working_directory: PathBuf::from("/app"),
//! };
//! let mut host = ModuleHost::with_file_system(Arc::new(fs), options);
//! host.parse_entrypoint(Path::new("/app/a.js"))?;
//!
//! let messages: Vec<String> = host.issues().into_iter().map(|issue| issue.message).collect();
//! assert_eq!(
//!     messages,
//!     [
//!         "Import cycle: a.js -> b.js -> a.js",
//!         "Imported 'a' is used before 'a.js' has been evaluated.",
//!     ]
//! );
//! # Ok(())
//! # }
//! ```

pub mod entries;
pub mod error;
pub mod evaluation;
pub mod exports;
pub mod facts;
pub mod host;
pub mod issue;
pub mod linking;
pub mod record;
pub mod resolver;
pub mod runtime;
pub mod span;
mod usage;

pub use entries::{
    DEFAULT_LOCAL_NAME, Hazard, ImportEntry, ImportName, IndirectExportEntry, LocalExportEntry,
    ModuleEntries, ModuleRequest, StarExportEntry,
};
pub use error::{AnalysisError, Result};
pub use evaluation::evaluate;
pub use exports::{
    BindingName, ExportResolution, ResolvedBinding, get_exported_names, get_module_namespace,
    resolve_export,
};
pub use host::{HostOptions, ModuleHost};
pub use issue::{
    CycleFrame, Issue, IssueKind, LintMessage, LintResult, Severity, compare_issues,
    into_lint_results, sort_issues,
};
pub use linking::link;
pub use record::{ModuleId, ModuleKind, ModuleRecord, RequestTarget, SourceModule, Status};
pub use resolver::{DEFAULT_EXTENSIONS, ModuleResolver, ResolveResult};
pub use runtime::{FileSystem, MemoryFileSystem, NativeFileSystem, RuntimeError, RuntimeResult};
pub use span::{NodeKind, Position, SourceLocation, SourceNode};

// Re-export the oxc types that appear in this crate's public API, so
// consumers stay on the same oxc version.
pub mod oxc {
    //! OXC foundation types used by the analysis.

    /// Arena allocator for AST nodes
    pub use oxc_allocator::Allocator;

    /// Span types for source location tracking
    pub use oxc_span::{SourceType, Span};

    /// AST node types
    pub use oxc_ast::ast;

    /// AST visitor trait
    pub use oxc_ast_visit::Visit;

    /// JavaScript/TypeScript parser
    pub use oxc_parser::{Parser, ParserReturn};

    /// Semantic analysis (scopes, symbols, references)
    pub use oxc_semantic::{ScopeFlags, SemanticBuilder, SymbolFlags, SymbolId};
}
