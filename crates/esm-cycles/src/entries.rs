//! Import and export entries of a source module.
//!
//! Entries follow the ECMAScript static semantics for `ImportEntries` and
//! `ExportEntries`. They are derived once from [`ModuleFacts`] when a module
//! is parsed and never change afterwards, with two exceptions filled in during
//! evaluation: the unsafe uses recorded on an [`ImportEntry`] and the hazards
//! attached to a [`LocalExportEntry`].

use indexmap::IndexMap;
use oxc_semantic::SymbolId;
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::trace;

use crate::error::{AnalysisError, Result};
use crate::facts::{ExportDeclarationFacts, ModuleFacts};
use crate::record::ModuleId;
use crate::span::SourceNode;

/// Local name given to `export default <expression>`. It is not a valid
/// identifier, so it can never collide with a user binding.
pub const DEFAULT_LOCAL_NAME: &str = "*default*";

/// The name an import or re-export asks for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportName {
    /// `* as ns`
    Namespace,
    Name(String),
}

impl ImportName {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Namespace => "*",
            Self::Name(name) => name,
        }
    }
}

impl fmt::Display for ImportName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ImportName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportEntry {
    pub module_request: String,
    pub import_name: ImportName,
    pub local_name: String,
    /// The import specifier.
    pub node: SourceNode,
    /// The enclosing import declaration.
    pub declaration: SourceNode,
    #[serde(skip)]
    pub symbol: Option<SymbolId>,
    /// References that read this binding before its module executed.
    pub unsafe_uses: Vec<SourceNode>,
}

/// A function that fails when called before `root` has executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hazard {
    pub root: ModuleId,
    /// Explanation lines, outermost call first.
    pub chain: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LocalExportEntry {
    pub export_name: String,
    pub local_name: String,
    pub symbol: Option<SymbolId>,
    pub node: SourceNode,
    pub hazards: Vec<Hazard>,
}

#[derive(Debug, Clone)]
pub struct IndirectExportEntry {
    pub export_name: Option<String>,
    pub module_request: String,
    pub import_name: ImportName,
    pub node: SourceNode,
    /// The enclosing export or import declaration.
    pub declaration: SourceNode,
}

#[derive(Debug, Clone)]
pub struct StarExportEntry {
    pub module_request: String,
    pub node: SourceNode,
}

/// An export entry before it has been sorted into one of the three shapes.
#[derive(Debug, Clone)]
pub struct ExportEntry {
    pub export_name: Option<String>,
    pub module_request: Option<String>,
    pub import_name: Option<ImportName>,
    pub local_name: Option<String>,
    pub symbol: Option<SymbolId>,
    pub node: SourceNode,
    pub declaration: SourceNode,
}

/// An export entry sorted by shape.
#[derive(Debug, Clone)]
pub enum ClassifiedExport {
    Local(LocalExportEntry),
    Indirect(IndirectExportEntry),
    Star(StarExportEntry),
}

impl ExportEntry {
    /// Check the entry against the three shapes ECMAScript allows.
    ///
    /// - local: export name and local name, nothing else
    /// - indirect: module request and import name, export name unless the
    ///   import name is `*`
    /// - star: module request, import name `*`, no export name
    pub fn classify(self) -> Result<ClassifiedExport> {
        match self {
            ExportEntry {
                export_name: Some(export_name),
                module_request: None,
                import_name: None,
                local_name: Some(local_name),
                symbol,
                node,
                ..
            } => Ok(ClassifiedExport::Local(LocalExportEntry {
                export_name,
                local_name,
                symbol,
                node,
                hazards: Vec::new(),
            })),

            ExportEntry {
                export_name: None,
                module_request: Some(module_request),
                import_name: Some(ImportName::Namespace),
                local_name: None,
                node,
                ..
            } => Ok(ClassifiedExport::Star(StarExportEntry {
                module_request,
                node,
            })),

            ExportEntry {
                export_name: Some(export_name),
                module_request: Some(module_request),
                import_name: Some(import_name),
                local_name: None,
                node,
                declaration,
                ..
            } => Ok(ClassifiedExport::Indirect(IndirectExportEntry {
                export_name: Some(export_name),
                module_request,
                import_name,
                node,
                declaration,
            })),

            entry => Err(AnalysisError::Internal(format!(
                "export entry at {}:{} matches no export shape (export name {:?}, request {:?}, import name {:?}, local name {:?})",
                entry.node.loc.start.line,
                entry.node.loc.start.column,
                entry.export_name,
                entry.module_request,
                entry.import_name.as_ref().map(ImportName::as_str),
                entry.local_name,
            ))),
        }
    }
}

/// A distinct module specifier and the first declaration that requested it.
#[derive(Debug, Clone)]
pub struct ModuleRequest {
    pub specifier: String,
    pub declaration: SourceNode,
}

/// All entries of one source module.
#[derive(Debug, Clone, Default)]
pub struct ModuleEntries {
    pub import_entries: Vec<ImportEntry>,
    pub local_export_entries: Vec<LocalExportEntry>,
    pub indirect_export_entries: Vec<IndirectExportEntry>,
    pub star_export_entries: Vec<StarExportEntry>,
    /// Requested modules, deduplicated by specifier, in first-seen order.
    pub requested_modules: Vec<ModuleRequest>,
}

impl ModuleEntries {
    pub fn import_entry_for_local(&self, local_name: &str) -> Option<&ImportEntry> {
        self.import_entries
            .iter()
            .find(|entry| entry.local_name == local_name)
    }
}

/// Derive a module's entries from its facts.
///
/// `accept` is consulted once per declaration that carries a module
/// specifier. Declarations it rejects contribute no entries at all; the
/// caller is responsible for reporting why.
pub fn extract_entries(
    facts: &ModuleFacts,
    mut accept: impl FnMut(&str, &SourceNode) -> bool,
) -> Result<ModuleEntries> {
    let mut entries = ModuleEntries::default();
    let mut requests: IndexMap<String, SourceNode> = IndexMap::new();

    for import in &facts.imports {
        if !accept(&import.source, &import.node) {
            continue;
        }
        // Named and side-effect imports alike, in source order.
        requests.entry(import.source.clone()).or_insert(import.node);
        for specifier in &import.specifiers {
            entries.import_entries.push(ImportEntry {
                module_request: import.source.clone(),
                import_name: specifier.imported.clone(),
                local_name: specifier.local.clone(),
                node: specifier.node,
                declaration: import.node,
                symbol: specifier.symbol,
                unsafe_uses: Vec::new(),
            });
        }
    }

    let mut exports = Vec::new();
    for export in &facts.exports {
        if let Some(source) = export.source() {
            if !accept(source, export.node()) {
                continue;
            }
        }

        match export {
            ExportDeclarationFacts::Named {
                node: declaration,
                source: None,
                bindings,
            } => {
                exports.extend(bindings.iter().map(|binding| ExportEntry {
                    export_name: Some(binding.export_name.clone()),
                    module_request: None,
                    import_name: None,
                    local_name: Some(binding.local_name.clone()),
                    symbol: binding.symbol,
                    node: binding.node,
                    declaration: *declaration,
                }));
            }
            ExportDeclarationFacts::Named {
                node: declaration,
                source: Some(source),
                bindings,
            } => {
                exports.extend(bindings.iter().map(|binding| ExportEntry {
                    export_name: Some(binding.export_name.clone()),
                    module_request: Some(source.clone()),
                    import_name: Some(ImportName::Name(binding.local_name.clone())),
                    local_name: None,
                    symbol: None,
                    node: binding.node,
                    declaration: *declaration,
                }));
            }
            ExportDeclarationFacts::Default { node, symbol } => exports.push(ExportEntry {
                export_name: Some("default".to_string()),
                module_request: None,
                import_name: None,
                local_name: Some(DEFAULT_LOCAL_NAME.to_string()),
                symbol: *symbol,
                node: *node,
                declaration: *node,
            }),
            ExportDeclarationFacts::All {
                node,
                source,
                exported,
            } => exports.push(ExportEntry {
                export_name: exported.clone(),
                module_request: Some(source.clone()),
                import_name: Some(ImportName::Namespace),
                local_name: None,
                symbol: None,
                node: *node,
                declaration: *node,
            }),
        }
    }

    for export in exports {
        match export.classify()? {
            ClassifiedExport::Local(local) => match entries.import_entry_for_local(&local.local_name)
            {
                // `import * as ns; export { ns }` re-exports the namespace object itself.
                Some(import) if import.import_name == ImportName::Namespace => {
                    entries.local_export_entries.push(local);
                }
                Some(import) => {
                    trace!(
                        export = %local.export_name,
                        request = %import.module_request,
                        "re-exported import becomes indirect"
                    );
                    entries.indirect_export_entries.push(IndirectExportEntry {
                        export_name: Some(local.export_name),
                        module_request: import.module_request.clone(),
                        import_name: import.import_name.clone(),
                        node: local.node,
                        declaration: import.declaration,
                    });
                }
                None => entries.local_export_entries.push(local),
            },
            ClassifiedExport::Indirect(indirect) => entries.indirect_export_entries.push(indirect),
            ClassifiedExport::Star(star) => entries.star_export_entries.push(star),
        }
    }

    for entry in &entries.indirect_export_entries {
        requests
            .entry(entry.module_request.clone())
            .or_insert(entry.declaration);
    }
    for entry in &entries.star_export_entries {
        requests
            .entry(entry.module_request.clone())
            .or_insert(entry.node);
    }

    entries.requested_modules = requests
        .into_iter()
        .map(|(specifier, declaration)| ModuleRequest {
            specifier,
            declaration,
        })
        .collect();

    Ok(entries)
}
