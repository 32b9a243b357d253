//! Owned per-module facts extracted from an oxc parse.
//!
//! A module is parsed exactly once. The AST arena is dropped before linking
//! starts, so this module copies out everything the analysis consults later:
//!
//! - top-level import and export declarations
//! - every identifier reference, grouped by the symbol it resolves to and
//!   tagged with the evaluation context it sits in
//! - the module's top-level bindings, noting hoisted function declarations

mod visitor;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingIdentifier, BindingPatternKind, Declaration, ExportDefaultDeclarationKind,
    IdentifierReference, ImportDeclarationSpecifier, ModuleDeclaration, ModuleExportName,
    ObjectPattern, Program, PropertyKey,
};
use oxc_ast_visit::Visit;
use oxc_parser::{Parser, ParserReturn};
use oxc_semantic::{Scoping, SemanticBuilder, SymbolFlags, SymbolId};
use oxc_span::{SourceType, Span};
use rustc_hash::FxHashMap;
use std::path::Path;
use tracing::warn;

use crate::entries::ImportName;
use crate::span::{LineIndex, NodeKind, SourceNode};

/// Where an identifier reference is evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceContext {
    /// On the module's own top-level evaluation path.
    TopLevel,
    /// The local side of an `export { x }` specifier.
    ReExport,
    /// Inside a function body; only evaluated when the function is called.
    Function(FunctionOwner),
    /// Inside a class body.
    ClassBody,
}

/// The name a function can be called by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionOwner {
    /// A function declaration, or a function expression bound by a
    /// `const f = () => {}` style declarator.
    Binding { symbol: SymbolId, name: String },
    /// The anonymous function of `export default function () {}`.
    DefaultExport,
    /// Callbacks, object methods, and anything else without a callable name.
    Anonymous,
}

impl FunctionOwner {
    pub fn display_name(&self) -> &str {
        match self {
            Self::Binding { name, .. } => name,
            Self::DefaultExport => "default",
            Self::Anonymous => "<anonymous>",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFact {
    pub node: SourceNode,
    pub context: ReferenceContext,
    /// The property name when the reference is the object of `x.name`.
    pub member: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopLevelBinding {
    pub symbol: SymbolId,
    /// Function declarations are initialized before any module code runs.
    pub hoisted_function: bool,
}

#[derive(Debug, Clone)]
pub struct ImportDeclarationFacts {
    pub node: SourceNode,
    pub source: String,
    pub specifiers: Vec<ImportSpecifierFacts>,
}

#[derive(Debug, Clone)]
pub struct ImportSpecifierFacts {
    pub node: SourceNode,
    pub imported: ImportName,
    pub local: String,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct ExportBindingFacts {
    pub node: SourceNode,
    pub export_name: String,
    /// The local binding, or the imported name when the declaration has a source.
    pub local_name: String,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone)]
pub enum ExportDeclarationFacts {
    Named {
        node: SourceNode,
        source: Option<String>,
        bindings: Vec<ExportBindingFacts>,
    },
    Default {
        node: SourceNode,
        symbol: Option<SymbolId>,
    },
    All {
        node: SourceNode,
        source: String,
        exported: Option<String>,
    },
}

impl ExportDeclarationFacts {
    pub fn node(&self) -> &SourceNode {
        match self {
            Self::Named { node, .. } | Self::Default { node, .. } | Self::All { node, .. } => node,
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            Self::Named { source, .. } => source.as_deref(),
            Self::Default { .. } => None,
            Self::All { source, .. } => Some(source),
        }
    }
}

/// Everything the analysis needs from one parsed module.
#[derive(Debug, Clone, Default)]
pub struct ModuleFacts {
    pub imports: Vec<ImportDeclarationFacts>,
    pub exports: Vec<ExportDeclarationFacts>,
    pub references: FxHashMap<SymbolId, Vec<ReferenceFact>>,
    pub bindings: FxHashMap<String, TopLevelBinding>,
}

impl ModuleFacts {
    pub fn references_to(&self, symbol: SymbolId) -> &[ReferenceFact] {
        self.references.get(&symbol).map_or(&[], Vec::as_slice)
    }

    pub fn is_hoisted_function(&self, name: &str) -> bool {
        self.bindings
            .get(name)
            .is_some_and(|binding| binding.hoisted_function)
    }
}

/// A module whose source text did not parse.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub message: String,
    pub node: SourceNode,
}

/// Pick the oxc source type for a file, always with the module goal.
pub fn source_type_for(path: &Path) -> SourceType {
    SourceType::from_path(path)
        .unwrap_or_else(|_| SourceType::mjs())
        .with_module(true)
}

/// Parse `source` and extract its [`ModuleFacts`].
pub fn parse_module(path: &Path, source: &str) -> Result<ModuleFacts, ParseFailure> {
    let index = LineIndex::new(source);
    let allocator = Allocator::default();

    let ParserReturn {
        program, errors, ..
    } = Parser::new(&allocator, source, source_type_for(path)).parse();

    if let Some(error) = errors.first() {
        let span = error
            .labels
            .as_ref()
            .and_then(|labels| labels.first())
            .map_or(Span::new(0, 0), |label| {
                Span::new(label.offset() as u32, (label.offset() + label.len()) as u32)
            });
        return Err(ParseFailure {
            message: error.to_string(),
            node: index.node(NodeKind::Program, span, source),
        });
    }

    let semantic_ret = SemanticBuilder::new().build(&program);
    let scoping = semantic_ret.semantic.scoping();

    let mut extractor = DeclarationExtractor {
        scoping,
        source,
        index: &index,
        facts: ModuleFacts::default(),
    };
    extractor.collect_bindings();
    extractor.collect_declarations(&program);

    let mut collector = visitor::ReferenceCollector::new(scoping, source, &index);
    collector.visit_program(&program);

    let mut facts = extractor.facts;
    facts.references = collector.into_references();
    Ok(facts)
}

struct DeclarationExtractor<'s> {
    scoping: &'s Scoping,
    source: &'s str,
    index: &'s LineIndex,
    facts: ModuleFacts,
}

impl DeclarationExtractor<'_> {
    fn node(&self, kind: NodeKind, span: Span) -> SourceNode {
        self.index.node(kind, span, self.source)
    }

    fn collect_bindings(&mut self) {
        let root = self.scoping.root_scope_id();
        for symbol in self.scoping.symbol_ids() {
            if self.scoping.symbol_scope_id(symbol) != root {
                continue;
            }
            let flags = self.scoping.symbol_flags(symbol);
            if flags.intersects(SymbolFlags::TypeAlias | SymbolFlags::Interface) {
                continue;
            }
            self.facts.bindings.insert(
                self.scoping.symbol_name(symbol).to_string(),
                TopLevelBinding {
                    symbol,
                    hoisted_function: flags.contains(SymbolFlags::Function),
                },
            );
        }
    }

    fn collect_declarations(&mut self, program: &Program<'_>) {
        for stmt in &program.body {
            let Some(decl) = stmt.as_module_declaration() else {
                continue;
            };

            match decl {
                ModuleDeclaration::ImportDeclaration(import) => {
                    if import.import_kind.is_type() {
                        continue;
                    }

                    let mut specifiers = Vec::new();
                    for specifier in import.specifiers.iter().flatten() {
                        let (kind, imported, local) = match specifier {
                            ImportDeclarationSpecifier::ImportSpecifier(spec) => {
                                if spec.import_kind.is_type() {
                                    continue;
                                }
                                (
                                    NodeKind::ImportSpecifier,
                                    ImportName::Name(export_name(&spec.imported)),
                                    &spec.local,
                                )
                            }
                            ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => (
                                NodeKind::ImportDefaultSpecifier,
                                ImportName::Name("default".to_string()),
                                &spec.local,
                            ),
                            ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => (
                                NodeKind::ImportNamespaceSpecifier,
                                ImportName::Namespace,
                                &spec.local,
                            ),
                        };

                        specifiers.push(ImportSpecifierFacts {
                            node: self.node(kind, specifier_span(specifier)),
                            imported,
                            local: local.name.to_string(),
                            symbol: local.symbol_id.get(),
                        });
                    }

                    self.facts.imports.push(ImportDeclarationFacts {
                        node: self.node(NodeKind::ImportDeclaration, import.span),
                        source: import.source.value.to_string(),
                        specifiers,
                    });
                }

                ModuleDeclaration::ExportNamedDeclaration(export) => {
                    if export.export_kind.is_type() {
                        continue;
                    }

                    let node = self.node(NodeKind::ExportNamedDeclaration, export.span);
                    let mut bindings = Vec::new();

                    if let Some(declaration) = &export.declaration {
                        self.declaration_bindings(declaration, &node, &mut bindings);
                    } else {
                        for spec in &export.specifiers {
                            if spec.export_kind.is_type() {
                                continue;
                            }
                            let symbol = match (&export.source, &spec.local) {
                                (None, ModuleExportName::IdentifierReference(ident)) => {
                                    self.reference_symbol(ident)
                                }
                                _ => None,
                            };
                            bindings.push(ExportBindingFacts {
                                node: self.node(NodeKind::ExportSpecifier, spec.span),
                                export_name: export_name(&spec.exported),
                                local_name: export_name(&spec.local),
                                symbol,
                            });
                        }
                    }

                    if bindings.is_empty() && export.declaration.is_some() {
                        continue;
                    }

                    self.facts.exports.push(ExportDeclarationFacts::Named {
                        node,
                        source: export.source.as_ref().map(|s| s.value.to_string()),
                        bindings,
                    });
                }

                ModuleDeclaration::ExportDefaultDeclaration(export) => {
                    let symbol = match &export.declaration {
                        ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                            func.id.as_ref().and_then(|id| id.symbol_id.get())
                        }
                        ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                            class.id.as_ref().and_then(|id| id.symbol_id.get())
                        }
                        ExportDefaultDeclarationKind::Identifier(ident) => {
                            self.reference_symbol(ident)
                        }
                        ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => continue,
                        _ => None,
                    };

                    self.facts.exports.push(ExportDeclarationFacts::Default {
                        node: self.node(NodeKind::ExportDefaultDeclaration, export.span),
                        symbol,
                    });
                }

                ModuleDeclaration::ExportAllDeclaration(export) => {
                    if export.export_kind.is_type() {
                        continue;
                    }

                    self.facts.exports.push(ExportDeclarationFacts::All {
                        node: self.node(NodeKind::ExportAllDeclaration, export.span),
                        source: export.source.value.to_string(),
                        exported: export.exported.as_ref().map(export_name),
                    });
                }

                _ => {}
            }
        }
    }

    fn declaration_bindings(
        &self,
        declaration: &Declaration<'_>,
        node: &SourceNode,
        bindings: &mut Vec<ExportBindingFacts>,
    ) {
        match declaration {
            Declaration::VariableDeclaration(var) => {
                for declarator in &var.declarations {
                    match &declarator.id.kind {
                        BindingPatternKind::BindingIdentifier(id) => {
                            bindings.push(Self::binding(id, node));
                        }
                        BindingPatternKind::ObjectPattern(pattern) => {
                            self.object_pattern_bindings(pattern, node, bindings);
                        }
                        _ => {
                            warn!(
                                line = node.loc.start.line,
                                "skipping unsupported destructuring pattern in export"
                            );
                        }
                    }
                }
            }
            Declaration::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    bindings.push(Self::binding(id, node));
                }
            }
            Declaration::ClassDeclaration(class) => {
                if let Some(id) = &class.id {
                    bindings.push(Self::binding(id, node));
                }
            }
            Declaration::TSEnumDeclaration(decl) => {
                bindings.push(Self::binding(&decl.id, node));
            }
            // Type aliases, interfaces, and namespaces bind no runtime value we track.
            _ => {}
        }
    }

    /// One level of `{ key: value }` destructuring where both sides are identifiers.
    fn object_pattern_bindings(
        &self,
        pattern: &ObjectPattern<'_>,
        node: &SourceNode,
        bindings: &mut Vec<ExportBindingFacts>,
    ) {
        for property in &pattern.properties {
            match (&property.key, &property.value.kind) {
                (PropertyKey::StaticIdentifier(_), BindingPatternKind::BindingIdentifier(id)) => {
                    bindings.push(Self::binding(id, node));
                }
                _ => {
                    warn!(
                        line = node.loc.start.line,
                        "skipping unsupported object pattern property in export"
                    );
                }
            }
        }

        if pattern.rest.is_some() {
            warn!(
                line = node.loc.start.line,
                "skipping rest element in exported object pattern"
            );
        }
    }

    fn binding(id: &BindingIdentifier<'_>, node: &SourceNode) -> ExportBindingFacts {
        ExportBindingFacts {
            node: *node,
            export_name: id.name.to_string(),
            local_name: id.name.to_string(),
            symbol: id.symbol_id.get(),
        }
    }

    fn reference_symbol(&self, ident: &IdentifierReference<'_>) -> Option<SymbolId> {
        let reference_id = ident.reference_id.get()?;
        self.scoping.get_reference(reference_id).symbol_id()
    }
}

fn export_name(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(literal) => literal.value.to_string(),
    }
}

fn specifier_span(specifier: &ImportDeclarationSpecifier<'_>) -> Span {
    match specifier {
        ImportDeclarationSpecifier::ImportSpecifier(spec) => spec.span,
        ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => spec.span,
        ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => spec.span,
    }
}
