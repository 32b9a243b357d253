//! Owned source positions for diagnostics.
//!
//! The oxc AST lives in an arena that is dropped as soon as a module has been
//! analyzed, so everything an [`Issue`](crate::Issue) needs to point back at
//! source text is copied into a [`SourceNode`].

use oxc_span::Span;
use serde::{Deserialize, Serialize};

/// The handful of AST node kinds a diagnostic can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    ImportDeclaration,
    ImportSpecifier,
    ImportDefaultSpecifier,
    ImportNamespaceSpecifier,
    ExportNamedDeclaration,
    ExportDefaultDeclaration,
    ExportAllDeclaration,
    ExportSpecifier,
    Identifier,
    Program,
}

impl NodeKind {
    /// ESTree-style node type name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ImportDeclaration => "ImportDeclaration",
            Self::ImportSpecifier => "ImportSpecifier",
            Self::ImportDefaultSpecifier => "ImportDefaultSpecifier",
            Self::ImportNamespaceSpecifier => "ImportNamespaceSpecifier",
            Self::ExportNamedDeclaration => "ExportNamedDeclaration",
            Self::ExportDefaultDeclaration => "ExportDefaultDeclaration",
            Self::ExportAllDeclaration => "ExportAllDeclaration",
            Self::ExportSpecifier => "ExportSpecifier",
            Self::Identifier => "Identifier",
            Self::Program => "Program",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line/column pair. Lines are 1-indexed, columns 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
}

/// A located AST node, detached from the arena it was parsed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceNode {
    pub kind: NodeKind,
    /// Byte offset of the first character.
    pub start: u32,
    /// Byte offset one past the last character.
    pub end: u32,
    pub loc: SourceLocation,
}

impl SourceNode {
    /// Byte range identity, used to recognise the same declaration twice.
    pub fn key(&self) -> (u32, u32) {
        (self.start, self.end)
    }
}

/// Fast line/column lookup using pre-calculated line offsets.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// Calculate the position of a byte offset.
    ///
    /// Columns count characters, not bytes, from the start of the line.
    pub fn position(&self, offset: u32, source: &str) -> Position {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(0) => 0,
            Err(idx) => idx - 1,
        };

        let line_start = self.line_starts[line_idx] as usize;
        let offset = (offset as usize).min(source.len());
        let column = source
            .get(line_start..offset)
            .map_or(0, |text| text.chars().count() as u32);

        Position {
            line: (line_idx + 1) as u32,
            column,
        }
    }

    /// Build a [`SourceNode`] for an oxc span.
    pub fn node(&self, kind: NodeKind, span: Span, source: &str) -> SourceNode {
        SourceNode {
            kind,
            start: span.start,
            end: span.end,
            loc: SourceLocation {
                start: self.position(span.start, source),
                end: self.position(span.end, source),
            },
        }
    }
}
