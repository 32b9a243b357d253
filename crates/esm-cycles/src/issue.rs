//! Findings reported by an analysis run.
//!
//! Every [`Issue`] belongs to exactly one module. Issues convert to
//! lint-style [`LintMessage`]s, grouped per file by [`into_lint_results`], so
//! any stylish-style printer can render them.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::path::PathBuf;

use crate::entries::ImportEntry;
use crate::record::ModuleId;
use crate::span::SourceNode;

/// Lint severity. Serializes as `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning = 1,
    Error = 2,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// One module on a reported cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleFrame {
    pub module: ModuleId,
    pub path: PathBuf,
    pub relative_path: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum IssueKind {
    /// A module re-entered while still evaluating. The stack starts and ends
    /// with the same module.
    ImportCycle { stack: Vec<CycleFrame> },
    /// A specifier that could not be located or read, or an import binding
    /// that could not be resolved.
    ImportError { specifier: String },
    ExportError,
    /// An imported binding read before its module executed.
    UseBeforeExecution { import: Box<ImportEntry> },
    Assertion {
        algorithm: &'static str,
        part: &'static str,
    },
    InternalError,
    ParseError,
}

impl IssueKind {
    pub fn rule_id(&self) -> &'static str {
        match self {
            Self::ImportCycle { .. } => "import-cycle",
            Self::ImportError { .. } => "import-error",
            Self::ExportError => "export-error",
            Self::UseBeforeExecution { .. } => "use-before-execution",
            Self::Assertion { .. } => "assertion",
            Self::InternalError => "internal-error",
            Self::ParseError => "parse-error",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::ImportCycle { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub module: ModuleId,
    pub file_path: PathBuf,
    pub relative_path: String,
    #[serde(flatten)]
    pub kind: IssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<SourceNode>,
    pub message: String,
}

impl Issue {
    pub fn rule_id(&self) -> &'static str {
        self.kind.rule_id()
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self.kind, IssueKind::ImportCycle { .. })
    }

    pub fn to_lint_message(&self) -> LintMessage {
        let (node_type, line, column, end_line, end_column) = match &self.node {
            Some(node) => (
                node.kind.as_str().to_string(),
                node.loc.start.line,
                node.loc.start.column,
                Some(node.loc.end.line),
                Some(node.loc.end.column),
            ),
            None => (String::new(), 0, 1, None, None),
        };

        LintMessage {
            rule_id: self.rule_id().to_string(),
            message: self.message.clone(),
            severity: self.severity(),
            node_type,
            line,
            column,
            end_line,
            end_column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintMessage {
    pub rule_id: String,
    pub message: String,
    pub severity: Severity,
    pub node_type: String,
    pub line: u32,
    pub column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
}

/// Messages of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintResult {
    pub file_path: PathBuf,
    pub messages: Vec<LintMessage>,
    pub error_count: usize,
    pub warning_count: usize,
    pub fixable_error_count: usize,
    pub fixable_warning_count: usize,
}

impl LintResult {
    fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            messages: Vec::new(),
            error_count: 0,
            warning_count: 0,
            fixable_error_count: 0,
            fixable_warning_count: 0,
        }
    }

    fn push(&mut self, message: LintMessage) {
        match message.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        self.messages.push(message);
    }
}

/// Group consecutive issues of the same file into lint results.
///
/// Sort with [`sort_issues`] first to get exactly one result per file.
pub fn into_lint_results<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Vec<LintResult> {
    let mut results: Vec<LintResult> = Vec::new();
    for issue in issues {
        let message = issue.to_lint_message();
        match results.last_mut() {
            Some(current) if current.file_path == issue.file_path => current.push(message),
            _ => {
                let mut result = LintResult::new(issue.file_path.clone());
                result.push(message);
                results.push(result);
            }
        }
    }
    results
}

fn compare_nodes(a: Option<&SourceNode>, b: Option<&SourceNode>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.loc.cmp(&b.loc),
    }
}

/// Canonical issue order: file, rule id, position, message.
pub fn compare_issues(a: &Issue, b: &Issue) -> Ordering {
    a.file_path
        .cmp(&b.file_path)
        .then_with(|| a.rule_id().cmp(b.rule_id()))
        .then_with(|| compare_nodes(a.node.as_ref(), b.node.as_ref()))
        .then_with(|| a.message.cmp(&b.message))
}

pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(compare_issues);
}
