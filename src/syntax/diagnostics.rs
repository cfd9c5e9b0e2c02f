//! Diagnostics produced by the parser and the validator.
//!
//! Two channels that never mix: [`ParseWarning`]s describe text the parser
//! could not model (always kept as raw blocks), [`ValidationIssue`]s describe
//! referential problems in a document. [`Diagnostic`] is the tagged union the
//! editing surface displays.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The document is inconsistent, e.g. an edge points at nothing.
    Error,
    /// Advisory; the document is usable as-is.
    Warning,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

// ─── Parse warnings ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WarningKind {
    /// Content without a `flowchart`/`graph` header.
    MissingHeader,
    /// Header with a direction keyword that is not understood.
    MalformedHeader { token: String },
    /// The text is a different diagram type (e.g. `sequenceDiagram`).
    UnsupportedDiagram { diagram: String },
    /// A statement keyword the document model has no place for.
    UnsupportedStatement { keyword: String },
    /// A node reference spelled like a statement keyword (`end`, `class`, ...).
    ReservedNodeId { node: String },
    /// A line that matches no statement form.
    UnrecognizedLine,
    /// A shape bracket that is never closed.
    UnbalancedShape,
    /// A shape bracket closed by the wrong delimiter.
    MalformedShape { node: String },
    /// A node defined twice with different label or shape.
    NodeRedefined { node: String },
    /// An explicit edge id used twice.
    DuplicateEdgeId { edge: String },
    /// A subgraph id opened twice; members are merged.
    DuplicateSubgraph { subgraph: String },
    /// `end` without an open subgraph.
    StrayEnd,
    /// A subgraph still open at the end of the text.
    UnclosedSubgraph { subgraph: String },
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::MissingHeader => {
                write!(f, "missing 'flowchart' header; assuming top-down")
            }
            WarningKind::MalformedHeader { token } => {
                write!(f, "unknown direction '{token}' in header; kept as raw text")
            }
            WarningKind::UnsupportedDiagram { diagram } => {
                write!(f, "'{diagram}' diagrams are not supported; kept as raw text")
            }
            WarningKind::UnsupportedStatement { keyword } => {
                write!(f, "'{keyword}' statements are not supported; kept as raw text")
            }
            WarningKind::ReservedNodeId { node } => {
                write!(f, "'{node}' is a keyword and cannot name a node; kept as raw text")
            }
            WarningKind::UnrecognizedLine => write!(f, "unrecognized line; kept as raw text"),
            WarningKind::UnbalancedShape => {
                write!(f, "unbalanced shape delimiters; kept as raw text")
            }
            WarningKind::MalformedShape { node } => {
                write!(f, "malformed shape delimiters on '{node}'; using a rectangle")
            }
            WarningKind::NodeRedefined { node } => {
                write!(f, "node '{node}' is redefined; the later definition wins")
            }
            WarningKind::DuplicateEdgeId { edge } => {
                write!(f, "edge id '{edge}' is already used; a new id will be assigned")
            }
            WarningKind::DuplicateSubgraph { subgraph } => {
                write!(f, "subgraph '{subgraph}' is opened twice; members are merged")
            }
            WarningKind::StrayEnd => write!(f, "'end' without an open subgraph; kept as raw text"),
            WarningKind::UnclosedSubgraph { subgraph } => {
                write!(f, "subgraph '{subgraph}' is never closed")
            }
        }
    }
}

/// A non-fatal note about an unsupported or ambiguous construct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// 1-based source line.
    pub line: usize,
    pub kind: WarningKind,
    /// The offending source line, trimmed.
    pub source: String,
}

impl ParseWarning {
    pub fn new(line: usize, kind: WarningKind, source: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            source: source.into(),
        }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

// ─── Validation issues ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCode {
    MissingEndpoint,
    DuplicateNodeId,
    DuplicateEdgeId,
    DuplicateSubgraphId,
    SelfLoop,
    MissingMember,
    MissingParent,
    SharedMember,
    NestingCycle,
}

/// What a validation issue points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum IssueTarget {
    Node(String),
    Edge(String),
    Subgraph(String),
}

impl IssueTarget {
    pub fn id(&self) -> &str {
        match self {
            IssueTarget::Node(id) | IssueTarget::Edge(id) | IssueTarget::Subgraph(id) => id,
        }
    }
}

impl fmt::Display for IssueTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueTarget::Node(id) => write!(f, "node '{id}'"),
            IssueTarget::Edge(id) => write!(f, "edge '{id}'"),
            IssueTarget::Subgraph(id) => write!(f, "subgraph '{id}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    pub target: IssueTarget,
}

impl ValidationIssue {
    pub fn error(code: IssueCode, target: IssueTarget, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            target,
        }
    }

    pub fn warning(code: IssueCode, target: IssueTarget, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            target,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.severity, self.message, self.target)
    }
}

// ─── Diagnostic ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "lowercase")]
pub enum Diagnostic {
    Parse(ParseWarning),
    Validation(ValidationIssue),
}

impl Diagnostic {
    /// Parse warnings are always advisory.
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::Parse(_) => Severity::Warning,
            Diagnostic::Validation(issue) => issue.severity,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Diagnostic::Parse(w) => w.message(),
            Diagnostic::Validation(issue) => issue.message.clone(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Parse(w) => write!(f, "warning: {w}"),
            Diagnostic::Validation(issue) => write!(f, "{issue}"),
        }
    }
}

impl From<ParseWarning> for Diagnostic {
    fn from(w: ParseWarning) -> Self {
        Diagnostic::Parse(w)
    }
}

impl From<ValidationIssue> for Diagnostic {
    fn from(issue: ValidationIssue) -> Self {
        Diagnostic::Validation(issue)
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_syntax_diagnostics.rs"]
mod tests;
