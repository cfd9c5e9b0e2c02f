//! Document model and diagnostics shared by every stage.

pub mod diagnostics;
pub mod types;

pub use diagnostics::{
    Diagnostic, IssueCode, IssueTarget, ParseWarning, Severity, ValidationIssue, WarningKind,
};
pub use types::{
    DiagramDocument, DiagramKind, Direction, Edge, EdgeStyle, Node, NodeShape, RawBlock, Subgraph,
};
