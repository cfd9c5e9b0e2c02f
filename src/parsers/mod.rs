//! Parser registry — detect diagram type and dispatch to the flowchart parser.

pub mod base;
pub mod flowchart;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use base::Parser;
pub use flowchart::FlowchartParser;

use crate::syntax::diagnostics::ParseWarning;
use crate::syntax::types::DiagramDocument;

/// Output of [`parse`]: a usable document plus non-fatal warnings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseResult {
    pub doc: DiagramDocument,
    pub warnings: Vec<ParseWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    Flowchart,
    Sequence,
    Class,
    State,
    Er,
    Gantt,
    Pie,
    Git,
    Mindmap,
    Timeline,
    Unknown,
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagramType::Flowchart => "flowchart",
            DiagramType::Sequence => "sequence",
            DiagramType::Class => "class",
            DiagramType::State => "state",
            DiagramType::Er => "er",
            DiagramType::Gantt => "gantt",
            DiagramType::Pie => "pie",
            DiagramType::Git => "git",
            DiagramType::Mindmap => "mindmap",
            DiagramType::Timeline => "timeline",
            DiagramType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

static DIAGRAM_PATTERNS: LazyLock<Vec<(Regex, DiagramType)>> = LazyLock::new(|| {
    [
        (r"(?i)^(flowchart|graph)\b", DiagramType::Flowchart),
        (r"(?i)^sequenceDiagram\b", DiagramType::Sequence),
        (r"(?i)^classDiagram\b", DiagramType::Class),
        (r"(?i)^stateDiagram(-v2)?\b", DiagramType::State),
        (r"(?i)^erDiagram\b", DiagramType::Er),
        (r"(?i)^gantt\b", DiagramType::Gantt),
        (r"(?i)^pie\b", DiagramType::Pie),
        (r"(?i)^gitGraph\b", DiagramType::Git),
        (r"(?i)^mindmap\b", DiagramType::Mindmap),
        (r"(?i)^timeline\b", DiagramType::Timeline),
    ]
    .into_iter()
    .filter_map(|(pattern, kind)| Regex::new(pattern).ok().map(|re| (re, kind)))
    .collect()
});

/// Classify a single (trimmed) header line.
pub fn detect_line_type(line: &str) -> DiagramType {
    DIAGRAM_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(line))
        .map(|(_, kind)| *kind)
        .unwrap_or(DiagramType::Unknown)
}

/// Parse Mermaid flowchart text into a document plus warnings. Never fails.
pub fn parse(src: &str) -> ParseResult {
    FlowchartParser.parse(src)
}

#[cfg(test)]
#[path = "../../tests/rust/test_parsers_registry.rs"]
mod tests;
