//! Line-oriented parser for Mermaid flowchart/graph text.
//!
//! Each meaningful line is classified as header, subgraph open/close,
//! `direction`, node or edge statement. Everything else is kept verbatim as a
//! raw block with a warning, so no user text is ever dropped. `%%{...}%%`
//! directives are kept as raw blocks without one; other `%%` comments are
//! skipped.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::config::LayoutConfig;
use crate::layout::assign_default_positions;
use crate::syntax::diagnostics::{ParseWarning, WarningKind};
use crate::syntax::types::{
    DiagramDocument, DiagramKind, Direction, Edge, Node, RawBlock, Subgraph,
};

use super::base::{Cursor, EdgeSegment, NodeRef, Parser};
use super::{DiagramType, ParseResult, detect_line_type};

/// Statement keywords the document model does not represent.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "classDef", "class", "style", "linkStyle", "click", "accTitle", "accDescr",
];

/// Keywords that cannot stand as a node id without changing how the line
/// reads back.
const STRUCTURE_KEYWORDS: &[&str] = &["end", "subgraph", "direction"];

fn is_reserved_id(id: &str) -> bool {
    STRUCTURE_KEYWORDS.contains(&id) || UNSUPPORTED_KEYWORDS.contains(&id)
}

/// Line-oriented parser for Mermaid flowchart/graph diagrams.
pub struct FlowchartParser;

impl Parser for FlowchartParser {
    fn parse(&self, src: &str) -> ParseResult {
        let mut builder = DocumentBuilder::default();
        let mut seen_header = false;
        let mut foreign = false;

        for (idx, line) in src.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.starts_with("%%{") {
                builder.keep_raw(line);
                continue;
            }
            if trimmed.is_empty() || trimmed.starts_with("%%") {
                continue;
            }
            if foreign {
                builder.keep_raw(line);
                continue;
            }
            if !seen_header {
                seen_header = true;
                match classify_header(trimmed) {
                    Header::Flowchart(direction) => {
                        builder.direction = direction;
                        continue;
                    }
                    Header::BadDirection(token) => {
                        builder.raw(line_no, line, WarningKind::MalformedHeader { token });
                        continue;
                    }
                    Header::Foreign(diagram) => {
                        foreign = true;
                        builder.kind = DiagramKind::Other;
                        let kind = WarningKind::UnsupportedDiagram {
                            diagram: diagram.to_string(),
                        };
                        builder.raw(line_no, line, kind);
                        continue;
                    }
                    Header::Absent => {
                        builder.warn(line_no, WarningKind::MissingHeader, trimmed);
                    }
                }
            }
            builder.statement(line_no, line);
        }

        builder.finish()
    }
}

// ─── Header ──────────────────────────────────────────────────────────────────

enum Header {
    Flowchart(Direction),
    BadDirection(String),
    Foreign(DiagramType),
    Absent,
}

fn classify_header(line: &str) -> Header {
    match detect_line_type(line) {
        DiagramType::Flowchart => {
            let mut c = Cursor::new(line);
            c.match_word();
            let rest = c.rest();
            let token = rest.trim().trim_end_matches(';').trim();
            if token.is_empty() {
                return Header::Flowchart(Direction::default());
            }
            match Direction::from_keyword(token) {
                Some(direction) => Header::Flowchart(direction),
                None => Header::BadDirection(token.to_string()),
            }
        }
        DiagramType::Unknown => Header::Absent,
        other => Header::Foreign(other),
    }
}

/// Split a `subgraph` header remainder into `(id, title)`.
///
/// `id`, `id [Title]` and `id["Title"]` carry an id; a quoted or free-text
/// title without a usable id yields `None` and gets a synthetic id later.
fn parse_subgraph_header(rest: &str) -> (Option<String>, Option<String>) {
    let text = rest.trim().trim_end_matches(';').trim();
    if text.is_empty() {
        return (None, None);
    }
    let mut c = Cursor::new(text);
    if c.peek("\"") {
        if let Some(title) = c.parse_quoted_string() {
            if c.at_statement_end() {
                return (None, Some(title));
            }
        }
        return (None, Some(text.to_string()));
    }
    if let Some(id) = c.match_node_id() {
        let after_id = c.pos;
        if c.at_statement_end() {
            return (Some(id), None);
        }
        c.pos = after_id;
        if let Some(title) = c.parse_bracket_title() {
            if c.at_statement_end() {
                return (Some(id), Some(title));
            }
        }
    }
    (None, Some(text.to_string()))
}

// ─── Document builder ────────────────────────────────────────────────────────

struct SubgraphDraft {
    id: Option<String>,
    title: Option<String>,
    direction: Option<Direction>,
    parent: Option<usize>,
    members: Vec<String>,
    line: usize,
}

#[derive(Default)]
struct DocumentBuilder {
    kind: DiagramKind,
    direction: Direction,
    nodes: Vec<Node>,
    node_index: HashMap<String, usize>,
    /// Nodes declared by a standalone statement or a shape bracket.
    declared: HashSet<String>,
    /// Nodes whose label/shape came from a bracket.
    shaped: HashSet<String>,
    membership: HashMap<String, usize>,
    edges: Vec<Edge>,
    edge_ids: HashSet<String>,
    subgraphs: Vec<SubgraphDraft>,
    subgraph_ids: HashMap<String, usize>,
    open: Vec<usize>,
    raw_blocks: Vec<RawBlock>,
    warnings: Vec<ParseWarning>,
}

impl DocumentBuilder {
    fn warn(&mut self, line: usize, kind: WarningKind, source: &str) {
        trace!(line; "{kind}");
        self.warnings.push(ParseWarning::new(line, kind, source.trim()));
    }

    fn keep_raw(&mut self, line: &str) {
        let ordinal = self.raw_blocks.len() + 1;
        self.raw_blocks.push(RawBlock::new(ordinal, line));
    }

    /// Keep `line` verbatim as a raw block and explain why.
    fn raw(&mut self, line_no: usize, line: &str, kind: WarningKind) {
        self.keep_raw(line);
        self.warn(line_no, kind, line);
    }

    fn statement(&mut self, line_no: usize, line: &str) {
        let trimmed = line.trim();
        let mut c = Cursor::new(trimmed);
        let word = c.match_word().unwrap_or_default();
        match word.as_str() {
            "subgraph" => {
                let rest = c.rest();
                if rest.is_empty() || rest.starts_with([' ', '\t']) {
                    self.open_subgraph(line_no, &rest, line);
                    return;
                }
            }
            "end" if c.at_statement_end() => {
                if self.open.pop().is_none() {
                    self.raw(line_no, line, WarningKind::StrayEnd);
                }
                return;
            }
            "direction" => {
                let rest = c.rest();
                let token = rest.trim().trim_end_matches(';').trim();
                match (Direction::from_keyword(token), self.open.last()) {
                    (Some(direction), Some(&sg)) => self.subgraphs[sg].direction = Some(direction),
                    _ => {
                        let kind = WarningKind::UnsupportedStatement {
                            keyword: word.clone(),
                        };
                        self.raw(line_no, line, kind);
                    }
                }
                return;
            }
            w if UNSUPPORTED_KEYWORDS.contains(&w) => {
                let kind = WarningKind::UnsupportedStatement { keyword: word.clone() };
                self.raw(line_no, line, kind);
                return;
            }
            _ => {}
        }

        let mut c = Cursor::new(trimmed);
        if let Some(source) = c.parse_node_ref() {
            let segments = c.parse_edge_chain();
            if c.at_statement_end() {
                let reserved = std::iter::once(&source)
                    .chain(segments.iter().map(|seg| &seg.target))
                    .find(|r| is_reserved_id(&r.id));
                if let Some(r) = reserved {
                    let kind = WarningKind::ReservedNodeId { node: r.id.clone() };
                    self.raw(line_no, line, kind);
                    return;
                }
                self.apply_statement(line_no, trimmed, source, segments);
                return;
            }
        }
        let kind = if c.unbalanced {
            WarningKind::UnbalancedShape
        } else {
            WarningKind::UnrecognizedLine
        };
        self.raw(line_no, line, kind);
    }

    fn apply_statement(
        &mut self,
        line_no: usize,
        source_text: &str,
        source: NodeRef,
        segments: Vec<EdgeSegment>,
    ) {
        let standalone = segments.is_empty();
        self.touch_node(line_no, source_text, &source, standalone);
        let mut prev = source.id;
        for seg in segments {
            self.touch_node(line_no, source_text, &seg.target, false);
            let mut edge = Edge::new(prev.clone(), seg.target.id.clone(), seg.style);
            edge.label = seg.label;
            if let Some(id) = seg.id {
                if self.edge_ids.insert(id.clone()) {
                    edge.id = Some(id);
                } else {
                    self.warn(line_no, WarningKind::DuplicateEdgeId { edge: id }, source_text);
                }
            }
            self.edges.push(edge);
            prev = seg.target.id;
        }
    }

    /// Create or update the node a reference names, binding it to the
    /// innermost open subgraph when it is first seen or first declared there.
    fn touch_node(&mut self, line_no: usize, source_text: &str, r: &NodeRef, standalone: bool) {
        let declares = standalone || r.is_explicit();
        if r.degraded {
            let kind = WarningKind::MalformedShape { node: r.id.clone() };
            self.warn(line_no, kind, source_text);
        }
        match self.node_index.get(&r.id).copied() {
            None => {
                let node = match &r.shape {
                    Some((shape, label)) => Node::new(r.id.clone(), label.clone(), *shape),
                    None => Node::bare(r.id.clone()),
                };
                self.node_index.insert(r.id.clone(), self.nodes.len());
                self.nodes.push(node);
                if let Some(&sg) = self.open.last() {
                    self.bind(&r.id, sg);
                }
            }
            Some(i) => {
                if let Some((shape, label)) = &r.shape {
                    let changed = self.nodes[i].label != *label || self.nodes[i].shape != *shape;
                    if changed && self.shaped.contains(&r.id) {
                        let kind = WarningKind::NodeRedefined { node: r.id.clone() };
                        self.warn(line_no, kind, source_text);
                    }
                    self.nodes[i].label = label.clone();
                    self.nodes[i].shape = *shape;
                }
                if declares && !self.membership.contains_key(&r.id) {
                    if let Some(&sg) = self.open.last() {
                        self.bind(&r.id, sg);
                    }
                }
            }
        }
        if r.is_explicit() {
            self.shaped.insert(r.id.clone());
        }
        if declares {
            self.declared.insert(r.id.clone());
        }
    }

    fn bind(&mut self, node_id: &str, sg: usize) {
        self.membership.insert(node_id.to_string(), sg);
        self.subgraphs[sg].members.push(node_id.to_string());
    }

    fn open_subgraph(&mut self, line_no: usize, rest: &str, line: &str) {
        let (id, title) = parse_subgraph_header(rest);
        if let Some(existing) = id.as_ref().and_then(|id| self.subgraph_ids.get(id)).copied() {
            let kind = WarningKind::DuplicateSubgraph {
                subgraph: id.clone().unwrap_or_default(),
            };
            self.warn(line_no, kind, line);
            let draft = &mut self.subgraphs[existing];
            if draft.title.is_none() {
                draft.title = title;
            }
            self.open.push(existing);
            return;
        }
        let idx = self.subgraphs.len();
        if let Some(id) = &id {
            self.subgraph_ids.insert(id.clone(), idx);
        }
        self.subgraphs.push(SubgraphDraft {
            id,
            title,
            direction: None,
            parent: self.open.last().copied(),
            members: Vec::new(),
            line: line_no,
        });
        self.open.push(idx);
    }

    fn finish(mut self) -> ParseResult {
        let unclosed: Vec<usize> = self.open.drain(..).rev().collect();

        // Anonymous subgraphs take the first free `sg-{n}`.
        let mut taken: HashSet<String> = self.subgraph_ids.keys().cloned().collect();
        let mut n = 1;
        for draft in self.subgraphs.iter_mut().filter(|d| d.id.is_none()) {
            let id = loop {
                let candidate = format!("sg-{n}");
                n += 1;
                if !taken.contains(&candidate) {
                    break candidate;
                }
            };
            taken.insert(id.clone());
            draft.id = Some(id);
        }
        let ids: Vec<String> = self
            .subgraphs
            .iter()
            .map(|d| d.id.clone().unwrap_or_default())
            .collect();

        for idx in unclosed {
            let line = self.subgraphs[idx].line;
            let kind = WarningKind::UnclosedSubgraph {
                subgraph: ids[idx].clone(),
            };
            self.warn(line, kind, &format!("subgraph {}", ids[idx]));
        }

        // Edge endpoints that name a subgraph link to the group, not to a node.
        let shadowed: HashSet<&String> = ids
            .iter()
            .filter(|id| {
                self.node_index.contains_key(id.as_str()) && !self.declared.contains(id.as_str())
            })
            .collect();
        self.nodes.retain(|n| !shadowed.contains(&n.id));
        for draft in &mut self.subgraphs {
            draft.members.retain(|m| !shadowed.contains(m));
        }

        let subgraphs = self
            .subgraphs
            .into_iter()
            .enumerate()
            .map(|(idx, draft)| Subgraph {
                id: ids[idx].clone(),
                title: draft.title,
                direction: draft.direction,
                parent: draft.parent.map(|p| ids[p].clone()),
                nodes: draft.members,
            })
            .collect();

        let mut doc = DiagramDocument {
            kind: self.kind,
            direction: self.direction,
            nodes: self.nodes,
            edges: self.edges,
            subgraphs,
            raw_blocks: self.raw_blocks,
            ..DiagramDocument::default()
        };
        assign_default_positions(&mut doc, &LayoutConfig::default());

        debug!(
            nodes = doc.nodes.len(),
            edges = doc.edges.len(),
            subgraphs = doc.subgraphs.len(),
            raw_blocks = doc.raw_blocks.len(),
            warnings = self.warnings.len();
            "Parsed flowchart"
        );

        ParseResult {
            doc,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_parsers_flowchart.rs"]
mod tests;
