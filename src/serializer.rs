//! Serializer — DiagramDocument → Mermaid flowchart text.
//!
//! Output order: header, subgraph blocks (members, then nested blocks),
//! remaining top-level nodes, edges, raw blocks. Every line ends with `\n`
//! and nested lines are indented four spaces per level.

use std::collections::HashSet;

use crate::syntax::types::{
    DiagramDocument, DiagramKind, Edge, Node, Subgraph, positional_edge_id,
};

const INDENT: &str = "    ";

/// Characters that force a node label or subgraph title into quotes.
const LABEL_SPECIALS: &[char] = &['[', ']', '(', ')', '{', '}', '|', '"', '<', '>', '/', '\\'];

/// Characters that force an edge label into quotes.
const EDGE_LABEL_SPECIALS: &[char] = &['|', '"', '\\'];

/// Serialize a document to flowchart text. Total and deterministic.
pub fn serialize(doc: &DiagramDocument) -> String {
    let mut out = String::new();
    if !is_foreign_passthrough(doc) {
        out.push_str("flowchart ");
        out.push_str(doc.direction.keyword());
        out.push('\n');
    }

    let existing: HashSet<&str> = doc.subgraphs.iter().map(|s| s.id.as_str()).collect();
    let mut visited_subgraphs: HashSet<&str> = HashSet::new();
    let mut emitted_nodes: HashSet<&str> = HashSet::new();

    let roots = doc
        .subgraphs
        .iter()
        .filter(|s| s.parent.as_deref().is_none_or(|p| !existing.contains(p)));
    for sg in roots {
        emit_subgraph(doc, sg, 0, &mut out, &mut visited_subgraphs, &mut emitted_nodes);
    }
    // Subgraphs only reachable through a nesting cycle.
    for sg in &doc.subgraphs {
        if !visited_subgraphs.contains(sg.id.as_str()) {
            emit_subgraph(doc, sg, 0, &mut out, &mut visited_subgraphs, &mut emitted_nodes);
        }
    }

    for node in &doc.nodes {
        if emitted_nodes.insert(node.id.as_str()) {
            out.push_str(&node_decl(node));
            out.push('\n');
        }
    }

    for (k, edge) in doc.edges.iter().enumerate() {
        out.push_str(&edge_line(edge, k));
        out.push('\n');
    }

    for raw in &doc.raw_blocks {
        out.push_str(&raw.text);
        out.push('\n');
    }
    out
}

/// A document parsed from another diagram type is written back without a
/// flowchart header, so it re-parses the same way. Once it gains flowchart
/// content it is a flowchart again.
fn is_foreign_passthrough(doc: &DiagramDocument) -> bool {
    doc.kind == DiagramKind::Other
        && doc.nodes.is_empty()
        && doc.edges.is_empty()
        && doc.subgraphs.is_empty()
}

fn emit_subgraph<'a>(
    doc: &'a DiagramDocument,
    sg: &'a Subgraph,
    depth: usize,
    out: &mut String,
    visited: &mut HashSet<&'a str>,
    emitted: &mut HashSet<&'a str>,
) {
    if !visited.insert(sg.id.as_str()) {
        return;
    }
    let pad = INDENT.repeat(depth);
    let inner = INDENT.repeat(depth + 1);

    out.push_str(&pad);
    out.push_str("subgraph ");
    out.push_str(&sg.id);
    if let Some(title) = &sg.title {
        out.push_str(" [");
        out.push_str(&label_text(title));
        out.push(']');
    }
    out.push('\n');

    if let Some(direction) = sg.direction {
        out.push_str(&inner);
        out.push_str("direction ");
        out.push_str(direction.keyword());
        out.push('\n');
    }

    for member in &sg.nodes {
        let Some(node) = doc.node(member) else {
            continue;
        };
        if emitted.insert(node.id.as_str()) {
            out.push_str(&inner);
            out.push_str(&node_decl(node));
            out.push('\n');
        }
    }

    for child in doc
        .subgraphs
        .iter()
        .filter(|c| c.parent.as_deref() == Some(sg.id.as_str()))
    {
        emit_subgraph(doc, child, depth + 1, out, visited, emitted);
    }

    out.push_str(&pad);
    out.push_str("end\n");
}

/// `id` for bare nodes, `id<open>label<close>` otherwise.
pub fn node_decl(node: &Node) -> String {
    if node.is_bare() {
        return node.id.clone();
    }
    let (open, close) = node.shape.delimiters();
    format!("{}{open}{}{close}", node.id, label_text(&node.label))
}

fn edge_line(edge: &Edge, position: usize) -> String {
    let mut line = edge.source.clone();
    line.push(' ');
    if let Some(id) = &edge.id {
        if *id != positional_edge_id(position) {
            line.push_str(id);
            line.push('@');
        }
    }
    line.push_str(edge.style.token());
    if let Some(label) = &edge.label {
        line.push('|');
        if needs_quotes(label, EDGE_LABEL_SPECIALS) {
            line.push_str(&quote(label));
        } else {
            line.push_str(label);
        }
        line.push('|');
    }
    line.push(' ');
    line.push_str(&edge.target);
    line
}

fn label_text(label: &str) -> String {
    if label.is_empty() || needs_quotes(label, LABEL_SPECIALS) {
        quote(label)
    } else {
        label.to_string()
    }
}

fn needs_quotes(text: &str, specials: &[char]) -> bool {
    text.contains(specials) || text.contains('\n') || text.trim() != text
}

/// Double-quote `text`, escaping `"`, `\` and newlines.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
#[path = "../tests/rust/test_serializer.rs"]
mod tests;
