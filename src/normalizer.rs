//! Normalizer — canonical ordering so documents compare and cache by value.

use crate::syntax::types::{DiagramDocument, resolved_edge_ids};

/// Canonicalize a document.
///
/// Edges without an id get `e-{index+1}` from their current position (the
/// next free `e-{n}` when that id is already taken), then nodes, edges,
/// subgraphs and raw blocks are each sorted by id. Idempotent.
pub fn normalize(doc: &DiagramDocument) -> DiagramDocument {
    let mut out = doc.clone();

    let ids = resolved_edge_ids(&out.edges);
    for (edge, id) in out.edges.iter_mut().zip(ids) {
        edge.id = Some(id);
    }

    out.nodes.sort_by(|a, b| a.id.cmp(&b.id));
    out.edges.sort_by(|a, b| a.id.cmp(&b.id));
    out.subgraphs.sort_by(|a, b| a.id.cmp(&b.id));
    out.raw_blocks.sort_by(|a, b| a.id.cmp(&b.id));
    out
}

#[cfg(test)]
#[path = "../tests/rust/test_normalizer.rs"]
mod tests;
