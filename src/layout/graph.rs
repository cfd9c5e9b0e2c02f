//! DocGraph — converts a document into a petgraph DiGraph for layout and analysis.
//!
//! Nodes are inserted in ascending id order and edges in ascending
//! `(source, target)` order, so every query below depends only on the node
//! and edge sets, never on the order entities appear in the document.

use std::collections::HashMap;

use petgraph::Direction as EdgeDirection;
use petgraph::algo::{condensation, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::syntax::types::{DiagramDocument, EdgeStyle};

/// Graph view of a document's nodes and resolvable edges.
pub struct DocGraph {
    pub digraph: DiGraph<String, EdgeStyle>,
    /// Maps node id → petgraph NodeIndex.
    pub node_index: HashMap<String, NodeIndex>,
}

impl DocGraph {
    /// Build a DocGraph from a document. Edges whose endpoints are not nodes
    /// (dangling, or pointing at a subgraph) are left out.
    pub fn from_document(doc: &DiagramDocument) -> Self {
        let mut digraph: DiGraph<String, EdgeStyle> = DiGraph::new();
        let mut node_index: HashMap<String, NodeIndex> = HashMap::new();

        let mut ids: Vec<&str> = doc.nodes.iter().map(|n| n.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        for id in ids {
            let idx = digraph.add_node(id.to_string());
            node_index.insert(id.to_string(), idx);
        }

        let mut edges: Vec<(&str, &str, EdgeStyle)> = doc
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str(), e.style))
            .collect();
        edges.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        for (source, target, style) in edges {
            if let (Some(&from), Some(&to)) = (node_index.get(source), node_index.get(target)) {
                digraph.add_edge(from, to, style);
            }
        }

        Self {
            digraph,
            node_index,
        }
    }

    /// Longest-path rank of every node. Nodes on a common cycle share a rank.
    pub fn ranks(&self) -> HashMap<String, usize> {
        let condensed = condensation(self.digraph.clone(), true);
        let mut rank_of_component = vec![0usize; condensed.node_count()];
        if let Ok(order) = toposort(&condensed, None) {
            for idx in order {
                let rank = condensed
                    .neighbors_directed(idx, EdgeDirection::Incoming)
                    .map(|pred| rank_of_component[pred.index()] + 1)
                    .max()
                    .unwrap_or(0);
                rank_of_component[idx.index()] = rank;
            }
        }
        let mut ranks = HashMap::new();
        for idx in condensed.node_indices() {
            for id in &condensed[idx] {
                ranks.insert(id.clone(), rank_of_component[idx.index()]);
            }
        }
        ranks
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_layout_graph.rs"]
mod tests;
