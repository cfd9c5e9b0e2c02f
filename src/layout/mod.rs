//! Layout helpers: grid snapping, grid slots for new nodes, and the default
//! layered layout given to documents whose positions come from text alone.

pub mod graph;

use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;
use crate::syntax::types::{DiagramDocument, Direction};

pub use graph::DocGraph;

/// Round `v` to the nearest multiple of `grid` (halves round up).
///
/// Coordinates beyond the `i32` range clamp to the outermost grid line;
/// NaN snaps to 0.
pub fn snap(v: f64, grid: i32) -> i32 {
    if grid <= 0 {
        return v.round() as i32;
    }
    let g = f64::from(grid);
    let steps = (v / g + 0.5)
        .floor()
        .clamp(f64::from(i32::MIN / grid), f64::from(i32::MAX / grid));
    (steps as i32) * grid
}

/// Grid position for the `count`-th node placed without coordinates.
pub fn grid_slot(count: usize, config: &LayoutConfig) -> (i32, i32) {
    let columns = config.columns.max(1);
    let col = (count % columns) as i32;
    let row = (count / columns) as i32;
    (
        config.origin_x + col * config.column_gap,
        config.origin_y + row * config.row_gap,
    )
}

/// Give every node a position from a layered layout of the graph.
///
/// Ranks follow the longest path from the sources; within a rank nodes are
/// ordered by id. TD/BT stack ranks vertically, LR/RL horizontally, and BT/RL
/// reverse the rank order.
pub fn assign_default_positions(doc: &mut DiagramDocument, config: &LayoutConfig) {
    if doc.nodes.is_empty() {
        return;
    }
    let graph = DocGraph::from_document(doc);
    let ranks = graph.ranks();

    let mut layers: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for (id, rank) in &ranks {
        layers.entry(*rank).or_default().push(id.as_str());
    }
    let max_rank = layers.keys().next_back().copied().unwrap_or(0);

    let mut slots: HashMap<String, (usize, usize)> = HashMap::new();
    for (rank, ids) in layers.iter_mut() {
        ids.sort_unstable();
        for (slot, id) in ids.iter().enumerate() {
            let rank = match doc.direction {
                Direction::BT | Direction::RL => max_rank - *rank,
                Direction::TD | Direction::LR => *rank,
            };
            slots.insert(id.to_string(), (rank, slot));
        }
    }

    let horizontal = doc.direction.is_horizontal();
    for node in &mut doc.nodes {
        let Some(&(rank, slot)) = slots.get(&node.id) else {
            continue;
        };
        let (along, across) = (rank as i32, slot as i32);
        if horizontal {
            node.x = config.origin_x + along * config.column_gap;
            node.y = config.origin_y + across * config.row_gap;
        } else {
            node.x = config.origin_x + across * config.column_gap;
            node.y = config.origin_y + along * config.row_gap;
        }
        node.width = config.node_width;
        node.height = config.node_height;
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_layout.rs"]
mod tests;
