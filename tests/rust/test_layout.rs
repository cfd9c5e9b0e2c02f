use super::*;
use crate::syntax::types::{Edge, EdgeStyle, Node};

fn chain(direction: Direction) -> DiagramDocument {
    DiagramDocument {
        direction,
        nodes: vec![Node::bare("A"), Node::bare("B"), Node::bare("C")],
        edges: vec![
            Edge::new("A", "B", EdgeStyle::Arrow),
            Edge::new("A", "C", EdgeStyle::Arrow),
        ],
        ..DiagramDocument::default()
    }
}

fn pos(doc: &DiagramDocument, id: &str) -> (i32, i32) {
    let n = doc.node(id).unwrap();
    (n.x, n.y)
}

#[test]
fn test_snap_rounds_to_grid() {
    assert_eq!(snap(0.0, 10), 0);
    assert_eq!(snap(14.9, 10), 10);
    assert_eq!(snap(15.0, 10), 20);
    assert_eq!(snap(123.0, 10), 120);
    assert_eq!(snap(-14.0, 10), -10);
    assert_eq!(snap(-15.0, 10), -10);
    assert_eq!(snap(-16.0, 10), -20);
}

#[test]
fn test_snap_clamps_huge_coordinates() {
    assert_eq!(snap(1e12, 10), 2_147_483_640);
    assert_eq!(snap(-1e12, 10), -2_147_483_640);
    assert_eq!(snap(f64::INFINITY, 10), 2_147_483_640);
    assert_eq!(snap(f64::NAN, 10), 0);
    assert_eq!(snap(1e12, 0), i32::MAX);
}

#[test]
fn test_snap_without_grid() {
    assert_eq!(snap(12.4, 0), 12);
}

#[test]
fn test_grid_slot() {
    let config = LayoutConfig::default();
    assert_eq!(grid_slot(0, &config), (120, 100));
    assert_eq!(grid_slot(1, &config), (360, 100));
    assert_eq!(grid_slot(3, &config), (840, 100));
    assert_eq!(grid_slot(4, &config), (120, 240));
    assert_eq!(grid_slot(9, &config), (360, 380));
}

#[test]
fn test_positions_top_down() {
    let mut doc = chain(Direction::TD);
    assign_default_positions(&mut doc, &LayoutConfig::default());
    assert_eq!(pos(&doc, "A"), (120, 100));
    assert_eq!(pos(&doc, "B"), (120, 240));
    assert_eq!(pos(&doc, "C"), (360, 240));
}

#[test]
fn test_positions_bottom_up() {
    let mut doc = chain(Direction::BT);
    assign_default_positions(&mut doc, &LayoutConfig::default());
    assert_eq!(pos(&doc, "A"), (120, 240));
    assert_eq!(pos(&doc, "B"), (120, 100));
}

#[test]
fn test_positions_left_right() {
    let mut doc = chain(Direction::LR);
    assign_default_positions(&mut doc, &LayoutConfig::default());
    assert_eq!(pos(&doc, "A"), (120, 100));
    assert_eq!(pos(&doc, "B"), (360, 100));
    assert_eq!(pos(&doc, "C"), (360, 240));
}

#[test]
fn test_positions_right_left() {
    let mut doc = chain(Direction::RL);
    assign_default_positions(&mut doc, &LayoutConfig::default());
    assert_eq!(pos(&doc, "A"), (360, 100));
    assert_eq!(pos(&doc, "C"), (120, 240));
}

#[test]
fn test_positions_reset_size() {
    let mut doc = chain(Direction::TD);
    doc.nodes[0].width = 10;
    let config = LayoutConfig::default();
    assign_default_positions(&mut doc, &config);
    assert_eq!(doc.nodes[0].width, config.node_width);
}

#[test]
fn test_positions_independent_of_node_order() {
    let mut a = chain(Direction::TD);
    let mut b = chain(Direction::TD);
    b.nodes.reverse();
    b.edges.reverse();
    assign_default_positions(&mut a, &LayoutConfig::default());
    assign_default_positions(&mut b, &LayoutConfig::default());
    for id in ["A", "B", "C"] {
        assert_eq!(pos(&a, id), pos(&b, id));
    }
}

#[test]
fn test_empty_document_untouched() {
    let mut doc = DiagramDocument::default();
    assign_default_positions(&mut doc, &LayoutConfig::default());
    assert!(doc.nodes.is_empty());
}
