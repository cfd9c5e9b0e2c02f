use super::*;
use crate::syntax::types::{EdgeStyle, NodeShape};
use pretty_assertions::assert_eq;

fn parse(src: &str) -> ParseResult {
    FlowchartParser.parse(src)
}

fn node_ids(doc: &DiagramDocument) -> Vec<&str> {
    doc.nodes.iter().map(|n| n.id.as_str()).collect()
}

fn kinds(result: &ParseResult) -> Vec<WarningKind> {
    result.warnings.iter().map(|w| w.kind.clone()).collect()
}

// ── Header ────────────────────────────────────────────────────────────────

#[test]
fn test_simple_edge() {
    let result = parse("flowchart TD\nA-->B");
    let doc = &result.doc;
    assert_eq!(doc.direction, Direction::TD);
    assert_eq!(node_ids(doc), vec!["A", "B"]);
    assert_eq!(doc.edges.len(), 1);
    assert!(doc.edges[0].connects("A", "B"));
    assert_eq!(doc.edges[0].style, EdgeStyle::Arrow);
    assert_eq!(doc.edges[0].id, None);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_header_directions() {
    assert_eq!(parse("graph LR\nA").doc.direction, Direction::LR);
    assert_eq!(parse("flowchart RL;\nA").doc.direction, Direction::RL);
    assert_eq!(parse("flowchart BT\nA").doc.direction, Direction::BT);
    assert_eq!(parse("flowchart TB\nA").doc.direction, Direction::TD);
    assert_eq!(parse("flowchart\nA").doc.direction, Direction::TD);
}

#[test]
fn test_empty_input_has_no_warnings() {
    let result = parse("");
    assert!(result.doc.is_empty());
    assert!(result.warnings.is_empty());

    let result = parse("\n%% just a comment\n   \n");
    assert!(result.doc.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_missing_header() {
    let result = parse("A --> B");
    assert_eq!(kinds(&result), vec![WarningKind::MissingHeader]);
    assert_eq!(result.warnings[0].line, 1);
    assert_eq!(node_ids(&result.doc), vec!["A", "B"]);
    assert_eq!(result.doc.direction, Direction::TD);
}

#[test]
fn test_malformed_header_kept_raw() {
    let result = parse("flowchart XY\nA");
    assert_eq!(
        kinds(&result),
        vec![WarningKind::MalformedHeader {
            token: "XY".to_string()
        }]
    );
    assert_eq!(result.doc.direction, Direction::TD);
    assert_eq!(result.doc.raw_blocks.len(), 1);
    assert_eq!(result.doc.raw_blocks[0].text, "flowchart XY");
    assert_eq!(node_ids(&result.doc), vec!["A"]);
}

#[test]
fn test_other_diagram_kept_raw() {
    let src = "sequenceDiagram\n  Alice->>Bob: Hi\n  Bob-->>Alice: Hello";
    let result = parse(src);
    assert!(result.doc.nodes.is_empty());
    assert!(result.doc.edges.is_empty());
    let texts: Vec<&str> = result.doc.raw_blocks.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["sequenceDiagram", "  Alice->>Bob: Hi", "  Bob-->>Alice: Hello"]
    );
    assert_eq!(
        kinds(&result),
        vec![WarningKind::UnsupportedDiagram {
            diagram: "sequence".to_string()
        }]
    );
}

#[test]
fn test_diagram_kind_follows_header() {
    assert_eq!(parse("sequenceDiagram\n  A->>B: Hi").doc.kind, DiagramKind::Other);
    assert_eq!(parse("flowchart TD\npie title x").doc.kind, DiagramKind::Flowchart);
    assert_eq!(parse("A --> B").doc.kind, DiagramKind::Flowchart);
}

#[test]
fn test_directive_kept_raw_without_warning() {
    let result = parse("%%{init: {'theme': 'dark'}}%%\nflowchart LR\n%% note\nA-->B");
    assert!(result.warnings.is_empty());
    assert_eq!(result.doc.direction, Direction::LR);
    assert_eq!(node_ids(&result.doc), vec!["A", "B"]);
    assert_eq!(result.doc.raw_blocks.len(), 1);
    assert_eq!(result.doc.raw_blocks[0].text, "%%{init: {'theme': 'dark'}}%%");
}

// ── Nodes ─────────────────────────────────────────────────────────────────

#[test]
fn test_shapes_and_labels() {
    let result = parse("flowchart TD\nA[Start] --> B{Decide}\nB -->|yes| C((Done))");
    let doc = &result.doc;
    assert_eq!(doc.node("A").unwrap().label, "Start");
    assert_eq!(doc.node("A").unwrap().shape, NodeShape::Rectangle);
    assert_eq!(doc.node("B").unwrap().shape, NodeShape::Decision);
    assert_eq!(doc.node("C").unwrap().shape, NodeShape::Circle);
    assert_eq!(doc.node("C").unwrap().label, "Done");
    assert_eq!(doc.edges[1].label.as_deref(), Some("yes"));
    assert!(result.warnings.is_empty());
}

#[test]
fn test_quoted_label() {
    let result = parse("flowchart TD\nA[\"Hello [world]\"]");
    assert_eq!(result.doc.node("A").unwrap().label, "Hello [world]");
}

#[test]
fn test_bare_node_label_is_id() {
    let result = parse("flowchart TD\nlonely-node");
    let node = result.doc.node("lonely-node").unwrap();
    assert_eq!(node.label, "lonely-node");
    assert!(node.is_bare());
}

#[test]
fn test_later_definition_wins() {
    let result = parse("flowchart TD\nA[One]\nA[Two]");
    assert_eq!(result.doc.nodes.len(), 1);
    assert_eq!(result.doc.node("A").unwrap().label, "Two");
    assert_eq!(
        kinds(&result),
        vec![WarningKind::NodeRedefined {
            node: "A".to_string()
        }]
    );
}

#[test]
fn test_definition_after_reference_is_not_a_redefinition() {
    let result = parse("flowchart TD\nA --> B\nA[Alpha]\nA[Alpha]");
    assert_eq!(result.doc.node("A").unwrap().label, "Alpha");
    assert!(result.warnings.is_empty());
}

#[test]
fn test_unbalanced_shape_is_raw() {
    let line = "A[unclosed --> B";
    let result = parse(&format!("flowchart TD\nX --> Y\n{line}"));
    assert_eq!(node_ids(&result.doc), vec!["X", "Y"]);
    assert_eq!(result.doc.raw_blocks.len(), 1);
    assert_eq!(result.doc.raw_blocks[0].text, line);
    assert_eq!(kinds(&result), vec![WarningKind::UnbalancedShape]);
    assert_eq!(result.warnings[0].line, 3);
}

#[test]
fn test_wrong_closer_degrades_to_rectangle() {
    let result = parse("flowchart TD\nA(oops]");
    let node = result.doc.node("A").unwrap();
    assert_eq!(node.shape, NodeShape::Rectangle);
    assert_eq!(node.label, "oops");
    assert_eq!(
        kinds(&result),
        vec![WarningKind::MalformedShape {
            node: "A".to_string()
        }]
    );
    assert!(result.doc.raw_blocks.is_empty());
}

// ── Edges ─────────────────────────────────────────────────────────────────

#[test]
fn test_edge_chain() {
    let result = parse("flowchart LR\nA --> B --> C");
    let doc = &result.doc;
    assert_eq!(doc.edges.len(), 2);
    assert!(doc.edges[0].connects("A", "B"));
    assert!(doc.edges[1].connects("B", "C"));
}

#[test]
fn test_edge_styles() {
    let result = parse("flowchart TD\nA -.-> B\nB ==> C\nC --- D\nD <--> E\nE ~~~ F");
    let styles: Vec<EdgeStyle> = result.doc.edges.iter().map(|e| e.style).collect();
    assert_eq!(
        styles,
        vec![
            EdgeStyle::DottedArrow,
            EdgeStyle::ThickArrow,
            EdgeStyle::Line,
            EdgeStyle::BidirArrow,
            EdgeStyle::Invisible,
        ]
    );
}

#[test]
fn test_text_on_link_label() {
    let result = parse("flowchart TD\nA -- maybe --> B");
    assert_eq!(result.doc.edges[0].label.as_deref(), Some("maybe"));
    assert_eq!(result.doc.edges[0].style, EdgeStyle::Arrow);
}

#[test]
fn test_explicit_edge_id() {
    let result = parse("flowchart TD\nA e1@--> B");
    assert_eq!(result.doc.edges[0].id.as_deref(), Some("e1"));
}

#[test]
fn test_duplicate_edge_id_dropped() {
    let result = parse("flowchart TD\nA e1@--> B\nB e1@--> C");
    assert_eq!(result.doc.edges[0].id.as_deref(), Some("e1"));
    assert_eq!(result.doc.edges[1].id, None);
    assert_eq!(
        kinds(&result),
        vec![WarningKind::DuplicateEdgeId {
            edge: "e1".to_string()
        }]
    );
}

#[test]
fn test_trailing_semicolon() {
    let result = parse("flowchart TD\nA --> B;");
    assert_eq!(result.doc.edges.len(), 1);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_dangling_connector_is_raw() {
    let result = parse("flowchart TD\nA -->");
    assert!(result.doc.nodes.is_empty());
    assert_eq!(result.doc.raw_blocks[0].text, "A -->");
    assert_eq!(kinds(&result), vec![WarningKind::UnrecognizedLine]);
}

// ── Subgraphs ─────────────────────────────────────────────────────────────

#[test]
fn test_subgraph_membership() {
    let src = "flowchart TD\nsubgraph one [First]\n  A --> B\nend\nC --> A";
    let result = parse(src);
    let sg = result.doc.subgraph("one").unwrap();
    assert_eq!(sg.title.as_deref(), Some("First"));
    assert_eq!(sg.nodes, vec!["A", "B"]);
    assert_eq!(sg.parent, None);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_nested_subgraphs_with_direction() {
    let src = "flowchart LR\nsubgraph outer\n  X\n  subgraph inner\n    direction TB\n    Y\n  end\nend";
    let result = parse(src);
    let outer = result.doc.subgraph("outer").unwrap();
    let inner = result.doc.subgraph("inner").unwrap();
    assert_eq!(outer.nodes, vec!["X"]);
    assert_eq!(inner.nodes, vec!["Y"]);
    assert_eq!(inner.parent.as_deref(), Some("outer"));
    assert_eq!(inner.direction, Some(Direction::TD));
    assert_eq!(outer.direction, None);
}

#[test]
fn test_declared_later_inside_subgraph_joins_it() {
    let result = parse("flowchart TD\nA --> B\nsubgraph g\n  A\nend");
    assert_eq!(result.doc.subgraph("g").unwrap().nodes, vec!["A"]);
}

#[test]
fn test_first_subgraph_keeps_member() {
    let src = "flowchart TD\nsubgraph g\n  A --> B\nend\nsubgraph h\n  B\nend";
    let result = parse(src);
    assert_eq!(result.doc.subgraph("g").unwrap().nodes, vec!["A", "B"]);
    assert!(result.doc.subgraph("h").unwrap().nodes.is_empty());
}

#[test]
fn test_anonymous_subgraph_ids() {
    let src = "flowchart TD\nsubgraph sg-1\nend\nsubgraph \"My Group\"\nend\nsubgraph Free Title\nend";
    let result = parse(src);
    let ids: Vec<&str> = result.doc.subgraphs.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["sg-1", "sg-2", "sg-3"]);
    assert_eq!(result.doc.subgraphs[1].title.as_deref(), Some("My Group"));
    assert_eq!(result.doc.subgraphs[2].title.as_deref(), Some("Free Title"));
}

#[test]
fn test_quoted_subgraph_title() {
    let result = parse("flowchart TD\nsubgraph g [\"Quoted [title]\"]\nend");
    let sg = result.doc.subgraph("g").unwrap();
    assert_eq!(sg.title.as_deref(), Some("Quoted [title]"));
}

#[test]
fn test_stray_end() {
    let result = parse("flowchart TD\nA\nend");
    assert_eq!(result.doc.raw_blocks[0].text, "end");
    assert_eq!(kinds(&result), vec![WarningKind::StrayEnd]);
}

#[test]
fn test_keyword_endpoint_kept_raw() {
    let result = parse("flowchart TD\nA --> end\nstyle -.-> B\nend --> C\nD --> direction[x]");
    assert!(result.doc.nodes.is_empty());
    assert!(result.doc.edges.is_empty());
    let raw: Vec<&str> = result.doc.raw_blocks.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(raw, vec!["A --> end", "style -.-> B", "end --> C", "D --> direction[x]"]);
    assert_eq!(
        kinds(&result),
        vec![
            WarningKind::ReservedNodeId { node: "end".to_string() },
            WarningKind::UnsupportedStatement { keyword: "style".to_string() },
            WarningKind::ReservedNodeId { node: "end".to_string() },
            WarningKind::ReservedNodeId { node: "direction".to_string() },
        ]
    );
}

#[test]
fn test_keyword_prefixed_ids_are_nodes() {
    let result = parse("flowchart TD\nA --> ending\nclassy --> subgraphs");
    assert!(result.warnings.is_empty());
    assert_eq!(node_ids(&result.doc), vec!["A", "ending", "classy", "subgraphs"]);
}

#[test]
fn test_unclosed_subgraph() {
    let result = parse("flowchart TD\nsubgraph g\n  A");
    assert_eq!(result.doc.subgraph("g").unwrap().nodes, vec!["A"]);
    assert_eq!(
        kinds(&result),
        vec![WarningKind::UnclosedSubgraph {
            subgraph: "g".to_string()
        }]
    );
    assert_eq!(result.warnings[0].line, 2);
}

#[test]
fn test_duplicate_subgraph_merges() {
    let result = parse("flowchart TD\nsubgraph g\n  A\nend\nsubgraph g [Late]\n  B\nend");
    assert_eq!(result.doc.subgraphs.len(), 1);
    let sg = &result.doc.subgraphs[0];
    assert_eq!(sg.nodes, vec!["A", "B"]);
    assert_eq!(sg.title.as_deref(), Some("Late"));
    assert_eq!(
        kinds(&result),
        vec![WarningKind::DuplicateSubgraph {
            subgraph: "g".to_string()
        }]
    );
}

#[test]
fn test_edge_to_subgraph_is_not_a_node() {
    let result = parse("flowchart TD\nsubgraph g\n  A\nend\nB --> g");
    assert_eq!(node_ids(&result.doc), vec!["A", "B"]);
    assert!(result.doc.edges[0].connects("B", "g"));
}

// ── Raw blocks ────────────────────────────────────────────────────────────

#[test]
fn test_unsupported_statements_are_raw() {
    let src = "flowchart TD\nA\nclassDef red fill:#f00\nclass A red\nstyle A fill:#0f0\nclick A cb\ndirection LR";
    let result = parse(src);
    assert_eq!(node_ids(&result.doc), vec!["A"]);
    assert_eq!(result.doc.raw_blocks.len(), 5);
    let keywords: Vec<String> = result
        .warnings
        .iter()
        .filter_map(|w| match &w.kind {
            WarningKind::UnsupportedStatement { keyword } => Some(keyword.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(keywords, vec!["classDef", "class", "style", "click", "direction"]);
}

#[test]
fn test_raw_ids_count_raw_lines_only() {
    let result = parse("flowchart TD\nclassDef a x\nA\n\nstyle A y");
    let ids: Vec<&str> = result.doc.raw_blocks.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["raw-0001", "raw-0002"]);
    assert_eq!(result.warnings[1].line, 5);
}

#[test]
fn test_raw_text_is_verbatim() {
    let result = parse("flowchart TD\n    linkStyle 0 stroke:#f00  ");
    assert_eq!(result.doc.raw_blocks[0].text, "    linkStyle 0 stroke:#f00  ");
    assert_eq!(result.warnings[0].source, "linkStyle 0 stroke:#f00");
}

// ── Positions ─────────────────────────────────────────────────────────────

#[test]
fn test_default_positions_top_down() {
    let doc = parse("flowchart TD\nA --> B").doc;
    let a = doc.node("A").unwrap();
    let b = doc.node("B").unwrap();
    assert_eq!((a.x, a.y), (120, 100));
    assert_eq!((b.x, b.y), (120, 240));
}

#[test]
fn test_default_positions_left_right() {
    let doc = parse("flowchart LR\nA --> B").doc;
    assert_eq!((doc.node("B").unwrap().x, doc.node("B").unwrap().y), (360, 100));
}

#[test]
fn test_positions_ignore_textual_order() {
    let first = parse("flowchart TD\nA --> B\nA --> C").doc;
    let second = parse("flowchart TD\nC\nB\nA --> C\nA --> B").doc;
    for id in ["A", "B", "C"] {
        let p = first.node(id).unwrap();
        let q = second.node(id).unwrap();
        assert_eq!((p.x, p.y), (q.x, q.y), "node {id}");
    }
}
