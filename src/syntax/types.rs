/// Structured model of a Mermaid flowchart.
///
/// These types are the "document" side of the editor: enums (Direction,
/// NodeShape, EdgeStyle) and structs (DiagramDocument, Node, Edge, Subgraph,
/// RawBlock). Text is the durable form; a document is derived from it by the
/// parser or built up by the composer.
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH};

/// Format tag written into every new document.
pub const DOCUMENT_VERSION: &str = "1";

// ─── Direction ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    TD,
    LR,
    RL,
    BT,
}

impl Direction {
    /// Keyword emitted by the serializer.
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::TD => "TD",
            Direction::LR => "LR",
            Direction::RL => "RL",
            Direction::BT => "BT",
        }
    }

    /// Parse a direction keyword. `TB` is accepted as an alias of `TD`.
    pub fn from_keyword(s: &str) -> Option<Direction> {
        match s.to_ascii_uppercase().as_str() {
            "TD" | "TB" => Some(Direction::TD),
            "LR" => Some(Direction::LR),
            "RL" => Some(Direction::RL),
            "BT" => Some(Direction::BT),
            _ => None,
        }
    }

    /// True when ranks are laid out left/right instead of up/down.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::LR | Direction::RL)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Direction {
    type Err = crate::error::ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::from_keyword(s)
            .ok_or_else(|| crate::error::ComposeError::InvalidDirection(s.to_string()))
    }
}

// ─── DiagramKind ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    #[default]
    Flowchart,
    /// Text headed by another diagram type, held entirely as raw blocks and
    /// written back without a flowchart header.
    Other,
}

// ─── NodeShape ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeShape {
    #[default]
    Rectangle, // id[Label]
    Round,            // id(Label)
    Stadium,          // id([Label])
    Subroutine,       // id[[Label]]
    Cylinder,         // id[(Label)]
    Circle,           // id((Label))
    DoubleCircle,     // id(((Label)))
    Decision,         // id{Label}
    Hexagon,          // id{{Label}}
    Asymmetric,       // id>Label]
    Parallelogram,    // id[/Label/]
    ParallelogramAlt, // id[\Label\]
    Trapezoid,        // id[/Label\]
    TrapezoidAlt,     // id[\Label/]
}

/// Shape delimiters as `(open, close, shape)`, longest opener first so that
/// `(((` is tried before `((` and `(`.
pub const SHAPE_DELIMITERS: &[(&str, &str, NodeShape)] = &[
    ("(((", ")))", NodeShape::DoubleCircle),
    ("((", "))", NodeShape::Circle),
    ("([", "])", NodeShape::Stadium),
    ("[[", "]]", NodeShape::Subroutine),
    ("[(", ")]", NodeShape::Cylinder),
    ("[/", "/]", NodeShape::Parallelogram),
    ("[/", "\\]", NodeShape::Trapezoid),
    ("[\\", "\\]", NodeShape::ParallelogramAlt),
    ("[\\", "/]", NodeShape::TrapezoidAlt),
    ("{{", "}}", NodeShape::Hexagon),
    ("[", "]", NodeShape::Rectangle),
    ("(", ")", NodeShape::Round),
    ("{", "}", NodeShape::Decision),
    (">", "]", NodeShape::Asymmetric),
];

impl NodeShape {
    /// The `(open, close)` delimiter pair the serializer writes for this shape.
    pub fn delimiters(self) -> (&'static str, &'static str) {
        SHAPE_DELIMITERS
            .iter()
            .find(|(_, _, shape)| *shape == self)
            .map(|(open, close, _)| (*open, *close))
            .unwrap_or(("[", "]"))
    }
}

// ─── EdgeStyle ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeStyle {
    #[default]
    #[serde(alias = "solid")]
    Arrow, // -->
    Line,        // ---
    DottedArrow, // -.->
    DottedLine,  // -.-
    ThickArrow,  // ==>
    ThickLine,   // ===
    BidirArrow,  // <-->
    BidirDotted, // <-.->
    BidirThick,  // <==>
    Invisible,   // ~~~
}

/// Edge connector tokens in priority order (longest-match first).
pub const EDGE_TOKENS: &[(&str, EdgeStyle)] = &[
    ("<-.->", EdgeStyle::BidirDotted),
    ("<==>", EdgeStyle::BidirThick),
    ("<-->", EdgeStyle::BidirArrow),
    ("-.->", EdgeStyle::DottedArrow),
    ("==>", EdgeStyle::ThickArrow),
    ("-->", EdgeStyle::Arrow),
    ("-.-", EdgeStyle::DottedLine),
    ("===", EdgeStyle::ThickLine),
    ("---", EdgeStyle::Line),
    ("~~~", EdgeStyle::Invisible),
];

impl EdgeStyle {
    /// The connector token the serializer writes for this style.
    pub fn token(self) -> &'static str {
        EDGE_TOKENS
            .iter()
            .find(|(_, style)| *style == self)
            .map(|(token, _)| *token)
            .unwrap_or("-->")
    }
}

// ─── Node ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Mermaid identifier (e.g. "A", "Start", "my-node").
    pub id: String,
    /// Display label. Defaults to the id when the node has no shape bracket.
    pub label: String,
    #[serde(default)]
    pub shape: NodeShape,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
}

fn default_width() -> i32 {
    DEFAULT_NODE_WIDTH
}

fn default_height() -> i32 {
    DEFAULT_NODE_HEIGHT
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, shape: NodeShape) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            shape,
            x: 0,
            y: 0,
            width: DEFAULT_NODE_WIDTH,
            height: DEFAULT_NODE_HEIGHT,
        }
    }

    /// Create a bare node (id = label, default Rectangle shape).
    pub fn bare(id: impl Into<String>) -> Self {
        let id = id.into();
        let label = id.clone();
        Self::new(id, label, NodeShape::Rectangle)
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// True when the serializer can write this node as a bare identifier.
    pub fn is_bare(&self) -> bool {
        self.shape == NodeShape::Rectangle && self.label == self.id
    }
}

// ─── Edge ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Assigned by the normalizer when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub style: EdgeStyle,
    /// Optional inline label on the edge (from |text| syntax).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, style: EdgeStyle) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            style,
            label: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn connects(&self, source: &str, target: &str) -> bool {
        self.source == source && self.target == target
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Positional id `e-{index+1}` for the edge at 0-based `index`.
pub fn positional_edge_id(index: usize) -> String {
    format!("e-{}", index + 1)
}

/// The id every edge goes by, in order: its explicit id, or else the first
/// free `e-{n}` from its positional id upward, skipping explicit ids and ids
/// handed to earlier edges. The normalizer writes exactly these ids.
pub fn resolved_edge_ids(edges: &[Edge]) -> Vec<String> {
    let taken: HashSet<&str> = edges.iter().filter_map(|e| e.id.as_deref()).collect();
    let mut assigned: Vec<String> = Vec::with_capacity(edges.len());
    let mut derived: HashSet<String> = HashSet::new();
    for (index, edge) in edges.iter().enumerate() {
        if let Some(id) = &edge.id {
            assigned.push(id.clone());
            continue;
        }
        let mut n = index;
        let id = loop {
            let candidate = positional_edge_id(n);
            if !taken.contains(candidate.as_str()) && !derived.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        derived.insert(id.clone());
        assigned.push(id);
    }
    assigned
}

// ─── Subgraph ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgraph {
    pub id: String,
    /// Display title from `subgraph id [Title]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional direction override within this subgraph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Enclosing subgraph id, if nested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Member node ids, in order of binding.
    #[serde(default)]
    pub nodes: Vec<String>,
}

impl Subgraph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            direction: None,
            parent: None,
            nodes: Vec::new(),
        }
    }
}

// ─── RawBlock ────────────────────────────────────────────────────────────────

/// A source line the parser could not model, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBlock {
    pub id: String,
    pub text: String,
}

impl RawBlock {
    /// `ordinal` is the 1-based position among the raw lines of the text.
    pub fn new(ordinal: usize, text: impl Into<String>) -> Self {
        Self {
            id: format!("raw-{ordinal:04}"),
            text: text.into(),
        }
    }
}

// ─── DiagramDocument ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDocument {
    pub version: String,
    #[serde(default)]
    pub kind: DiagramKind,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub subgraphs: Vec<Subgraph>,
    #[serde(default)]
    pub raw_blocks: Vec<RawBlock>,
}

impl Default for DiagramDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            kind: DiagramKind::Flowchart,
            direction: Direction::TD,
            nodes: Vec::new(),
            edges: Vec::new(),
            subgraphs: Vec::new(),
            raw_blocks: Vec::new(),
        }
    }
}

impl DiagramDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Index of the edge `id` names, using the ids from [`resolved_edge_ids`]
    /// so that edges without an id yet are found under the id they will get.
    pub fn edge_index(&self, id: &str) -> Option<usize> {
        resolved_edge_ids(&self.edges).iter().position(|e| e == id)
    }

    pub fn has_edge(&self, id: &str) -> bool {
        self.edge_index(id).is_some()
    }

    pub fn subgraph(&self, id: &str) -> Option<&Subgraph> {
        self.subgraphs.iter().find(|s| s.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
            && self.edges.is_empty()
            && self.subgraphs.is_empty()
            && self.raw_blocks.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_syntax_types.rs"]
mod tests;
