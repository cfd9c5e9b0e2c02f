//! Pure composer state machine: an immutable snapshot, an action enum, and
//! `reduce`, which returns the next snapshot plus the effects to perform.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ComposerConfig;
use crate::layout::{grid_slot, snap};
use crate::normalizer::normalize;
use crate::parsers::parse;
use crate::serializer::serialize;
use crate::syntax::diagnostics::ParseWarning;
use crate::syntax::types::{DiagramDocument, Direction, Edge, EdgeStyle, Node, NodeShape};

// ─── Selection / mode ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Selection {
    Node(String),
    Edge(String),
}

impl Selection {
    pub fn id(&self) -> &str {
        match self {
            Selection::Node(id) | Selection::Edge(id) => id,
        }
    }

    /// True when the selected entity still exists in `doc`.
    pub fn exists_in(&self, doc: &DiagramDocument) -> bool {
        match self {
            Selection::Node(id) => doc.has_node(id),
            Selection::Edge(id) => doc.has_edge(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    Code,
    Visual,
    #[default]
    Split,
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Snapshot of one editing context.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposerState {
    /// Authoritative text.
    pub text: String,
    /// Document in use; may carry positions the text cannot express.
    pub document: Arc<DiagramDocument>,
    pub warnings: Vec<ParseWarning>,
    pub selection: Option<Selection>,
    /// Last committed (or position-flushed) document.
    pub cache: Option<Arc<DiagramDocument>>,
    pub mode: EditorMode,
}

impl Default for ComposerState {
    fn default() -> Self {
        Self::load(String::new(), None, EditorMode::default())
    }
}

impl ComposerState {
    /// Reconcile `text` against `cache` and build the initial snapshot.
    pub fn load(text: String, cache: Option<Arc<DiagramDocument>>, mode: EditorMode) -> Self {
        let parsed = parse(&text);
        let document = resolve_doc(&text, parsed.doc, cache.as_ref());
        Self {
            text,
            document,
            warnings: parsed.warnings,
            selection: None,
            cache,
            mode,
        }
    }
}

/// Pick the document in use for `text`.
///
/// The cache wins, as the very same `Arc`, when it serializes to exactly
/// `text`; otherwise the freshly parsed document does.
pub fn resolve_doc(
    text: &str,
    parsed: DiagramDocument,
    cache: Option<&Arc<DiagramDocument>>,
) -> Arc<DiagramDocument> {
    match cache {
        Some(cached) if serialize(cached) == text => Arc::clone(cached),
        _ => Arc::new(parsed),
    }
}

/// First free `N{n}`, scanning upward from the node count plus one.
pub fn next_node_id(doc: &DiagramDocument) -> String {
    let mut n = doc.nodes.len() + 1;
    loop {
        let id = format!("N{n}");
        if !doc.has_node(&id) {
            return id;
        }
        n += 1;
    }
}

/// First free `e-{n}` from the edge count plus one, skipping ids that existing
/// edges go by, including the ones id-less edges will be given.
pub fn next_edge_id(doc: &DiagramDocument) -> String {
    let mut n = doc.edges.len() + 1;
    loop {
        let id = format!("e-{n}");
        if !doc.has_edge(&id) {
            return id;
        }
        n += 1;
    }
}

// ─── Actions / effects ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The authoritative text changed outside the composer.
    SyncText(String),
    AddNode,
    AddNodeAt { x: f64, y: f64 },
    /// Drag update; touches only the in-memory document.
    UpdateNodePosition { id: String, x: f64, y: f64 },
    /// Drag settled: copy the in-memory document into the cache.
    FlushPositions,
    UpdateNodeLabel { id: String, label: String },
    RemoveSelected,
    ConnectNodes { source: String, target: String },
    SetDirection(Direction),
    SetMode(EditorMode),
    Select(Option<Selection>),
}

/// Side effects requested by a transition, performed by the caller in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Write the new text and cache to the owning instance.
    Commit {
        text: String,
        cache: Arc<DiagramDocument>,
    },
    /// Write only the cache (positions after a drag).
    PersistCache(Arc<DiagramDocument>),
    SetMode(EditorMode),
    SchedulePositionFlush,
    CancelPositionFlush,
    ScheduleRender,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: ComposerState,
    pub effects: Vec<Effect>,
    /// Id of the node or edge the action created, if any.
    pub created: Option<String>,
}

impl Transition {
    fn unchanged(state: &ComposerState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
            created: None,
        }
    }

    fn with(state: ComposerState, effects: Vec<Effect>) -> Self {
        Self {
            state,
            effects,
            created: None,
        }
    }

    fn created(mut self, id: String) -> Self {
        self.created = Some(id);
        self
    }
}

// ─── Reducer ─────────────────────────────────────────────────────────────────

/// Apply `action` to `state`. Pure; operations on ids that do not exist are no-ops.
pub fn reduce(state: &ComposerState, action: Action, config: &ComposerConfig) -> Transition {
    let doc = state.document.as_ref();
    match action {
        Action::SyncText(text) => {
            if text == state.text {
                return Transition::unchanged(state);
            }
            let parsed = parse(&text);
            let document = resolve_doc(&text, parsed.doc, state.cache.as_ref());
            let selection = state
                .selection
                .clone()
                .filter(|s| s.exists_in(&document));
            let next = ComposerState {
                text,
                document,
                warnings: parsed.warnings,
                selection,
                cache: state.cache.clone(),
                mode: state.mode,
            };
            Transition::with(next, vec![Effect::ScheduleRender])
        }

        Action::AddNode => {
            let id = next_node_id(doc);
            let (x, y) = grid_slot(doc.nodes.len(), &config.layout);
            add_node(state, config, id, x, y)
        }

        Action::AddNodeAt { x, y } => {
            let id = next_node_id(doc);
            let grid = config.layout.grid;
            add_node(state, config, id, snap(x, grid), snap(y, grid))
        }

        Action::UpdateNodePosition { id, x, y } => {
            if !doc.has_node(&id) {
                return Transition::unchanged(state);
            }
            let grid = config.layout.grid;
            let mut moved = doc.clone();
            if let Some(node) = moved.node_mut(&id) {
                node.x = snap(x, grid);
                node.y = snap(y, grid);
            }
            let next = ComposerState {
                document: Arc::new(moved),
                ..state.clone()
            };
            Transition::with(next, vec![Effect::SchedulePositionFlush])
        }

        Action::FlushPositions => {
            if state
                .cache
                .as_ref()
                .is_some_and(|c| Arc::ptr_eq(c, &state.document))
            {
                return Transition::unchanged(state);
            }
            let cache = Arc::clone(&state.document);
            let next = ComposerState {
                cache: Some(Arc::clone(&cache)),
                ..state.clone()
            };
            Transition::with(next, vec![Effect::PersistCache(cache)])
        }

        Action::UpdateNodeLabel { id, label } => {
            if !doc.has_node(&id) {
                return Transition::unchanged(state);
            }
            let mut next = doc.clone();
            if let Some(node) = next.node_mut(&id) {
                node.label = label;
            }
            commit(state, next, state.selection.clone())
        }

        Action::RemoveSelected => {
            let Some(selection) = state.selection.clone() else {
                return Transition::unchanged(state);
            };
            if !selection.exists_in(doc) {
                let next = ComposerState {
                    selection: None,
                    ..state.clone()
                };
                return Transition::with(next, Vec::new());
            }
            let mut next = doc.clone();
            match &selection {
                Selection::Node(id) => {
                    next.nodes.retain(|n| n.id != *id);
                    next.edges.retain(|e| !e.touches(id));
                    for sg in &mut next.subgraphs {
                        sg.nodes.retain(|m| m != id);
                    }
                }
                Selection::Edge(id) => {
                    if let Some(index) = doc.edge_index(id) {
                        next.edges.remove(index);
                    }
                }
            }
            commit(state, next, None)
        }

        Action::ConnectNodes { source, target } => {
            if source == target || !doc.has_node(&source) || !doc.has_node(&target) {
                return Transition::unchanged(state);
            }
            if doc.edges.iter().any(|e| e.connects(&source, &target)) {
                return Transition::unchanged(state);
            }
            let id = next_edge_id(doc);
            let mut next = doc.clone();
            let edge = Edge::new(source, target, EdgeStyle::default()).with_id(id.clone());
            next.edges.push(edge);
            commit(state, next, Some(Selection::Edge(id.clone()))).created(id)
        }

        Action::SetDirection(direction) => {
            let mut next = doc.clone();
            next.direction = direction;
            commit(state, next, state.selection.clone())
        }

        Action::SetMode(mode) => {
            let next = ComposerState {
                mode,
                ..state.clone()
            };
            Transition::with(next, vec![Effect::SetMode(mode)])
        }

        Action::Select(selection) => {
            let next = ComposerState {
                selection,
                ..state.clone()
            };
            Transition::with(next, Vec::new())
        }
    }
}

fn add_node(state: &ComposerState, config: &ComposerConfig, id: String, x: i32, y: i32) -> Transition {
    let mut node = Node::new(id.clone(), id.clone(), NodeShape::Rectangle).at(x, y);
    node.width = config.layout.node_width;
    node.height = config.layout.node_height;
    let mut next = state.document.as_ref().clone();
    next.nodes.push(node);
    commit(state, next, Some(Selection::Node(id.clone()))).created(id)
}

/// normalize → serialize → re-parse for warnings → cache the normalized document.
fn commit(state: &ComposerState, doc: DiagramDocument, selection: Option<Selection>) -> Transition {
    let normalized = Arc::new(normalize(&doc));
    let text = serialize(&normalized);
    let warnings = parse(&text).warnings;
    let next = ComposerState {
        text: text.clone(),
        document: Arc::clone(&normalized),
        warnings,
        selection,
        cache: Some(Arc::clone(&normalized)),
        mode: state.mode,
    };
    let effects = vec![
        Effect::CancelPositionFlush,
        Effect::Commit {
            text,
            cache: normalized,
        },
        Effect::ScheduleRender,
    ];
    Transition::with(next, effects)
}

#[cfg(test)]
#[path = "../../tests/rust/test_composer_state.rs"]
mod tests;
