//! Composer — keeps one editing context's text and structured document in sync.
//!
//! Text is the source of truth for meaning. The document in use is the cached
//! document while it provably serializes to the current text, and a fresh
//! parse otherwise. Structural edits go through the pure reducer in
//! [`state`]; this wrapper applies the resulting effects to the owning
//! [`InstanceHost`] and drives the debounce timers.

pub mod scheduler;
pub mod state;
pub mod store;

use std::sync::Arc;
use std::time::Instant;

use log::{debug, trace};

use crate::config::ComposerConfig;
use crate::syntax::diagnostics::{Diagnostic, ParseWarning};
use crate::syntax::types::{DiagramDocument, Direction};
use crate::validator::validate;

pub use scheduler::{Debouncer, RenderRequest, RenderScheduler};
pub use state::{
    Action, ComposerState, EditorMode, Effect, Selection, Transition, next_edge_id, next_node_id,
    reduce, resolve_doc,
};
pub use store::{InstanceChanges, InstanceHost, InstanceRecord, InstanceStore, StoreSnapshot};

/// Consistency engine for the active diagram instance.
pub struct Composer {
    instance_id: String,
    state: ComposerState,
    config: ComposerConfig,
    position_flush: Debouncer,
    render: RenderScheduler,
}

impl Composer {
    /// Open `record` with the default configuration.
    pub fn open(record: &InstanceRecord) -> Self {
        Self::with_config(record, ComposerConfig::default())
    }

    pub fn with_config(record: &InstanceRecord, config: ComposerConfig) -> Self {
        let mut composer = Self {
            instance_id: record.id.clone(),
            state: ComposerState::default(),
            position_flush: Debouncer::new(config.position_flush_delay),
            render: RenderScheduler::new(config.render_delay),
            config,
        };
        composer.load(record, Instant::now());
        composer
    }

    fn load(&mut self, record: &InstanceRecord, now: Instant) {
        self.instance_id = record.id.clone();
        self.state = ComposerState::load(
            record.text.clone(),
            record.cached_document.clone(),
            record.mode,
        );
        self.render.schedule(now);
        debug!(
            instance = self.instance_id.as_str(),
            from_cache = self.is_using_cache();
            "Opened instance"
        );
    }

    /// Hand the composer over to another instance. Pending timers of the old
    /// instance are dropped and the selection is cleared.
    pub fn switch_to(&mut self, record: &InstanceRecord) {
        self.switch_to_at(record, Instant::now());
    }

    pub fn switch_to_at(&mut self, record: &InstanceRecord, now: Instant) {
        self.position_flush.cancel();
        self.render.cancel();
        self.load(record, now);
    }

    /// Cancel every pending timer; nothing fires after this.
    pub fn teardown(&mut self) {
        self.position_flush.cancel();
        self.render.cancel();
        trace!(instance = self.instance_id.as_str(); "Composer torn down");
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn text(&self) -> &str {
        &self.state.text
    }

    pub fn document(&self) -> &Arc<DiagramDocument> {
        &self.state.document
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.state.warnings
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.state.selection.as_ref()
    }

    pub fn mode(&self) -> EditorMode {
        self.state.mode
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// True when the document in use is the cached document itself.
    pub fn is_using_cache(&self) -> bool {
        self.state
            .cache
            .as_ref()
            .is_some_and(|c| Arc::ptr_eq(c, &self.state.document))
    }

    pub fn position_flush_pending(&self) -> bool {
        self.position_flush.is_pending()
    }

    pub fn render_pending(&self) -> bool {
        self.render.is_pending()
    }

    /// Parse warnings followed by validation issues for the document in use.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out: Vec<Diagnostic> = self.state.warnings.iter().cloned().map(Into::into).collect();
        out.extend(validate(&self.state.document).into_iter().map(Diagnostic::from));
        out
    }

    // ─── Dispatch ────────────────────────────────────────────────────────────

    /// Run `action` through the reducer and perform its effects on `host`.
    /// Returns the id of a created node or edge.
    pub fn dispatch<H: InstanceHost>(
        &mut self,
        action: Action,
        now: Instant,
        host: &mut H,
    ) -> Option<String> {
        trace!(instance = self.instance_id.as_str(); "{action:?}");
        let Transition {
            state,
            effects,
            created,
        } = reduce(&self.state, action, &self.config);
        self.state = state;
        for effect in effects {
            self.perform(effect, now, host);
        }
        created
    }

    fn perform<H: InstanceHost>(&mut self, effect: Effect, now: Instant, host: &mut H) {
        match effect {
            Effect::Commit { text, cache } => {
                debug!(
                    instance = self.instance_id.as_str(),
                    nodes = cache.nodes.len(),
                    edges = cache.edges.len();
                    "Committed document"
                );
                let changes = InstanceChanges::default().text(text).cached_document(cache);
                host.update_instance(&self.instance_id, changes);
            }
            Effect::PersistCache(cache) => {
                let changes = InstanceChanges::default().cached_document(cache);
                host.update_instance(&self.instance_id, changes);
            }
            Effect::SetMode(mode) => {
                host.update_instance(&self.instance_id, InstanceChanges::default().mode(mode));
            }
            Effect::SchedulePositionFlush => self.position_flush.schedule(now),
            Effect::CancelPositionFlush => self.position_flush.cancel(),
            Effect::ScheduleRender => self.render.schedule(now),
        }
    }

    /// Fire due timers. Returns a render request when the render debounce elapsed.
    pub fn poll<H: InstanceHost>(&mut self, now: Instant, host: &mut H) -> Option<RenderRequest> {
        if self.position_flush.poll(now) {
            self.dispatch(Action::FlushPositions, now, host);
        }
        self.render.poll(now, &self.state.text)
    }

    /// True when a finished render for `generation` should be shown.
    pub fn accept_render(&self, generation: u64) -> bool {
        self.render.accept(generation)
    }

    // ─── Operations ──────────────────────────────────────────────────────────

    /// The authoritative text changed outside the composer (typing, undo, load).
    pub fn sync_text<H: InstanceHost>(&mut self, text: &str, host: &mut H) {
        if text == self.state.text {
            return;
        }
        let now = Instant::now();
        if self.position_flush.is_pending() {
            self.position_flush.cancel();
            self.dispatch(Action::FlushPositions, now, host);
        }
        self.dispatch(Action::SyncText(text.to_string()), now, host);
    }

    pub fn add_node<H: InstanceHost>(&mut self, host: &mut H) -> String {
        let created = self.dispatch(Action::AddNode, Instant::now(), host);
        created.unwrap_or_default()
    }

    pub fn add_node_at<H: InstanceHost>(&mut self, x: f64, y: f64, host: &mut H) -> String {
        let created = self.dispatch(Action::AddNodeAt { x, y }, Instant::now(), host);
        created.unwrap_or_default()
    }

    pub fn update_node_position<H: InstanceHost>(&mut self, id: &str, x: f64, y: f64, host: &mut H) {
        let action = Action::UpdateNodePosition {
            id: id.to_string(),
            x,
            y,
        };
        self.dispatch(action, Instant::now(), host);
    }

    pub fn update_node_label<H: InstanceHost>(&mut self, id: &str, label: &str, host: &mut H) {
        let action = Action::UpdateNodeLabel {
            id: id.to_string(),
            label: label.to_string(),
        };
        self.dispatch(action, Instant::now(), host);
    }

    pub fn remove_selected<H: InstanceHost>(&mut self, host: &mut H) {
        self.dispatch(Action::RemoveSelected, Instant::now(), host);
    }

    /// Connect two nodes. Returns the new edge id, or None when nothing was added.
    pub fn connect_nodes<H: InstanceHost>(
        &mut self,
        source: &str,
        target: &str,
        host: &mut H,
    ) -> Option<String> {
        let action = Action::ConnectNodes {
            source: source.to_string(),
            target: target.to_string(),
        };
        self.dispatch(action, Instant::now(), host)
    }

    pub fn set_direction<H: InstanceHost>(&mut self, direction: Direction, host: &mut H) {
        self.dispatch(Action::SetDirection(direction), Instant::now(), host);
    }

    pub fn set_mode<H: InstanceHost>(&mut self, mode: EditorMode, host: &mut H) {
        self.dispatch(Action::SetMode(mode), Instant::now(), host);
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.state.selection = selection;
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_composer.rs"]
mod tests;
